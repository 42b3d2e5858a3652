//! Bundle manifest model.
//!
//! The manifest maps locale codes to resource paths, optional alias sets and
//! default variables injected into every file loaded for that locale.
//! Unknown JSON keys are ignored on decode; the version gate lives in the
//! bundle layer.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use ftl_par::Expression;

/// The manifest schema version this library understands.
pub const MANIFEST_VERSION: u32 = 1;

/// Decoded bundle manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub version: u32,
    pub default_locale: String,
    /// Locale entries in declaration order; alias resolution scans them in
    /// this order.
    #[serde(default)]
    pub entries: IndexMap<String, LocaleEntry>,
    /// Bundle-wide default variables, overridden by entry-level defaults.
    #[serde(default)]
    pub defaults: IndexMap<String, DefaultValue>,
}

/// One locale of the bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocaleEntry {
    pub display_name: String,
    /// Resource path handed to the caller-supplied opener.
    pub path: String,
    #[serde(default)]
    pub aliases: IndexSet<String>,
    #[serde(default)]
    pub defaults: IndexMap<String, DefaultValue>,
}

/// A default variable value, tagged as `{"type": …, "value": …}` in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum DefaultValue {
    String(String),
    Long(i64),
    Double(f64),
    Bool(bool),
}

impl DefaultValue {
    /// The expression injected for this value. Booleans inject as the
    /// literal `true`/`false` strings so select keys can match them.
    pub fn to_expression(&self) -> Expression {
        match self {
            DefaultValue::String(value) => Expression::string(value.clone()),
            DefaultValue::Long(value) => Expression::integer(*value),
            DefaultValue::Double(value) => Expression::float(*value),
            DefaultValue::Bool(value) => Expression::string(if *value { "true" } else { "false" }),
        }
    }
}
