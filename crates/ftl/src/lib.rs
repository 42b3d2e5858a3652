//! ftl - A Fluent localization system.
//!
//! This crate is the public face of the workspace: parse Fluent source into
//! a [`LocalizationFile`], format its messages against per-call variables
//! and functions, resolve locales through a JSON-manifest [`Bundle`], and
//! watch formatted values react to input changes through a
//! [`ReactiveScope`].
//!
//! ```
//! use ftl::LocalizationFile;
//!
//! let file = LocalizationFile::parse("hello = Hello {$name}!\n")?;
//! let greeting = file.format("hello", |ctx| {
//!     ctx.string("name", "fox");
//! })?;
//! assert_eq!(greeting, "Hello fox!");
//! # Ok::<(), ftl::Error>(())
//! ```
//!
//! The pipeline underneath lives in the sibling crates: `ftl-lex`
//! (tokenizer), `ftl-par` (parser, AST and term expansion) and `ftl-eval`
//! (evaluation contexts, functions and the tree-walking formatter).

pub mod bundle;
pub mod file;
pub mod manifest;
pub mod reactive;

pub use bundle::Bundle;
pub use file::LocalizationFile;
pub use manifest::{DefaultValue, LocaleEntry, Manifest, MANIFEST_VERSION};
pub use reactive::{FormattedValue, ReactiveScope};

// The pieces callers need to configure formatting and inspect results.
pub use ftl_eval::{
    ContextBuilder, ContextInit, EvaluationContext, FluentFunction, FunctionBuilder,
    FunctionRegistry,
};
pub use ftl_par::{
    Attribute, CompoundExpression, Entry, Expression, PatternElement, Resource, ValueType,
};
pub use ftl_util::{Error, Result, SourcePos, SourceRange, TokenRange};
