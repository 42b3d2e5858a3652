//! The bundle layer: locale resolution and on-demand loading.
//!
//! A bundle is just a decoded manifest; it caches nothing. Every
//! `load_locale` call resolves the requested locale, asks the caller-supplied
//! opener for the resource stream exactly once, parses it, and injects the
//! manifest's default variables (bundle level first, then entry level, so
//! entry defaults win) into the parsed file's global context init. Because
//! no state is kept, an abandoned load leaves nothing behind.

use std::future::Future;
use std::io::Read;
use std::sync::Arc;

use tracing::{debug, trace};

use ftl_eval::ContextInit;
use ftl_par::Expression;
use ftl_util::{Error, Result};

use crate::file::LocalizationFile;
use crate::manifest::{LocaleEntry, Manifest, MANIFEST_VERSION};

/// A locale-to-resource map decoded from a JSON manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct Bundle {
    manifest: Manifest,
}

impl Bundle {
    /// Decodes a manifest from JSON text. Malformed JSON and unsupported
    /// versions are bundle errors.
    pub fn from_json(text: &str) -> Result<Self> {
        let manifest: Manifest = serde_json::from_str(text)
            .map_err(|e| Error::bundle(format!("malformed manifest: {e}")))?;
        Self::from_manifest(manifest)
    }

    /// Wraps an already-decoded manifest, enforcing the version gate.
    pub fn from_manifest(manifest: Manifest) -> Result<Self> {
        if manifest.version != MANIFEST_VERSION {
            return Err(Error::bundle(format!(
                "unsupported manifest version {} (expected {MANIFEST_VERSION})",
                manifest.version
            )));
        }
        debug!(
            default_locale = %manifest.default_locale,
            locales = manifest.entries.len(),
            "bundle manifest loaded"
        );
        Ok(Self { manifest })
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn default_locale(&self) -> &str {
        &self.manifest.default_locale
    }

    /// Resolves a requested locale: an exact entry key wins, otherwise the
    /// first entry (in manifest order) listing the request among its
    /// aliases.
    pub fn find_closest_locale(&self, requested: &str) -> Option<&str> {
        if let Some((key, _)) = self.manifest.entries.get_key_value(requested) {
            return Some(key.as_str());
        }
        self.manifest
            .entries
            .iter()
            .find(|(_, entry)| entry.aliases.contains(requested))
            .map(|(key, _)| key.as_str())
    }

    /// Resolves the requested locale, falling back to the default locale.
    /// Failing both is a bundle error.
    pub fn closest_entry_or_default(&self, requested: &str) -> Result<(&str, &LocaleEntry)> {
        let locale = self
            .find_closest_locale(requested)
            .or_else(|| self.find_closest_locale(&self.manifest.default_locale))
            .ok_or_else(|| {
                Error::bundle(format!(
                    "no entry for locale {requested}, and default locale {} is unknown",
                    self.manifest.default_locale
                ))
            })?;
        Ok((locale, &self.manifest.entries[locale]))
    }

    /// Resolves and parses the file for a locale using a synchronous opener.
    pub fn load_locale<R, F>(&self, requested: &str, open: F) -> Result<LocalizationFile>
    where
        R: Read,
        F: FnOnce(&str) -> std::io::Result<R>,
    {
        let (locale, entry) = self.closest_entry_or_default(requested)?;
        trace!(requested, locale, path = %entry.path, "loading locale resource");
        let reader = open(&entry.path)
            .map_err(|e| Error::bundle(format!("failed to open {}: {e}", entry.path)))?;
        self.finish_load(locale, entry, reader)
    }

    /// Like [`Bundle::load_locale`] with an opener returning a pending
    /// stream. Only the opener may suspend; parsing never does.
    pub async fn load_locale_async<R, F, Fut>(
        &self,
        requested: &str,
        open: F,
    ) -> Result<LocalizationFile>
    where
        R: Read,
        F: FnOnce(&str) -> Fut,
        Fut: Future<Output = std::io::Result<R>>,
    {
        let (locale, entry) = self.closest_entry_or_default(requested)?;
        trace!(requested, locale, path = %entry.path, "loading locale resource");
        let reader = open(&entry.path)
            .await
            .map_err(|e| Error::bundle(format!("failed to open {}: {e}", entry.path)))?;
        self.finish_load(locale, entry, reader)
    }

    fn finish_load<R: Read>(
        &self,
        locale: &str,
        entry: &LocaleEntry,
        mut reader: R,
    ) -> Result<LocalizationFile> {
        let mut source = String::new();
        reader
            .read_to_string(&mut source)
            .map_err(|e| Error::bundle(format!("failed to read {}: {e}", entry.path)))?;

        let bundle_defaults = to_expressions(self.manifest.defaults.iter());
        let entry_defaults = to_expressions(entry.defaults.iter());
        let init: ContextInit = Arc::new(move |builder| {
            for (name, expression) in &bundle_defaults {
                builder.expression(name.clone(), expression.clone());
            }
            // Entry-level defaults run second and win on collisions.
            for (name, expression) in &entry_defaults {
                builder.expression(name.clone(), expression.clone());
            }
        });

        debug!(locale, "locale resource parsed");
        LocalizationFile::parse_with(&source, Some(init), true)
    }
}

fn to_expressions<'a>(
    defaults: impl Iterator<Item = (&'a String, &'a crate::manifest::DefaultValue)>,
) -> Vec<(String, Expression)> {
    defaults
        .map(|(name, value)| (name.clone(), value.to_expression()))
        .collect()
}
