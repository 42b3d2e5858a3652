//! The localization file façade.
//!
//! A [`LocalizationFile`] is parsed once and immutable afterwards, which
//! makes it safe to share across threads; every format call builds its own
//! short-lived evaluation context. A file can capture a *global context
//! init* at parse time (the bundle layer uses this to inject locale-scoped
//! default variables); format calls compose their own configuration on top,
//! so per-call bindings win on name collisions.

use std::fmt;

use tracing::debug;

use ftl_eval::{evaluate_attribute, evaluate_entry, ContextBuilder, ContextInit, EvaluationContext};
use ftl_par::{parse_resource, Attribute, Entry, Resource};
use ftl_util::Result;

/// An immutable parsed Fluent file plus its captured default context.
pub struct LocalizationFile {
    resource: Resource,
    global_init: Option<ContextInit>,
}

impl LocalizationFile {
    /// Parses source text with term expansion enabled and no default
    /// context.
    pub fn parse(source: &str) -> Result<Self> {
        Self::parse_with(source, None, true)
    }

    /// Parses source text.
    ///
    /// `global_init` seeds every future format call's context before the
    /// call's own configuration runs. With `expand_terms` disabled, term
    /// references stay in the AST and resolve lazily at evaluation time.
    pub fn parse_with(
        source: &str,
        global_init: Option<ContextInit>,
        expand_terms: bool,
    ) -> Result<Self> {
        let resource = parse_resource(source, expand_terms)?;
        debug!(
            messages = resource.message_count(),
            terms = resource.term_count(),
            expand_terms,
            "parsed localization file"
        );
        Ok(Self {
            resource,
            global_init,
        })
    }

    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    /// Messages in declaration order.
    pub fn messages(&self) -> impl Iterator<Item = &Entry> {
        self.resource.messages()
    }

    /// Terms in declaration order.
    pub fn terms(&self) -> impl Iterator<Item = &Entry> {
        self.resource.terms()
    }

    pub fn message(&self, name: &str) -> Option<&Entry> {
        self.resource.message(name)
    }

    pub fn attribute(&self, name: &str, attribute: &str) -> Option<&Attribute> {
        self.resource.message(name).and_then(|e| e.attribute(attribute))
    }

    /// Builds the context for one format call: the file's captured init
    /// runs first, the call's configuration second and therefore wins.
    fn context(&self, configure: impl FnOnce(&mut ContextBuilder)) -> EvaluationContext<'_> {
        let mut builder = ContextBuilder::new();
        if let Some(init) = &self.global_init {
            init(&mut builder);
        }
        configure(&mut builder);
        builder.build(&self.resource)
    }

    /// Formats a message, or `Ok(None)` if no such message exists.
    /// Evaluation failures still surface as errors.
    pub fn format_or_none(
        &self,
        name: &str,
        configure: impl FnOnce(&mut ContextBuilder),
    ) -> Result<Option<String>> {
        match self.resource.message(name) {
            None => Ok(None),
            Some(entry) => {
                let context = self.context(configure);
                evaluate_entry(entry, &context).map(Some)
            }
        }
    }

    /// Formats an attribute of a message, or `Ok(None)` if the message or
    /// attribute is missing.
    pub fn format_attr_or_none(
        &self,
        name: &str,
        attribute: &str,
        configure: impl FnOnce(&mut ContextBuilder),
    ) -> Result<Option<String>> {
        match self.attribute(name, attribute) {
            None => Ok(None),
            Some(attribute) => {
                let context = self.context(configure);
                evaluate_attribute(attribute, &context).map(Some)
            }
        }
    }

    /// Formats a message, substituting `<name>` when it does not exist.
    pub fn format(
        &self,
        name: &str,
        configure: impl FnOnce(&mut ContextBuilder),
    ) -> Result<String> {
        Ok(self
            .format_or_none(name, configure)?
            .unwrap_or_else(|| format!("<{name}>")))
    }

    /// Formats an attribute, substituting `<name.attr>` when missing.
    pub fn format_attr(
        &self,
        name: &str,
        attribute: &str,
        configure: impl FnOnce(&mut ContextBuilder),
    ) -> Result<String> {
        Ok(self
            .format_attr_or_none(name, attribute, configure)?
            .unwrap_or_else(|| format!("<{name}.{attribute}>")))
    }
}

impl fmt::Debug for LocalizationFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalizationFile")
            .field("messages", &self.resource.message_count())
            .field("terms", &self.resource.term_count())
            .field("has_global_init", &self.global_init.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_missing_message_shapes() {
        let file = LocalizationFile::parse("m = x\n").unwrap();
        assert_eq!(file.format_or_none("nope", |_| {}).unwrap(), None);
        assert_eq!(file.format("nope", |_| {}).unwrap(), "<nope>");
        assert_eq!(
            file.format_attr("m", "title", |_| {}).unwrap(),
            "<m.title>"
        );
        assert_eq!(file.format_attr_or_none("m", "title", |_| {}).unwrap(), None);
    }

    #[test]
    fn test_iterators_in_declaration_order() {
        let file = LocalizationFile::parse("b = 1\n-t = 2\na = 3\n").unwrap();
        let names: Vec<_> = file.messages().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
        let terms: Vec<_> = file.terms().map(|e| e.name.as_str()).collect();
        assert_eq!(terms, vec!["t"]);
    }

    #[test]
    fn test_global_init_composes_under_call_config() {
        let init: ContextInit = Arc::new(|builder| {
            builder.string("a", "global-a").string("b", "global-b");
        });
        let file = LocalizationFile::parse_with("m = {$a}/{$b}\n", Some(init), true).unwrap();
        // The per-call configuration overrides one of the two defaults.
        let result = file
            .format("m", |builder| {
                builder.string("b", "call-b");
            })
            .unwrap();
        assert_eq!(result, "global-a/call-b");
    }

    #[test]
    fn test_attribute_formatting() {
        let file = LocalizationFile::parse("m = v\n    .title = Hello {$who}\n").unwrap();
        let result = file
            .format_attr("m", "title", |builder| {
                builder.string("who", "you");
            })
            .unwrap();
        assert_eq!(result, "Hello you");
    }

    #[test]
    fn test_evaluation_errors_still_surface() {
        let file = LocalizationFile::parse("a = {b}\nb = {a}\nm = {a}\n").unwrap();
        assert!(matches!(
            file.format("m", |_| {}),
            Err(ftl_util::Error::Cycle { .. })
        ));
    }
}
