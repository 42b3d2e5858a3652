//! Error types surfaced by the library.
//!
//! Every failure mode of the lexer, parser, evaluator and bundle layer is a
//! variant of one [`Error`] enum, so callers match on a single type no matter
//! which stage rejected their input.

use thiserror::Error;

use crate::span::SourceRange;

/// The error type for all ftl operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The lexer or parser rejected the input.
    #[error("parse error at {range}: {message}")]
    Parser { message: String, range: SourceRange },

    /// A message, attribute or term lookup failed at evaluation time.
    #[error("unresolved reference: {name}")]
    UnresolvedReference { name: String },

    /// A function name was unknown, a parameter name was unknown, or a
    /// positional argument index was out of range.
    #[error("unresolved function: {message}")]
    UnresolvedFunction { message: String },

    /// A function argument's static type disagrees with the declared
    /// parameter type.
    #[error("type mismatch: {message}")]
    TypeMismatch { message: String },

    /// A named element appeared twice on the evaluation path. Carries the
    /// rendered path, e.g. `a -> b -> a`.
    #[error("cyclic reference: {path}")]
    Cycle { path: String },

    /// Manifest version mismatch or locale resolution failure.
    #[error("bundle error: {message}")]
    Bundle { message: String },

    /// A precondition the library maintains itself was violated, e.g. a term
    /// evaluated directly or an unlowered term reference asked for its type.
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl Error {
    pub fn parser(message: impl Into<String>, range: SourceRange) -> Self {
        Error::Parser {
            message: message.into(),
            range,
        }
    }

    pub fn unresolved_reference(name: impl Into<String>) -> Self {
        Error::UnresolvedReference { name: name.into() }
    }

    pub fn unresolved_function(message: impl Into<String>) -> Self {
        Error::UnresolvedFunction {
            message: message.into(),
        }
    }

    pub fn type_mismatch(message: impl Into<String>) -> Self {
        Error::TypeMismatch {
            message: message.into(),
        }
    }

    pub fn cycle(path: impl Into<String>) -> Self {
        Error::Cycle { path: path.into() }
    }

    pub fn bundle(message: impl Into<String>) -> Self {
        Error::Bundle {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Error::Internal {
            message: message.into(),
        }
    }
}

/// Result type alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::{SourcePos, SourceRange};

    #[test]
    fn test_parser_error_display() {
        let err = Error::parser(
            "unexpected token",
            SourceRange::new(SourcePos::new(2, 3), SourcePos::new(2, 3)),
        );
        assert_eq!(err.to_string(), "parse error at 2:3: unexpected token");
    }

    #[test]
    fn test_cycle_error_display() {
        let err = Error::cycle("a -> b -> a");
        assert_eq!(err.to_string(), "cyclic reference: a -> b -> a");
    }
}
