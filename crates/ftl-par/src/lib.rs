//! ftl-par - Parser and AST for Fluent source text.
//!
//! The parser is a plain recursive descent over the token vector produced by
//! `ftl-lex`. The grammar follows Project Fluent's EBNF with two
//! relaxations:
//!
//! 1. An entry identifier without a following `=` is legal and declares a
//!    name with no value.
//! 2. Named arguments accept any inline expression, not just literals.
//!
//! Construction of a usable file is two passes over the parsed entries: the
//! term collector ([`terms`]) harvests the term table, and the pattern
//! builder ([`pattern`]) builds the message table, inlining term references
//! unless expansion is disabled.

pub mod ast;
mod entries;
mod expr;
pub mod pattern;
pub mod terms;

pub use ast::*;
pub use pattern::{build_resource, Resource};
pub use terms::collect_terms;

use ftl_lex::{tokenize, Token, TokenKind};
use ftl_util::{Error, Result, SourcePos, SourceRange, TokenRange};

/// Recursive-descent parser over a token vector.
pub struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> Parser<'t> {
    pub fn new(tokens: &'t [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    pub(crate) fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    pub(crate) fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    pub(crate) fn nth_kind(&self, n: usize) -> Option<TokenKind> {
        self.tokens.get(self.pos + n).map(|t| t.kind)
    }

    pub(crate) fn advance(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == Some(kind)
    }

    /// Consumes the next token if it has the given kind.
    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Consumes the next token, which must have the given kind.
    pub(crate) fn expect(&mut self, kind: TokenKind, context: &str) -> Result<&'t Token> {
        match self.peek() {
            Some(token) if token.kind == kind => Ok(self.advance().unwrap()),
            Some(token) => Err(self.error_here(format!(
                "expected {kind} {context}, found {}",
                token.kind
            ))),
            None => Err(self.error_here(format!(
                "expected {kind} {context}, found end of input"
            ))),
        }
    }

    /// Current token index, used as the start of a node's [`TokenRange`].
    pub(crate) fn mark(&self) -> usize {
        self.pos
    }

    /// Range from `start` up to (excluding) the current position.
    pub(crate) fn range_from(&self, start: usize) -> TokenRange {
        TokenRange::new(start, self.pos)
    }

    pub(crate) fn skip_newlines(&mut self) {
        while self.check(TokenKind::Newline) {
            self.pos += 1;
        }
    }

    /// A parse error at the given token index.
    pub(crate) fn error_at(&self, index: usize, message: impl Into<String>) -> Error {
        let range = match self.tokens.get(index.min(self.tokens.len().saturating_sub(1))) {
            Some(token) => {
                let pos = SourcePos::new(token.line, token.column);
                SourceRange::new(pos, pos)
            }
            None => SourceRange::UNDEFINED,
        };
        Error::parser(message, range)
    }

    /// A parse error at the current token.
    pub(crate) fn error_here(&self, message: impl Into<String>) -> Error {
        self.error_at(self.pos, message)
    }
}

/// Parses a token vector into its top-level entries.
pub fn parse_entries(tokens: &[Token]) -> Result<Vec<Entry>> {
    Parser::new(tokens).parse_file()
}

/// Tokenizes and parses source text, then runs both construction passes.
///
/// With `expand_terms` set (the façade's default), term references inside
/// messages are inlined at build time; otherwise they are resolved lazily by
/// the evaluator.
pub fn parse_resource(source: &str, expand_terms: bool) -> Result<Resource> {
    let tokens = tokenize(source);
    let entries = Parser::new(&tokens).parse_file()?;
    build_resource(entries, tokens, expand_terms)
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Parsing is deterministic: re-parsing the same source yields a
        /// structurally equal AST.
        #[test]
        fn parse_is_deterministic(
            name in "[a-z][a-z0-9-]{0,8}",
            value in "[a-zA-Z0-9 !?.]{0,20}",
        ) {
            let source = format!("{name} = {value}\n");
            let first = parse_resource(&source, true);
            let second = parse_resource(&source, true);
            match (first, second) {
                (Ok(a), Ok(b)) => {
                    prop_assert_eq!(a.message_names().collect::<Vec<_>>(),
                                    b.message_names().collect::<Vec<_>>());
                    prop_assert_eq!(a.message(&name), b.message(&name));
                }
                (Err(_), Err(_)) => {}
                _ => prop_assert!(false, "parse determinism violated"),
            }
        }
    }
}
