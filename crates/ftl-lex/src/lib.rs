//! ftl-lex - Tokenizer for Fluent source text.
//!
//! Fluent is context sensitive at the lexical level: the same characters mean
//! different things inside a pattern value, inside a quoted string and in the
//! surrounding file structure. The lexer therefore runs a small mode stack
//! (see [`lexer`]) and answers the one genuinely ambiguous question, whether
//! a newline continues a multi-line pattern or ends the entry, by peeking at
//! the next line before committing.
//!
//! The output is a flat token vector. Positions live on the tokens
//! themselves, so AST nodes can refer back to source by token index alone.

pub mod cursor;
pub mod lexer;
pub mod token;

pub use cursor::Cursor;
pub use lexer::{tokenize, Lexer};
pub use token::{Token, TokenKind};
