//! Mode-switching lexer.
//!
//! The lexer runs in one of three modes, kept on a stack:
//!
//! - **Default** for file structure (identifiers, punctuation, numbers,
//!   comments; blank inline is skipped),
//! - **Value** for pattern text (blank inline and text runs are significant),
//! - **Str** for quoted string literals (escape sequences).
//!
//! `=` and `]` push Value, `{` pushes Default, `}` pops, `"` pushes and pops
//! Str. The one context-sensitive decision (does a newline continue the
//! current pattern or terminate it) lives in [`value`] and is answered by
//! peeking at the next line through a cursor snapshot.

mod default;
mod string;
mod value;

use crate::cursor::Cursor;
use crate::token::{Token, TokenKind};

/// The lexer's current interpretation of the input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Mode {
    /// File structure: entries, placeables, call arguments.
    Default,
    /// Pattern text after `=` or `]`.
    Value,
    /// Quoted string literal.
    Str,
}

/// Tokenizer for Fluent source text.
pub struct Lexer<'a> {
    pub(crate) cursor: Cursor<'a>,
    modes: Vec<Mode>,

    /// Byte offset where the current token starts.
    token_start: usize,
    /// Line where the current token starts (1-based).
    token_line: u32,
    /// Column where the current token starts (1-based).
    token_column: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut cursor = Cursor::new(source);
        // A leading BOM is not part of any token.
        if cursor.current_char() == '\u{feff}' {
            cursor.advance();
        }
        Self {
            cursor,
            modes: vec![Mode::Default],
            token_start: 0,
            token_line: 1,
            token_column: 1,
        }
    }

    /// Returns the next token, or `None` at the end of input.
    pub fn next_token(&mut self) -> Option<Token> {
        if self.mode() == Mode::Default {
            // Blank inline is hidden in default mode.
            while matches!(self.cursor.current_char(), ' ' | '\t') {
                self.cursor.advance();
            }
        }
        if self.cursor.is_at_end() {
            return None;
        }
        self.start_token();
        Some(match self.mode() {
            Mode::Default => self.lex_default(),
            Mode::Value => self.lex_value(),
            Mode::Str => self.lex_str(),
        })
    }

    pub(crate) fn mode(&self) -> Mode {
        *self.modes.last().unwrap_or(&Mode::Default)
    }

    pub(crate) fn push_mode(&mut self, mode: Mode) {
        self.modes.push(mode);
    }

    /// Pops the current mode. The base default mode is never popped, so a
    /// stray `}` at the top level cannot underflow the stack.
    pub(crate) fn pop_mode(&mut self) {
        if self.modes.len() > 1 {
            self.modes.pop();
        }
    }

    fn start_token(&mut self) {
        self.token_start = self.cursor.position();
        self.token_line = self.cursor.line();
        self.token_column = self.cursor.column();
    }

    /// Builds a token whose text is everything consumed since `start_token`.
    pub(crate) fn token(&self, kind: TokenKind) -> Token {
        Token::new(
            kind,
            self.cursor.slice_from(self.token_start),
            self.token_line,
            self.token_column,
        )
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// Tokenizes an entire source text.
pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).collect()
}
