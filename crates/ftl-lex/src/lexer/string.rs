//! String-mode lexing: quoted literals.
//!
//! Escape sequences are emitted as their own tokens (`StringEscape`,
//! `StringUnicode`) with the raw lexeme preserved; the parser decodes them
//! when it builds the string literal.

use super::Lexer;
use crate::token::{Token, TokenKind};

impl<'a> Lexer<'a> {
    pub(crate) fn lex_str(&mut self) -> Token {
        match self.cursor.current_char() {
            '"' => {
                self.cursor.advance();
                self.pop_mode();
                self.token(TokenKind::Quote)
            }
            '\\' => self.lex_escape(),
            '\n' | '\r' => {
                // Unterminated literal. Leave string mode without consuming
                // the newline so the enclosing mode sees it; the zero-width
                // error token marks the spot for the parser.
                self.pop_mode();
                self.token(TokenKind::Error)
            }
            _ => {
                while !self.cursor.is_at_end() {
                    match self.cursor.current_char() {
                        '"' | '\\' | '\n' | '\r' => break,
                        _ => self.cursor.advance(),
                    }
                }
                self.token(TokenKind::StringText)
            }
        }
    }

    /// Lexes `\n`, `\r`, `\t`, `\"`, `\\`, `\uHHHH` or `\UHHHHHH`.
    fn lex_escape(&mut self) -> Token {
        self.cursor.advance();
        match self.cursor.current_char() {
            'n' | 'r' | 't' | '"' | '\\' => {
                self.cursor.advance();
                self.token(TokenKind::StringEscape)
            }
            'u' => {
                self.cursor.advance();
                self.lex_hex_digits(4)
            }
            'U' => {
                self.cursor.advance();
                self.lex_hex_digits(6)
            }
            '\0' => self.token(TokenKind::Error),
            _ => {
                self.cursor.advance();
                self.token(TokenKind::Error)
            }
        }
    }

    fn lex_hex_digits(&mut self, count: usize) -> Token {
        for _ in 0..count {
            if !self.cursor.current_char().is_ascii_hexdigit() {
                return self.token(TokenKind::Error);
            }
            self.cursor.advance();
        }
        self.token(TokenKind::StringUnicode)
    }
}
