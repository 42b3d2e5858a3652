//! Default-mode lexing: file structure.

use super::{Lexer, Mode};
use crate::token::{Token, TokenKind};

/// True for the first character of an identifier.
fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic()
}

/// True for a continuation character of an identifier.
fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

impl<'a> Lexer<'a> {
    pub(crate) fn lex_default(&mut self) -> Token {
        let c = self.cursor.current_char();
        match c {
            '\n' | '\r' => {
                self.lex_newline();
                self.token(TokenKind::Newline)
            }
            '#' => self.lex_comment(),
            '-' => {
                self.cursor.advance();
                if self.cursor.match_char('>') {
                    self.token(TokenKind::Arrow)
                } else {
                    self.token(TokenKind::Minus)
                }
            }
            '{' => {
                self.cursor.advance();
                self.push_mode(Mode::Default);
                self.token(TokenKind::BraceOpen)
            }
            '}' => {
                self.cursor.advance();
                self.pop_mode();
                self.token(TokenKind::BraceClose)
            }
            '[' => {
                self.cursor.advance();
                self.token(TokenKind::BracketOpen)
            }
            ']' => {
                self.cursor.advance();
                self.push_mode(Mode::Value);
                self.token(TokenKind::BracketClose)
            }
            '(' => {
                self.cursor.advance();
                self.token(TokenKind::ParenOpen)
            }
            ')' => {
                self.cursor.advance();
                self.token(TokenKind::ParenClose)
            }
            '.' => {
                self.cursor.advance();
                self.token(TokenKind::Dot)
            }
            ',' => {
                self.cursor.advance();
                self.token(TokenKind::Comma)
            }
            ':' => {
                self.cursor.advance();
                self.token(TokenKind::Colon)
            }
            '*' => {
                self.cursor.advance();
                self.token(TokenKind::Asterisk)
            }
            '$' => {
                self.cursor.advance();
                self.token(TokenKind::Dollar)
            }
            '=' => {
                self.cursor.advance();
                self.push_mode(Mode::Value);
                self.token(TokenKind::Equals)
            }
            '"' => {
                self.cursor.advance();
                self.push_mode(Mode::Str);
                self.token(TokenKind::Quote)
            }
            c if c.is_ascii_digit() => self.lex_number(),
            c if is_ident_start(c) => self.lex_ident(),
            _ => {
                self.cursor.advance();
                self.token(TokenKind::Error)
            }
        }
    }

    /// Consumes `\n` or `\r\n` (a lone `\r` also counts as a newline).
    pub(crate) fn lex_newline(&mut self) {
        if self.cursor.match_char('\r') {
            self.cursor.match_char('\n');
        } else {
            self.cursor.advance();
        }
    }

    /// Lexes a `#`/`##`/`###` comment spanning to the end of the line.
    fn lex_comment(&mut self) -> Token {
        let mut hashes = 0;
        while self.cursor.current_char() == '#' {
            hashes += 1;
            self.cursor.advance();
        }
        if hashes > 3 {
            return self.token(TokenKind::Error);
        }
        match self.cursor.current_char() {
            ' ' => {
                self.cursor.advance();
                while !matches!(self.cursor.current_char(), '\n' | '\r' | '\0') {
                    self.cursor.advance();
                }
                self.token(TokenKind::Comment)
            }
            // A bare comment sigil with nothing after it.
            '\n' | '\r' | '\0' => self.token(TokenKind::Comment),
            _ => self.token(TokenKind::Error),
        }
    }

    /// Lexes `[0-9]+(\.[0-9]+)?`.
    fn lex_number(&mut self) -> Token {
        while self.cursor.current_char().is_ascii_digit() {
            self.cursor.advance();
        }
        if self.cursor.current_char() == '.' && self.cursor.char_at(1).is_ascii_digit() {
            self.cursor.advance();
            while self.cursor.current_char().is_ascii_digit() {
                self.cursor.advance();
            }
        }
        self.token(TokenKind::Number)
    }

    /// Lexes `[A-Za-z][A-Za-z0-9_-]*`. A `-` that starts an `->` arrow is
    /// left for the next token rather than swallowed into the identifier.
    fn lex_ident(&mut self) -> Token {
        self.cursor.advance();
        loop {
            let c = self.cursor.current_char();
            if !is_ident_continue(c) {
                break;
            }
            if c == '-' && self.cursor.char_at(1) == '>' {
                break;
            }
            self.cursor.advance();
        }
        self.token(TokenKind::Ident)
    }
}
