//! Value-mode lexing: pattern text.
//!
//! Inside a pattern, whitespace is significant: space/tab runs become
//! `BlankInline` tokens and everything that is not structure becomes `Text`
//! runs. The interesting part is the newline decision, [`Lexer::pattern_continues`].

use super::{Lexer, Mode};
use crate::token::{Token, TokenKind};

impl<'a> Lexer<'a> {
    pub(crate) fn lex_value(&mut self) -> Token {
        match self.cursor.current_char() {
            '\n' | '\r' => {
                self.lex_newline();
                if !self.pattern_continues() {
                    self.pop_mode();
                }
                self.token(TokenKind::Newline)
            }
            '{' => {
                self.cursor.advance();
                self.push_mode(Mode::Default);
                self.token(TokenKind::BraceOpen)
            }
            ' ' | '\t' => {
                while matches!(self.cursor.current_char(), ' ' | '\t') {
                    self.cursor.advance();
                }
                self.token(TokenKind::BlankInline)
            }
            _ => {
                // Maximal run of pattern text. `}` is ordinary text here; a
                // closing brace is only structure in default mode.
                while !self.cursor.is_at_end() {
                    match self.cursor.current_char() {
                        '{' | '\n' | '\r' | ' ' | '\t' => break,
                        _ => self.cursor.advance(),
                    }
                }
                self.token(TokenKind::Text)
            }
        }
    }

    /// Decides whether the newline just consumed continues the current
    /// pattern or terminates it.
    ///
    /// The pattern terminates iff any of:
    /// - the next line does not start with a space/tab continuation (this
    ///   includes the end of input),
    /// - a selector follows (`*` or `[` after the indent),
    /// - an attribute follows (`.` after the indent),
    /// - a placeable end follows (`}` after the indent).
    ///
    /// The lookahead walks the cursor forward over the indent and rewinds,
    /// so nothing is consumed either way.
    fn pattern_continues(&mut self) -> bool {
        if !matches!(self.cursor.current_char(), ' ' | '\t') {
            return false;
        }
        let snapshot = self.cursor.snapshot();
        while matches!(self.cursor.current_char(), ' ' | '\t') {
            self.cursor.advance();
        }
        let first = self.cursor.current_char();
        self.cursor.restore(snapshot);
        !matches!(first, '*' | '[' | '.' | '}')
    }
}

#[cfg(test)]
mod tests {
    use crate::token::TokenKind;
    use crate::tokenize;

    /// Collects the kinds of the tokens a pattern value produces, skipping
    /// the `m` `=` prefix.
    fn value_kinds(value: &str) -> Vec<TokenKind> {
        let source = format!("m ={value}");
        tokenize(&source).into_iter().skip(2).map(|t| t.kind).collect()
    }

    #[test]
    fn test_text_run_stops_at_placeable() {
        use TokenKind::*;
        assert_eq!(
            value_kinds(" ab{$x}cd"),
            vec![BlankInline, Text, BraceOpen, Dollar, Ident, BraceClose, Text]
        );
    }

    #[test]
    fn test_closing_brace_is_text_in_value_mode() {
        use TokenKind::*;
        // Without an open placeable on the mode stack the `}` after `!` is
        // popped back into value mode and re-lexed... it must simply be text.
        assert_eq!(value_kinds(" a}b"), vec![BlankInline, Text]);
        let tokens = tokenize("m = a}b");
        assert_eq!(tokens[3].text, "a}b");
    }

    #[test]
    fn test_blank_line_without_indent_terminates() {
        use TokenKind::*;
        // The line after `one` is completely empty, so the pattern ends.
        assert_eq!(
            value_kinds(" one\n\nnext = x\n")[..3],
            [BlankInline, Text, Newline]
        );
    }

    #[test]
    fn test_indented_blank_line_continues() {
        use TokenKind::*;
        assert_eq!(
            value_kinds(" one\n   \n   two\n"),
            vec![
                BlankInline, Text, Newline, BlankInline, Newline, BlankInline, Text, Newline
            ]
        );
    }
}
