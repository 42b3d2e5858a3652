//! Token model.

use std::fmt;

use ftl_util::Located;

/// The kind of a lexed token.
///
/// `Text` and `BlankInline` only appear in value mode, the `String*` kinds
/// only between quotes, everything else in default mode. Space and tab are
/// skipped (never emitted) in default mode; `Newline` is always emitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    /// `#`, `##` or `###` comment, spanning to the end of the line.
    Comment,
    /// `\n` or `\r\n`.
    Newline,
    /// `->`
    Arrow,
    /// `{`
    BraceOpen,
    /// `}`
    BraceClose,
    /// `[`
    BracketOpen,
    /// `]`
    BracketClose,
    /// `(`
    ParenOpen,
    /// `)`
    ParenClose,
    /// `-`
    Minus,
    /// `.`
    Dot,
    /// `,`
    Comma,
    /// `:`
    Colon,
    /// `*`
    Asterisk,
    /// `$`
    Dollar,
    /// `"`
    Quote,
    /// `=`
    Equals,
    /// `[0-9]+(\.[0-9]+)?`
    Number,
    /// `[A-Za-z][A-Za-z0-9_-]*`
    Ident,
    /// A run of spaces and tabs in value mode.
    BlankInline,
    /// A maximal run of pattern text in value mode.
    Text,
    /// A run of plain characters between quotes.
    StringText,
    /// `\n`, `\r`, `\t`, `\"` or `\\` between quotes.
    StringEscape,
    /// `\uHHHH` or `\UHHHHHH` between quotes.
    StringUnicode,
    /// Anything the lexer could not make sense of. The parser turns these
    /// into parse errors at the token's range.
    Error,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Comment => "comment",
            TokenKind::Newline => "newline",
            TokenKind::Arrow => "'->'",
            TokenKind::BraceOpen => "'{'",
            TokenKind::BraceClose => "'}'",
            TokenKind::BracketOpen => "'['",
            TokenKind::BracketClose => "']'",
            TokenKind::ParenOpen => "'('",
            TokenKind::ParenClose => "')'",
            TokenKind::Minus => "'-'",
            TokenKind::Dot => "'.'",
            TokenKind::Comma => "','",
            TokenKind::Colon => "':'",
            TokenKind::Asterisk => "'*'",
            TokenKind::Dollar => "'$'",
            TokenKind::Quote => "'\"'",
            TokenKind::Equals => "'='",
            TokenKind::Number => "number",
            TokenKind::Ident => "identifier",
            TokenKind::BlankInline => "blank",
            TokenKind::Text => "text",
            TokenKind::StringText => "string text",
            TokenKind::StringEscape => "escape sequence",
            TokenKind::StringUnicode => "unicode escape",
            TokenKind::Error => "invalid input",
        };
        f.write_str(name)
    }
}

/// A single token with its raw lexeme and the position it starts at.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// The raw source text of the token. Escape sequences are kept verbatim;
    /// decoding happens in the parser.
    pub text: String,
    /// Line the token starts on (1-based).
    pub line: u32,
    /// Column the token starts at (1-based, in characters).
    pub column: u32,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
            column,
        }
    }
}

impl Located for Token {
    fn line(&self) -> u32 {
        self.line
    }

    fn column(&self) -> u32 {
        self.column
    }
}
