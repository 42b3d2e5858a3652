//! Source location tracking.
//!
//! AST nodes record where they came from as a range of *token indices*
//! ([`TokenRange`]), which stays cheap to store and copy. When a location has
//! to be shown to a human, the range is resolved against the file's token
//! vector into line/column form ([`SourceRange`]).

use std::fmt;

/// A line/column position in source text (both 1-based).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct SourcePos {
    pub line: u32,
    pub column: u32,
}

impl SourcePos {
    #[inline]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourcePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A resolved source range, from the start of the first token to the start
/// of the last token it covers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SourceRange {
    pub start: SourcePos,
    pub end: SourcePos,
}

impl SourceRange {
    /// Range for nodes whose origin is unknown.
    pub const UNDEFINED: SourceRange = SourceRange {
        start: SourcePos { line: 0, column: 0 },
        end: SourcePos { line: 0, column: 0 },
    };

    #[inline]
    pub const fn new(start: SourcePos, end: SourcePos) -> Self {
        Self { start, end }
    }
}

impl fmt::Display for SourceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Anything that knows the line/column it starts at. Implemented by the
/// lexer's token type so [`TokenRange`] can resolve against a token vector.
pub trait Located {
    fn line(&self) -> u32;
    fn column(&self) -> u32;
}

/// A half-open range of token indices attached to an AST node.
///
/// Two sentinel ranges exist besides real ranges: [`TokenRange::UNDEFINED`]
/// for nodes built from an unknown origin and [`TokenRange::SYNTHETIC`] for
/// nodes built programmatically rather than parsed from source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TokenRange {
    /// Index of the first token of the node.
    pub start: usize,
    /// Index one past the last token of the node.
    pub end: usize,
}

impl TokenRange {
    /// Node built from an unknown origin.
    pub const UNDEFINED: TokenRange = TokenRange {
        start: usize::MAX,
        end: usize::MAX,
    };

    /// Node built programmatically, not from source.
    pub const SYNTHETIC: TokenRange = TokenRange {
        start: usize::MAX - 1,
        end: usize::MAX - 1,
    };

    #[inline]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// A range covering a single token.
    #[inline]
    pub const fn point(index: usize) -> Self {
        Self {
            start: index,
            end: index + 1,
        }
    }

    #[inline]
    pub fn is_undefined(&self) -> bool {
        *self == Self::UNDEFINED
    }

    #[inline]
    pub fn is_synthetic(&self) -> bool {
        *self == Self::SYNTHETIC
    }

    /// True if the range refers to actual token indices.
    #[inline]
    pub fn is_real(&self) -> bool {
        !self.is_undefined() && !self.is_synthetic()
    }

    /// Merge two ranges into one covering both. Sentinels are sticky: merging
    /// with a non-real range keeps the real one.
    pub fn merge(self, other: TokenRange) -> TokenRange {
        match (self.is_real(), other.is_real()) {
            (true, true) => TokenRange {
                start: self.start.min(other.start),
                end: self.end.max(other.end),
            },
            (true, false) => self,
            (false, true) => other,
            (false, false) => self,
        }
    }

    /// Resolve the range against the token vector it was produced from.
    ///
    /// Sentinel or out-of-bounds ranges resolve to [`SourceRange::UNDEFINED`].
    pub fn resolve<T: Located>(&self, tokens: &[T]) -> SourceRange {
        if !self.is_real() || self.start >= self.end {
            return SourceRange::UNDEFINED;
        }
        let (Some(first), Some(last)) = (tokens.get(self.start), tokens.get(self.end - 1)) else {
            return SourceRange::UNDEFINED;
        };
        SourceRange::new(
            SourcePos::new(first.line(), first.column()),
            SourcePos::new(last.line(), last.column()),
        )
    }
}

impl Default for TokenRange {
    fn default() -> Self {
        Self::UNDEFINED
    }
}
