//! Token types and spans.

use super::ByteOffset;

/// Span of chunk text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    /// Start byte offset (inclusive).
    pub start: ByteOffset,
    /// End byte offset (exclusive).
    pub end: ByteOffset,
}

impl Span {
    /// Create a new span.
    #[must_use]
    pub const fn new(start: ByteOffset, end: ByteOffset) -> Self {
        Self { start, end }
    }

    /// Length of the span in bytes.
    #[must_use]
    pub const fn len(&self) -> ByteOffset {
        self.end - self.start
    }

    /// Check if the span is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Slice `source` by this span, or `""` if it falls outside.
    #[must_use]
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        source
            .get(self.start as usize..self.end as usize)
            .unwrap_or("")
    }
}

/// Token with kind and source span.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// Location in chunk text.
    pub span: Span,
}

impl Token {
    /// Create a new token.
    #[must_use]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Token kinds of the record block grammar.
///
/// The grammar only distinguishes structure from words: field names, enum
/// labels and numbers all lex as [`TokenKind::Word`]. Whether a word is a
/// key or a value is decided by the parser from the token that follows it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TokenKind {
    /// Lexical error (stray byte the grammar has no use for).
    Error = 0,
    /// End of input.
    Eof,
    /// Bare word: field name, enum label or number.
    Word,
    /// Quoted string literal, quotes included in the span.
    QuotedString,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `:`
    Colon,
}

impl TokenKind {
    /// Check if this token can serve as a scalar value.
    #[must_use]
    pub const fn is_value(self) -> bool {
        matches!(self, Self::Word | Self::QuotedString)
    }
}
