//! Leaf syntax types.

use crate::lexer::Span;
use alloc::string::String;

/// Field name with source location.
///
/// Field names are case-sensitive: `recordTimeStamp` and
/// `recordTimestamp` are distinct keys.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ident {
    /// The name text.
    pub name: String,
    /// Source location.
    pub span: Span,
}

impl Ident {
    /// Create a new identifier.
    #[must_use]
    pub fn new(name: String, span: Span) -> Self {
        Self { name, span }
    }
}

/// Scalar field value with source location.
///
/// Quoted values are stored with quotes stripped and backslash escapes
/// resolved; bare words are stored as written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scalar {
    /// The value text.
    pub text: String,
    /// Whether the value was written as a quoted string.
    pub quoted: bool,
    /// Source location (includes quotes).
    pub span: Span,
}

impl Scalar {
    /// Create a scalar from a bare word.
    #[must_use]
    pub fn bare(text: &str, span: Span) -> Self {
        Self {
            text: text.into(),
            quoted: false,
            span,
        }
    }

    /// Create a scalar from a quoted literal, including its quotes.
    #[must_use]
    pub fn quoted(literal: &str, span: Span) -> Self {
        Self {
            text: unquote(literal),
            quoted: true,
            span,
        }
    }

    /// The value text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// Strip the surrounding quotes of a literal and resolve escapes.
///
/// The literal may be unterminated (the lexer accepts that), in which case
/// only the opening quote is removed.
fn unquote(literal: &str) -> String {
    let mut chars = literal.chars();
    let Some(quote) = chars.next() else {
        return String::new();
    };

    let mut out = String::with_capacity(literal.len());
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some(other) => out.push(other),
                None => {}
            },
            c if c == quote => break,
            c => out.push(c),
        }
    }
    out
}
