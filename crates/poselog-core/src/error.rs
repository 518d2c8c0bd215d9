//! Extraction errors.

use crate::lexer::Span;
use alloc::string::String;
use core::fmt;

/// Numeric kind a field was expected to hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NumberKind {
    /// Signed integer (timestamps, joint keys).
    Integer,
    /// Floating point (coordinates, quaternion components).
    Float,
}

impl fmt::Display for NumberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer => write!(f, "integer"),
            Self::Float => write!(f, "float"),
        }
    }
}

/// A numeric field whose text does not parse.
///
/// This is the one hard failure of the pipeline: structural damage
/// degrades to diagnostics, but a non-numeric coordinate or timestamp means
/// the log itself is corrupt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractError {
    /// Zero-based chunk index in file order.
    pub chunk: usize,
    /// Dotted field path within the chunk (e.g. `pose.position.x`).
    pub field: String,
    /// The offending text.
    pub value: String,
    /// What the field should have held.
    pub expected: NumberKind,
    /// Location of the value in the chunk text.
    pub span: Span,
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "chunk {}: field `{}` has invalid {} value `{}`",
            self.chunk, self.field, self.expected, self.value
        )
    }
}

impl core::error::Error for ExtractError {}
