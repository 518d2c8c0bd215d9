//! Block and field types.

use super::{Ident, Scalar};
use crate::lexer::{Diagnostic, Severity, Span};
use alloc::vec::Vec;

/// Field value: a scalar or a nested block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    /// `key: value`
    Scalar(Scalar),
    /// `key { ... }`
    Block(RawBlock),
}

impl Value {
    /// The scalar, if this is one.
    #[must_use]
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Scalar(s) => Some(s),
            Self::Block(_) => None,
        }
    }

    /// The nested block, if this is one.
    #[must_use]
    pub fn as_block(&self) -> Option<&RawBlock> {
        match self {
            Self::Block(b) => Some(b),
            Self::Scalar(_) => None,
        }
    }
}

/// One `key: value` or `key { ... }` entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    /// Field name.
    pub key: Ident,
    /// Field value.
    pub value: Value,
}

impl Field {
    /// Create a new field.
    #[must_use]
    pub fn new(key: Ident, value: Value) -> Self {
        Self { key, value }
    }
}

/// Block of fields, in source order.
///
/// Repeated keys are kept; lookups resolve to the last occurrence, matching
/// a single linear scan where later assignments overwrite earlier ones.
///
/// Dropping and comparing walk the tree with a heap stack, so arbitrarily
/// deep blocks are safe to discard. `Clone` and `Debug` still recurse.
#[derive(Clone, Debug, Default)]
pub struct RawBlock {
    /// Fields in source order.
    pub fields: Vec<Field>,
    /// Source location (opening to closing brace for nested blocks).
    pub span: Span,
}

impl RawBlock {
    /// Create an empty block.
    #[must_use]
    pub fn new(span: Span) -> Self {
        Self {
            fields: Vec::new(),
            span,
        }
    }

    /// Append a field.
    pub fn push(&mut self, field: Field) {
        self.fields.push(field);
    }

    /// Number of fields, repeats included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the block has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Look up the last field named `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Field> {
        self.fields.iter().rev().find(|f| f.key.name == key)
    }

    /// Look up the last field whose name is any of `keys`.
    #[must_use]
    pub fn get_any(&self, keys: &[&str]) -> Option<&Field> {
        self.fields
            .iter()
            .rev()
            .find(|f| keys.contains(&f.key.name.as_str()))
    }

    /// The scalar value of `key`, if its last occurrence is a scalar.
    #[must_use]
    pub fn scalar(&self, key: &str) -> Option<&Scalar> {
        self.get(key).and_then(|f| f.value.as_scalar())
    }

    /// The nested block of `key`, if its last occurrence is a block.
    #[must_use]
    pub fn block(&self, key: &str) -> Option<&RawBlock> {
        self.get(key).and_then(|f| f.value.as_block())
    }

    /// Check if any field is named `key`.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Nesting depth of this block: 1 for a block without nested blocks.
    #[must_use]
    pub fn depth(&self) -> usize {
        // Iterative so adversarially deep trees cannot overflow the stack.
        let mut max = 0;
        let mut pending = alloc::vec![(self, 1usize)];
        while let Some((block, depth)) = pending.pop() {
            max = max.max(depth);
            for field in &block.fields {
                if let Value::Block(child) = &field.value {
                    pending.push((child, depth + 1));
                }
            }
        }
        max
    }
}

impl Drop for RawBlock {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        detach_children(&mut self.fields, &mut pending);
        while let Some(mut block) = pending.pop() {
            detach_children(&mut block.fields, &mut pending);
        }
    }
}

/// Move the nested blocks of `fields` onto `pending`, leaving `fields` empty.
fn detach_children(fields: &mut Vec<Field>, pending: &mut Vec<RawBlock>) {
    for field in fields.drain(..) {
        if let Value::Block(child) = field.value {
            pending.push(child);
        }
    }
}

impl PartialEq for RawBlock {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = alloc::vec![(self, other)];
        while let Some((a, b)) = pending.pop() {
            if a.span != b.span || a.fields.len() != b.fields.len() {
                return false;
            }
            for (x, y) in a.fields.iter().zip(&b.fields) {
                if x.key != y.key {
                    return false;
                }
                match (&x.value, &y.value) {
                    (Value::Scalar(s), Value::Scalar(t)) if s == t => {}
                    (Value::Block(c), Value::Block(d)) => pending.push((c, d)),
                    _ => return false,
                }
            }
        }
        true
    }
}

impl Eq for RawBlock {}

/// Result of parsing one chunk.
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedChunk {
    /// Top-level fields of the chunk.
    pub root: RawBlock,
    /// Lexer and parser diagnostics.
    pub diagnostics: Vec<Diagnostic>,
}

impl ParsedChunk {
    /// Check if this chunk has error-level diagnostics.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }
}
