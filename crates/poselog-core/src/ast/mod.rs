//! Untyped syntax tree of one record chunk.
//!
//! The tree captures the chunk as written: nested blocks of named fields,
//! each either a scalar or another block, with source spans kept for
//! diagnostics. Interpreting fields as poses happens later, in
//! [`crate::extract`].

mod block;
mod common;

pub use block::{Field, ParsedChunk, RawBlock, Value};
pub use common::{Ident, Scalar};
