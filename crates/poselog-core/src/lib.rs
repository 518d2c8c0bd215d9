//! poselog-core: Pure pose-log parser library
//!
//! This crate turns text-exported pose logs (`records { ... }` blocks from
//! HMD and hand-tracking sessions) into ordered, typed pose records.
//! It is designed to be `no_std` compatible and IO-free.
//!
//! ```text
//! Log text → Chunks → Lexer → Parser → RawBlock → Extractor → PoseStream
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod ast;
pub mod chunk;
pub mod error;
pub mod extract;
pub mod lexer;
pub mod model;
pub mod options;
pub mod parser;
pub mod stream;
pub mod table;
pub mod timeline;
pub mod trace;

pub use error::{ExtractError, NumberKind};
pub use model::{
    ChunkDiagnostic, DeviceType, Hand, Orientation, PoseRecord, PoseStream, Position, Track,
};
pub use options::{AxisFill, CarryScope, ChunkMode, ParseOptions};
pub use stream::{StreamBuilder, parse_log, parse_log_traced, parse_log_with};
