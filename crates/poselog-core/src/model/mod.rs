//! Typed pose records and the stream they form.
//!
//! The stream sits at the end of the pipeline:
//!
//! ```text
//! Log text → Chunks → Lexer → Parser → RawBlock → Extractor → [PoseStream]
//! ```
//!
//! Every record in a [`PoseStream`] has a complete position and orientation,
//! either parsed from its own chunk or carried forward from an earlier one.

mod types;

pub use types::{
    DeviceType, HAND_TRACKING_LABEL, HMD_LABEL, Hand, Orientation, Position, Track,
};

use crate::lexer::{Diagnostic, Severity};
use alloc::vec::Vec;

/// Pose extracted from one `records { ... }` chunk.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoseRecord {
    /// Log time in source ticks. May repeat across devices.
    pub timestamp: i64,
    /// Device that produced the record.
    pub device_type: DeviceType,
    /// Laterality, set only for hand-pose chunks.
    pub hand: Option<Hand>,
    /// Position, parsed or carried forward.
    pub position: Position,
    /// Orientation, parsed or carried forward.
    pub orientation: Orientation,
}

impl PoseRecord {
    /// Track this record belongs to.
    #[must_use]
    pub fn track(&self) -> Track {
        Track::of(&self.device_type, self.hand)
    }
}

/// Diagnostic attributed to the chunk it came from.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChunkDiagnostic {
    /// Zero-based chunk index in file order.
    pub chunk: usize,
    /// The diagnostic. Its span is relative to the chunk text.
    pub diagnostic: Diagnostic,
}

/// Ordered pose records of one log.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoseStream {
    /// Records in file order.
    pub records: Vec<PoseRecord>,
    /// Non-fatal lexer, parser and extractor diagnostics.
    pub diagnostics: Vec<ChunkDiagnostic>,
    /// Number of chunks seen.
    pub chunks: usize,
    /// Number of chunks dropped for lacking a `deviceType`.
    pub dropped: usize,
}

impl PoseStream {
    /// Create an empty stream.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the stream has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over records in file order.
    pub fn iter(&self) -> core::slice::Iter<'_, PoseRecord> {
        self.records.iter()
    }

    /// Records of one track, in file order.
    pub fn track(&self, track: Track) -> impl Iterator<Item = &PoseRecord> {
        self.records.iter().filter(move |r| r.track() == track)
    }

    /// Check if any chunk produced an error-level diagnostic.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.diagnostic.severity == Severity::Error)
    }
}

impl<'a> IntoIterator for &'a PoseStream {
    type Item = &'a PoseRecord;
    type IntoIter = core::slice::Iter<'a, PoseRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
