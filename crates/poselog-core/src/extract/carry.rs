//! Carry-forward state.

use crate::model::{Orientation, PoseRecord, Position, Track};
use crate::options::CarryScope;

/// Position and orientation a chunk without pose data inherits.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Carried {
    /// Last known position.
    pub position: Position,
    /// Last known orientation.
    pub orientation: Orientation,
}

impl Carried {
    /// State before the first record: all zeros, including `w`.
    pub const INITIAL: Self = Self {
        position: Position::ZERO,
        orientation: Orientation::ZERO,
    };
}

impl Default for Carried {
    fn default() -> Self {
        Self::INITIAL
    }
}

/// Carry-forward accumulator threaded through extraction.
///
/// Passed by value into each extraction and returned updated, so the
/// extractor stays a pure function of chunk and state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CarryState {
    scope: CarryScope,
    /// One slot per [`Track`]; only slot 0 is used under global scope.
    slots: [Carried; 4],
}

impl CarryState {
    /// Initial state for the given scope.
    #[must_use]
    pub const fn new(scope: CarryScope) -> Self {
        Self {
            scope,
            slots: [Carried::INITIAL; 4],
        }
    }

    /// Values a record on `track` inherits.
    #[must_use]
    pub const fn previous(&self, track: Track) -> Carried {
        self.slots[self.slot(track)]
    }

    /// State after `record` has been appended to the stream.
    #[must_use]
    pub fn advanced(mut self, record: &PoseRecord) -> Self {
        let slot = self.slot(record.track());
        self.slots[slot] = Carried {
            position: record.position,
            orientation: record.orientation,
        };
        self
    }

    const fn slot(&self, track: Track) -> usize {
        match self.scope {
            CarryScope::Global => 0,
            CarryScope::PerTrack => track.index(),
        }
    }
}

impl Default for CarryState {
    fn default() -> Self {
        Self::new(CarryScope::default())
    }
}
