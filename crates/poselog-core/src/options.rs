//! Parse options.
//!
//! Every option defaults to the behavior of the legacy exporter, so
//! `ParseOptions::default()` reproduces its output exactly.

/// How the log text is split into record chunks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChunkMode {
    /// Split on the literal `records {` and cut each piece at its last `}`.
    ///
    /// Braces are not counted, so a piece holding stray text after the
    /// record's closing brace keeps that text up to the final `}`.
    #[default]
    Legacy,
    /// Match each `records {` with its closing brace by counting nesting.
    Balanced,
}

/// Which earlier record a chunk without pose data inherits from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CarryScope {
    /// The most recent record of any device or hand.
    #[default]
    Global,
    /// The most recent record of the same track (HMD, left hand,
    /// right hand, other).
    PerTrack,
}

/// How axes missing from a present `position` / `orientation` block are
/// filled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AxisFill {
    /// Keep the carried-forward value for each missing axis.
    #[default]
    CarryForward,
    /// A present block replaces the whole value; missing axes read as zero.
    Zero,
}

/// Options controlling chunking and record extraction.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParseOptions {
    /// Chunk boundary detection.
    pub chunk_mode: ChunkMode,
    /// Carry-forward scope.
    pub carry_scope: CarryScope,
    /// Missing-axis policy.
    pub axis_fill: AxisFill,
    /// Added to `position.y` of hand poses parsed from their own chunk,
    /// compensating for a hand-tracking origin below the HMD origin.
    pub hand_vertical_offset: f64,
}

impl ParseOptions {
    /// Create options with legacy defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the chunk mode.
    #[must_use]
    pub const fn with_chunk_mode(mut self, chunk_mode: ChunkMode) -> Self {
        self.chunk_mode = chunk_mode;
        self
    }

    /// Set the carry-forward scope.
    #[must_use]
    pub const fn with_carry_scope(mut self, carry_scope: CarryScope) -> Self {
        self.carry_scope = carry_scope;
        self
    }

    /// Set the missing-axis policy.
    #[must_use]
    pub const fn with_axis_fill(mut self, axis_fill: AxisFill) -> Self {
        self.axis_fill = axis_fill;
        self
    }

    /// Set the hand vertical offset.
    #[must_use]
    pub const fn with_hand_vertical_offset(mut self, offset: f64) -> Self {
        self.hand_vertical_offset = offset;
        self
    }
}
