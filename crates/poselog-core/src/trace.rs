//! Parse tracing support.
//!
//! Structured events for following a log through chunking and extraction.
//! Nothing is emitted unless a [`Tracer`] is passed in; the default
//! [`NoopTracer`] discards everything.

use crate::lexer::Severity;
use crate::model::Hand;
use core::fmt;

/// Trace verbosity level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum TraceLevel {
    /// Critical errors only.
    Error,
    /// Warnings and errors.
    Warn,
    /// Stream summaries.
    Info,
    /// Per-chunk decisions (drops, carry-forward).
    Debug,
    /// Every chunk and record.
    Trace,
}

/// Structured trace events emitted while building a stream.
#[derive(Clone, Debug)]
pub enum TraceEvent<'a> {
    /// A chunk is about to be parsed.
    ChunkStart {
        /// Chunk index in file order.
        index: usize,
        /// Chunk length in bytes.
        len: usize,
    },
    /// A chunk produced a lexer, parser or extractor diagnostic.
    ChunkDiagnostic {
        /// Chunk index.
        index: usize,
        /// Diagnostic severity.
        severity: Severity,
        /// Diagnostic message.
        message: &'a str,
    },
    /// A chunk had no `deviceType` and was left out of the stream.
    ChunkDropped {
        /// Chunk index.
        index: usize,
    },
    /// A record was appended to the stream.
    RecordExtracted {
        /// Chunk index.
        index: usize,
        /// Record timestamp.
        timestamp: i64,
        /// Device label as written.
        device: &'a str,
        /// Hand, for hand-pose records.
        hand: Option<Hand>,
    },
    /// A record inherited position and/or orientation from an earlier one.
    PoseCarried {
        /// Chunk index.
        index: usize,
        /// Position was carried.
        position: bool,
        /// Orientation was carried.
        orientation: bool,
    },
    /// A numeric field failed to parse; the stream is abandoned.
    ExtractFailed {
        /// Chunk index.
        index: usize,
        /// Dotted field path.
        field: &'a str,
    },
    /// All chunks have been consumed.
    StreamFinished {
        /// Chunks seen.
        chunks: usize,
        /// Records appended.
        records: usize,
        /// Chunks dropped.
        dropped: usize,
    },
}

impl fmt::Display for TraceEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChunkStart { index, len } => write!(f, "chunk {index}: {len} bytes"),
            Self::ChunkDiagnostic {
                index,
                severity,
                message,
            } => {
                let severity = match severity {
                    Severity::Error => "error",
                    Severity::Warning => "warning",
                };
                write!(f, "chunk {index}: {severity}: {message}")
            }
            Self::ChunkDropped { index } => write!(f, "chunk {index}: no deviceType, dropped"),
            Self::RecordExtracted {
                index,
                timestamp,
                device,
                hand,
            } => {
                write!(f, "chunk {index}: {device} at {timestamp}")?;
                match hand {
                    Some(hand) => write!(f, " ({})", hand.as_str()),
                    None => Ok(()),
                }
            }
            Self::PoseCarried {
                index,
                position,
                orientation,
            } => {
                let what = match (position, orientation) {
                    (true, true) => "position and orientation",
                    (true, false) => "position",
                    _ => "orientation",
                };
                write!(f, "chunk {index}: {what} carried forward")
            }
            Self::ExtractFailed { index, field } => {
                write!(f, "chunk {index}: field `{field}` is not a number")
            }
            Self::StreamFinished {
                chunks,
                records,
                dropped,
            } => write!(f, "{chunks} chunks, {records} records, {dropped} dropped"),
        }
    }
}

/// Trait for receiving trace events while a log is parsed.
///
/// The tracer filters events by returning a minimum trace level from
/// `level()`.
pub trait Tracer {
    /// Returns the most verbose level to emit.
    ///
    /// Events more verbose than this are not passed to `trace()`.
    /// Default: `TraceLevel::Info`.
    fn level(&self) -> TraceLevel {
        TraceLevel::Info
    }

    /// Called for each trace event at or below the configured level.
    fn trace(&mut self, level: TraceLevel, event: TraceEvent<'_>);
}

impl<T: Tracer + ?Sized> Tracer for &mut T {
    fn level(&self) -> TraceLevel {
        (**self).level()
    }

    fn trace(&mut self, level: TraceLevel, event: TraceEvent<'_>) {
        (**self).trace(level, event);
    }
}

/// A no-op tracer that discards all events.
#[derive(Default, Clone, Copy, Debug)]
pub struct NoopTracer;

impl Tracer for NoopTracer {
    fn level(&self) -> TraceLevel {
        TraceLevel::Error
    }

    fn trace(&mut self, _level: TraceLevel, _event: TraceEvent<'_>) {}
}

/// Emit a trace event if the tracer level permits.
///
/// The level is checked before the event is constructed.
#[macro_export]
macro_rules! trace_event {
    ($tracer:expr, $level:expr, $event:expr) => {
        if $level <= $tracer.level() {
            $tracer.trace($level, $event);
        }
    };
}
