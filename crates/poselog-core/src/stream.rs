//! Pose stream building.
//!
//! Drives every chunk of a log through parsing and extraction, in file
//! order, threading the carry-forward state from each appended record to
//! the next chunk.
//!
//! # Usage
//!
//! ```
//! use poselog_core::{DeviceType, Position, parse_log};
//!
//! let text = "records { deviceType: DEVICE_TYPE_HMD pose { position { x: 1.0 y: 2.0 z: 3.0 } } }";
//! let stream = parse_log(text).unwrap();
//!
//! assert_eq!(stream.len(), 1);
//! assert_eq!(stream.records[0].device_type, DeviceType::Hmd);
//! assert_eq!(stream.records[0].position, Position::new(1.0, 2.0, 3.0));
//! ```

use crate::chunk::chunks;
use crate::error::ExtractError;
use crate::extract::{CarryState, Extraction, FieldSource, extract};
use crate::lexer::Severity;
use crate::model::{ChunkDiagnostic, PoseRecord, PoseStream};
use crate::options::ParseOptions;
use crate::parser::parse_chunk;
use crate::trace::{NoopTracer, TraceEvent, TraceLevel, Tracer};
use crate::trace_event;

/// Incremental stream builder.
///
/// Feed chunks in file order with [`push_chunk`](Self::push_chunk), then
/// take the stream with [`finish`](Self::finish).
#[derive(Clone, Debug)]
pub struct StreamBuilder {
    options: ParseOptions,
    state: CarryState,
    stream: PoseStream,
}

impl StreamBuilder {
    /// Create a builder with the given options.
    #[must_use]
    pub fn new(options: ParseOptions) -> Self {
        Self {
            options,
            state: CarryState::new(options.carry_scope),
            stream: PoseStream::new(),
        }
    }

    /// Carry state the next chunk will be extracted with.
    #[must_use]
    pub fn state(&self) -> CarryState {
        self.state
    }

    /// Records appended so far.
    #[must_use]
    pub fn records(&self) -> &[PoseRecord] {
        &self.stream.records
    }

    /// Parse and extract the next chunk.
    ///
    /// Returns the appended record, or `None` if the chunk was dropped.
    ///
    /// # Errors
    ///
    /// Returns the chunk's [`ExtractError`] if a numeric field does not
    /// parse. The builder is left as it was before the call, except that
    /// the chunk still counts towards the chunk index.
    pub fn push_chunk(&mut self, chunk: &str) -> Result<Option<&PoseRecord>, ExtractError> {
        self.push_chunk_traced(chunk, &mut NoopTracer)
    }

    /// [`push_chunk`](Self::push_chunk) with trace events sent to `tracer`.
    ///
    /// # Errors
    ///
    /// Same as [`push_chunk`](Self::push_chunk).
    pub fn push_chunk_traced<T: Tracer + ?Sized>(
        &mut self,
        chunk: &str,
        tracer: &mut T,
    ) -> Result<Option<&PoseRecord>, ExtractError> {
        let index = self.stream.chunks;
        self.stream.chunks += 1;
        trace_event!(
            tracer,
            TraceLevel::Trace,
            TraceEvent::ChunkStart {
                index,
                len: chunk.len()
            }
        );

        let parsed = parse_chunk(chunk);
        let Extraction {
            record,
            state,
            position_source,
            orientation_source,
            diagnostics,
        } = match extract(&parsed.root, index, self.state, &self.options) {
            Ok(extraction) => extraction,
            Err(err) => {
                trace_event!(
                    tracer,
                    TraceLevel::Error,
                    TraceEvent::ExtractFailed {
                        index,
                        field: &err.field
                    }
                );
                return Err(err);
            }
        };

        for diagnostic in parsed.diagnostics.into_iter().chain(diagnostics) {
            let level = match diagnostic.severity {
                Severity::Error => TraceLevel::Warn,
                Severity::Warning => TraceLevel::Debug,
            };
            trace_event!(
                tracer,
                level,
                TraceEvent::ChunkDiagnostic {
                    index,
                    severity: diagnostic.severity,
                    message: &diagnostic.message
                }
            );
            self.stream.diagnostics.push(ChunkDiagnostic {
                chunk: index,
                diagnostic,
            });
        }

        self.state = state;
        let Some(record) = record else {
            self.stream.dropped += 1;
            trace_event!(tracer, TraceLevel::Debug, TraceEvent::ChunkDropped { index });
            return Ok(None);
        };

        trace_event!(
            tracer,
            TraceLevel::Trace,
            TraceEvent::RecordExtracted {
                index,
                timestamp: record.timestamp,
                device: record.device_type.as_str(),
                hand: record.hand
            }
        );
        let position = position_source == FieldSource::Carried;
        let orientation = orientation_source == FieldSource::Carried;
        if position || orientation {
            trace_event!(
                tracer,
                TraceLevel::Debug,
                TraceEvent::PoseCarried {
                    index,
                    position,
                    orientation
                }
            );
        }

        self.stream.records.push(record);
        Ok(self.stream.records.last())
    }

    /// Finish and return the stream.
    #[must_use]
    pub fn finish(self) -> PoseStream {
        self.stream
    }
}

impl Default for StreamBuilder {
    fn default() -> Self {
        Self::new(ParseOptions::default())
    }
}

/// Parse a whole log with default options.
///
/// # Errors
///
/// Returns an [`ExtractError`] for the first chunk holding a numeric field
/// that does not parse.
pub fn parse_log(text: &str) -> Result<PoseStream, ExtractError> {
    parse_log_with(text, &ParseOptions::default())
}

/// Parse a whole log.
///
/// # Errors
///
/// Same as [`parse_log`].
pub fn parse_log_with(text: &str, options: &ParseOptions) -> Result<PoseStream, ExtractError> {
    parse_log_traced(text, options, &mut NoopTracer)
}

/// Parse a whole log, sending trace events to `tracer`.
///
/// # Errors
///
/// Same as [`parse_log`].
pub fn parse_log_traced<T: Tracer + ?Sized>(
    text: &str,
    options: &ParseOptions,
    tracer: &mut T,
) -> Result<PoseStream, ExtractError> {
    let mut builder = StreamBuilder::new(*options);
    for chunk in chunks(text, options.chunk_mode) {
        builder.push_chunk_traced(chunk, tracer)?;
    }

    let stream = builder.finish();
    trace_event!(
        tracer,
        TraceLevel::Info,
        TraceEvent::StreamFinished {
            chunks: stream.chunks,
            records: stream.len(),
            dropped: stream.dropped
        }
    );
    Ok(stream)
}
