//! Bridge from parse tracing to the `log` facade.

use poselog_core::trace::{TraceEvent, TraceLevel, Tracer};

/// Log target used for all forwarded events.
pub const TARGET: &str = "poselog";

/// A [`Tracer`] that forwards events to the `log` crate.
///
/// Events are filtered by the global `log::max_level()`, so an
/// uninitialized logger costs one level comparison per event.
#[derive(Default, Clone, Copy, Debug)]
pub struct LogTracer;

impl Tracer for LogTracer {
    fn level(&self) -> TraceLevel {
        match log::max_level() {
            log::LevelFilter::Off | log::LevelFilter::Error => TraceLevel::Error,
            log::LevelFilter::Warn => TraceLevel::Warn,
            log::LevelFilter::Info => TraceLevel::Info,
            log::LevelFilter::Debug => TraceLevel::Debug,
            log::LevelFilter::Trace => TraceLevel::Trace,
        }
    }

    fn trace(&mut self, level: TraceLevel, event: TraceEvent<'_>) {
        log::log!(target: TARGET, to_log_level(level), "{event}");
    }
}

fn to_log_level(level: TraceLevel) -> log::Level {
    match level {
        TraceLevel::Error => log::Level::Error,
        TraceLevel::Warn => log::Level::Warn,
        TraceLevel::Info => log::Level::Info,
        TraceLevel::Debug => log::Level::Debug,
        TraceLevel::Trace => log::Level::Trace,
    }
}
