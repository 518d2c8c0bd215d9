//! poselog-std: Filesystem loader and CLI utilities
//!
//! This crate provides convenience utilities for native Rust usage,
//! including file loading, stream caching, `log` integration and CLI tools.

pub mod cache;
pub mod load;
pub mod log_tracer;

pub use cache::{CacheError, load_stream_cached};
pub use load::{LoadError, load_stream, load_stream_traced};
pub use log_tracer::LogTracer;
pub use poselog_core;
