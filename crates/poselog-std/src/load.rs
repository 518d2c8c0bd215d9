//! Loading pose logs from disk.

use crate::cache::CacheError;
use poselog_core::trace::{NoopTracer, Tracer};
use poselog_core::{ExtractError, ParseOptions, PoseStream, parse_log_traced};
use std::fs;
use std::io;
use std::path::Path;
use std::string::FromUtf8Error;

/// Error loading a pose log.
#[derive(Debug)]
pub enum LoadError {
    /// The file could not be read.
    Io(io::Error),
    /// The file is not UTF-8 text.
    Utf8(FromUtf8Error),
    /// A numeric field in the log does not parse.
    Extract(ExtractError),
    /// A cache file could not be read or written.
    Cache(CacheError),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::Utf8(e) => write!(f, "log is not valid UTF-8: {e}"),
            Self::Extract(e) => write!(f, "{e}"),
            Self::Cache(e) => write!(f, "cache error: {e}"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Utf8(e) => Some(e),
            Self::Extract(e) => Some(e),
            Self::Cache(e) => Some(e),
        }
    }
}

impl From<io::Error> for LoadError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<FromUtf8Error> for LoadError {
    fn from(e: FromUtf8Error) -> Self {
        Self::Utf8(e)
    }
}

impl From<ExtractError> for LoadError {
    fn from(e: ExtractError) -> Self {
        Self::Extract(e)
    }
}

impl From<CacheError> for LoadError {
    fn from(e: CacheError) -> Self {
        Self::Cache(e)
    }
}

/// Read a log file as text.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not UTF-8.
pub fn read_log<P: AsRef<Path>>(path: P) -> Result<String, LoadError> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8(bytes)?)
}

/// Read and parse a log file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not UTF-8, or holds a
/// numeric field that does not parse.
pub fn load_stream<P: AsRef<Path>>(
    path: P,
    options: &ParseOptions,
) -> Result<PoseStream, LoadError> {
    load_stream_traced(path, options, &mut NoopTracer)
}

/// [`load_stream`] with trace events sent to `tracer`.
///
/// # Errors
///
/// Same as [`load_stream`].
pub fn load_stream_traced<P: AsRef<Path>, T: Tracer + ?Sized>(
    path: P,
    options: &ParseOptions,
    tracer: &mut T,
) -> Result<PoseStream, LoadError> {
    let text = read_log(path)?;
    Ok(parse_log_traced(&text, options, tracer)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn log_file(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_stream() {
        let file = log_file(
            b"records {\n  deviceType: DEVICE_TYPE_HMD\n  pose { position { x: 1 y: 2 z: 3 } }\n}\n",
        );
        let stream = load_stream(file.path(), &ParseOptions::default()).unwrap();
        assert_eq!(stream.len(), 1);
        assert_eq!(stream.records[0].position.z, 3.0);
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_stream("/nonexistent/session.txt", &ParseOptions::default());
        assert!(matches!(result, Err(LoadError::Io(_))));
    }

    #[test]
    fn test_load_non_utf8() {
        let file = log_file(b"records { deviceType: \xff\xfe }");
        let result = load_stream(file.path(), &ParseOptions::default());
        assert!(matches!(result, Err(LoadError::Utf8(_))));
    }

    #[test]
    fn test_load_bad_number() {
        let file = log_file(b"records { recordTimeStamp: noon deviceType: DEVICE_TYPE_HMD }");
        let err = load_stream(file.path(), &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::Extract(_)));
        assert!(err.to_string().contains("recordTimeStamp"));
    }
}
