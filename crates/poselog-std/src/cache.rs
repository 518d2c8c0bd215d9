//! Pose stream caching with fingerprint support.
//!
//! Parsing a long session export is slow compared to reading back its
//! records. A cache file stores the parsed [`PoseStream`] together with a
//! fingerprint of the log text and the [`ParseOptions`] it was parsed with,
//! so a stale cache is detected and regenerated.
//!
//! # File Format
//!
//! Cache files use the `.plog` extension by convention:
//!
//! ```text
//! ┌────────────────────────────────────────┐
//! │ Header (9 or 41 bytes)                 │
//! │   magic: [u8; 4]        "PLOG"         │
//! │   version: u32          Schema version │
//! │   has_fingerprint: u8   0 or 1         │
//! │   fingerprint: [u8; 32] (if present)   │
//! ├────────────────────────────────────────┤
//! │ Payload (postcard-encoded PoseStream)  │
//! └────────────────────────────────────────┘
//! ```
//!
//! # Examples
//!
//! ```ignore
//! let stream = load_stream_cached("session.txt", "session.plog", &ParseOptions::default())?;
//! // Fingerprints the log, reuses the cache if it matches, reparses otherwise
//! ```

use crate::load::{LoadError, read_log};
use crate::log_tracer::LogTracer;
use poselog_core::{ParseOptions, PoseStream, parse_log_traced};
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::Path;

/// Current schema version. Bump on any breaking change to serialized format.
pub const SCHEMA_VERSION: u32 = 1;

/// Magic bytes identifying a poselog cache file.
const MAGIC: [u8; 4] = *b"PLOG";

/// Header length without a fingerprint: magic, version, flag.
const HEADER_LEN: usize = 9;

/// Header length with a fingerprint.
const HEADER_LEN_FINGERPRINT: usize = HEADER_LEN + 32;

/// Cache error.
#[derive(Debug)]
pub enum CacheError {
    /// File does not start with expected magic bytes.
    InvalidMagic,
    /// Schema version mismatch.
    VersionMismatch {
        /// Expected version.
        expected: u32,
        /// Found version.
        found: u32,
    },
    /// Fingerprint does not match expected value.
    FingerprintMismatch,
    /// Header is truncated.
    TruncatedHeader,
    /// Postcard serialization failed.
    SerializationFailed(postcard::Error),
    /// Postcard deserialization failed.
    DeserializationFailed(postcard::Error),
    /// IO error.
    Io(io::Error),
}

impl std::fmt::Display for CacheError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidMagic => write!(f, "invalid magic bytes (expected PLOG)"),
            Self::VersionMismatch { expected, found } => {
                write!(f, "version mismatch: expected {expected}, found {found}")
            }
            Self::FingerprintMismatch => write!(f, "fingerprint mismatch"),
            Self::TruncatedHeader => write!(f, "truncated header"),
            Self::SerializationFailed(e) => write!(f, "postcard serialization failed: {e}"),
            Self::DeserializationFailed(e) => write!(f, "postcard deserialization failed: {e}"),
            Self::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for CacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::SerializationFailed(e) | Self::DeserializationFailed(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for CacheError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

/// Compute a fingerprint of a log and the options it is parsed with.
///
/// The fingerprint includes the schema version so the cache is invalidated
/// when the format changes.
///
/// # Errors
///
/// Returns an error if the options cannot be encoded.
pub fn compute_fingerprint(source: &[u8], options: &ParseOptions) -> Result<[u8; 32], CacheError> {
    let encoded = postcard::to_allocvec(options).map_err(CacheError::SerializationFailed)?;

    let mut hasher = Sha256::new();
    hasher.update(SCHEMA_VERSION.to_le_bytes());
    hasher.update(&encoded);
    hasher.update(source);

    Ok(hasher.finalize().into())
}

/// Serialize a stream to cache bytes.
///
/// # Errors
///
/// Returns an error if postcard cannot encode the stream.
pub fn serialize_stream(
    stream: &PoseStream,
    fingerprint: Option<[u8; 32]>,
) -> Result<Vec<u8>, CacheError> {
    let payload = postcard::to_allocvec(stream).map_err(CacheError::SerializationFailed)?;

    let mut bytes = Vec::with_capacity(HEADER_LEN_FINGERPRINT + payload.len());
    bytes.extend_from_slice(&MAGIC);
    bytes.extend_from_slice(&SCHEMA_VERSION.to_le_bytes());

    if let Some(fp) = fingerprint {
        bytes.push(1);
        bytes.extend_from_slice(&fp);
    } else {
        bytes.push(0);
    }

    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

/// Deserialize a stream from cache bytes.
///
/// If `expected_fingerprint` is `Some`, the stored fingerprint must match.
///
/// # Errors
///
/// Returns an error if:
/// - Magic bytes don't match
/// - Schema version doesn't match
/// - Fingerprint doesn't match (when verification requested)
/// - Postcard deserialization fails
pub fn deserialize_stream(
    bytes: &[u8],
    expected_fingerprint: Option<&[u8; 32]>,
) -> Result<PoseStream, CacheError> {
    let stored = get_fingerprint(bytes)?;

    let payload_start = match (stored, expected_fingerprint) {
        (Some(stored), Some(expected)) if stored != *expected => {
            return Err(CacheError::FingerprintMismatch);
        }
        (None, Some(_)) => return Err(CacheError::FingerprintMismatch),
        (Some(_), _) => HEADER_LEN_FINGERPRINT,
        (None, None) => HEADER_LEN,
    };

    postcard::from_bytes(&bytes[payload_start..]).map_err(CacheError::DeserializationFailed)
}

/// Get the fingerprint from cache bytes without deserializing the payload.
///
/// Returns `None` if the cache has no embedded fingerprint.
///
/// # Errors
///
/// Returns an error if the header is invalid.
pub fn get_fingerprint(bytes: &[u8]) -> Result<Option<[u8; 32]>, CacheError> {
    if bytes.len() < HEADER_LEN {
        return Err(CacheError::TruncatedHeader);
    }

    if bytes[0..4] != MAGIC {
        return Err(CacheError::InvalidMagic);
    }

    let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    if version != SCHEMA_VERSION {
        return Err(CacheError::VersionMismatch {
            expected: SCHEMA_VERSION,
            found: version,
        });
    }

    if bytes[8] == 0 {
        return Ok(None);
    }
    let fp = bytes
        .get(HEADER_LEN..HEADER_LEN_FINGERPRINT)
        .ok_or(CacheError::TruncatedHeader)?;
    let mut out = [0u8; 32];
    out.copy_from_slice(fp);
    Ok(Some(out))
}

// === File-based convenience API ===

/// Save a stream to a cache file.
///
/// # Errors
///
/// Returns an error if the stream cannot be encoded or the file cannot be
/// written.
pub fn save_cache<P: AsRef<Path>>(
    stream: &PoseStream,
    path: P,
    fingerprint: Option<[u8; 32]>,
) -> Result<(), CacheError> {
    let bytes = serialize_stream(stream, fingerprint)?;
    fs::write(path, bytes)?;
    Ok(())
}

/// Load a stream from a cache file without fingerprint verification.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the cache is invalid.
pub fn load_cache<P: AsRef<Path>>(path: P) -> Result<PoseStream, CacheError> {
    let bytes = fs::read(path)?;
    deserialize_stream(&bytes, None)
}

/// Load a stream from a cache file with fingerprint verification.
///
/// # Errors
///
/// Returns an error if the file cannot be read, the cache is invalid,
/// or the fingerprint doesn't match.
pub fn load_cache_verified<P: AsRef<Path>>(
    path: P,
    expected_fingerprint: &[u8; 32],
) -> Result<PoseStream, CacheError> {
    let bytes = fs::read(path)?;
    deserialize_stream(&bytes, Some(expected_fingerprint))
}

/// Check if a cache file exists and has a matching fingerprint.
pub fn is_cache_valid<P: AsRef<Path>>(path: P, expected_fingerprint: &[u8; 32]) -> bool {
    let Ok(bytes) = fs::read(path) else {
        return false;
    };

    match get_fingerprint(&bytes) {
        Ok(Some(fp)) => fp == *expected_fingerprint,
        _ => false,
    }
}

/// Load a log through its cache.
///
/// Fingerprints the log text and `options`. A cache with a matching
/// fingerprint is returned as is; otherwise the log is parsed, with trace
/// events sent to the `log` facade, and the cache rewritten.
///
/// # Errors
///
/// Returns an error if the log cannot be read or parsed, or the cache
/// cannot be written.
pub fn load_stream_cached<P: AsRef<Path>, Q: AsRef<Path>>(
    log_path: P,
    cache_path: Q,
    options: &ParseOptions,
) -> Result<PoseStream, LoadError> {
    let text = read_log(log_path)?;
    let fingerprint = compute_fingerprint(text.as_bytes(), options)?;

    let cache_path = cache_path.as_ref();
    match load_cache_verified(cache_path, &fingerprint) {
        Ok(stream) => {
            log::debug!("cache hit: {}", cache_path.display());
            return Ok(stream);
        }
        Err(e) => log::debug!("cache miss: {}: {e}", cache_path.display()),
    }

    let stream = parse_log_traced(&text, options, &mut LogTracer)?;
    save_cache(&stream, cache_path, Some(fingerprint))?;
    Ok(stream)
}
