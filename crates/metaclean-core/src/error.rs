//! Error types for the metaclean pipeline.
//!
//! Only setup problems (configuration, an unresolvable root directory, a
//! broken index file) surface as `Err`. Per-file problems never abort a batch:
//! they are carried inside [`ProcessingOutcome::Failure`](crate::ProcessingOutcome)
//! as a [`ProcessError`].

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for metaclean operations.
#[derive(Error, Debug)]
pub enum MetacleanError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Index file could not be parsed
    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    /// The root directory of a batch does not exist or cannot be resolved
    #[error("Root directory not found: {path}")]
    RootNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A row of the consolidated location table could not be parsed
    #[error("Malformed location table row on line {line}")]
    MalformedLocationRow { line: usize },

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Errors raised while parsing a serialized [`FileIndex`](crate::FileIndex).
#[derive(Error, Debug, PartialEq, Eq)]
pub enum IndexError {
    /// A non-blank line that is not `<path>\t<fingerprint>`
    #[error("Malformed index record on line {line}: expected `<path>\\t<fingerprint>`")]
    MalformedRecord { line: usize },
}

/// Underlying cause of a per-file failure.
#[derive(Error, Debug)]
pub enum ProcessError {
    /// The file could not be read (permissions, vanished, I/O error)
    #[error("Failed to read file: {0}")]
    Read(#[from] std::io::Error),

    /// The stripper rejected the image
    #[error(transparent)]
    Strip(#[from] StripError),
}

/// Errors raised by a [`MetadataStripper`](crate::pipeline::MetadataStripper).
#[derive(Error, Debug)]
pub enum StripError {
    /// Content is not in a format the stripper can re-encode
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// The image data is corrupt or truncated
    #[error("Decode error: {0}")]
    Decode(#[source] image::ImageError),

    /// Re-encoding the pixel data failed
    #[error("Encode error: {0}")]
    Encode(#[source] image::ImageError),

    /// The stripping task did not run to completion
    #[error("Stripping aborted: {0}")]
    Aborted(String),
}

/// Convenience type alias for metaclean results.
pub type Result<T> = std::result::Result<T, MetacleanError>;
