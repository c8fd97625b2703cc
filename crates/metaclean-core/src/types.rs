//! Core data types shared by the pipeline, the index and the caller.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::ProcessError;

/// Tolerance used when comparing two [`Coordinate`]s, in decimal degrees.
pub const COORDINATE_TOLERANCE: f64 = 1e-5;

/// Content fingerprint of a byte buffer (lower-case hex digest).
///
/// Treated as an opaque string: the index stores whatever it is given, so a
/// stale or foreign value simply never matches a freshly computed one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Wrap an existing digest string.
    pub fn new(digest: impl Into<String>) -> Self {
        Self(digest.into())
    }

    /// The digest as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A geographic position in decimal degrees.
///
/// Equality is approximate: two coordinates are equal when both latitude and
/// longitude differ by less than [`COORDINATE_TOLERANCE`], since EXIF
/// rationals do not round-trip exactly through `f64`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude, negative south of the equator
    pub latitude: f64,

    /// Longitude, negative west of Greenwich
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl PartialEq for Coordinate {
    fn eq(&self, other: &Self) -> bool {
        (self.latitude - other.latitude).abs() < COORDINATE_TOLERANCE
            && (self.longitude - other.longitude).abs() < COORDINATE_TOLERANCE
    }
}

/// Short, user-facing reason attached to a failed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// The file could not be read
    ReadError,
    /// The stripper could not decode or re-encode the image
    MetadataRemovalFailed,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadError => f.write_str("read error"),
            Self::MetadataRemovalFailed => f.write_str("metadata removal failed"),
        }
    }
}

/// Result of processing one new or changed file.
///
/// Files detected as unchanged never produce an outcome; they only
/// contribute a carried-over entry to the new index.
#[derive(Debug)]
pub enum ProcessingOutcome {
    /// Metadata was removed; `stripped` is the content to write back.
    Success {
        path: PathBuf,
        stripped: Vec<u8>,
        location: Option<Coordinate>,
        /// Fingerprint of `stripped`, not of the original bytes
        fingerprint: Fingerprint,
    },
    /// The file was left untouched and is absent from the new index.
    Failure {
        path: PathBuf,
        reason: FailureReason,
        error: Option<ProcessError>,
    },
}

impl ProcessingOutcome {
    /// Path of the file this outcome describes.
    pub fn path(&self) -> &Path {
        match self {
            Self::Success { path, .. } | Self::Failure { path, .. } => path,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Extracted location, if this is a success that carried one.
    pub fn location(&self) -> Option<Coordinate> {
        match self {
            Self::Success { location, .. } => *location,
            Self::Failure { .. } => None,
        }
    }
}

/// Counts describing one batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    /// Files that produced an outcome
    pub total: usize,
    /// Outcomes that succeeded
    pub succeeded: usize,
    /// Outcomes that failed
    pub failed: usize,
    /// Files carried over unchanged from the prior index
    pub unchanged: usize,
    /// Successes that carried a location
    pub located: usize,
}

impl BatchSummary {
    /// Tally a list of outcomes plus the number of carried-over files.
    pub fn from_outcomes(outcomes: &[ProcessingOutcome], unchanged: usize) -> Self {
        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
        let located = outcomes.iter().filter(|o| o.location().is_some()).count();
        Self {
            total: outcomes.len(),
            succeeded,
            failed: outcomes.len() - succeeded,
            unchanged,
            located,
        }
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Files: {} Success: {} Failure: {}",
            self.total, self.succeeded, self.failed
        )
    }
}
