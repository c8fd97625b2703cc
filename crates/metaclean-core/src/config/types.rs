//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};

/// Batch processing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Number of files processed concurrently
    pub parallel_workers: usize,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            parallel_workers: 4,
        }
    }
}

/// Index file settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Name of the index file inside the root directory
    pub file_name: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            file_name: ".imc".to_string(),
        }
    }
}

/// Metadata stripping settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StrippingConfig {
    /// Quality used when re-encoding JPEG images (1-100)
    pub jpeg_quality: u8,
}

impl Default for StrippingConfig {
    fn default() -> Self {
        Self { jpeg_quality: 90 }
    }
}

/// Where extracted locations are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SidecarFormat {
    /// One `<image>.json` file next to each located image
    Json,
    /// A single tab-separated table in the root directory
    Table,
}

/// Location persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    /// Sidecar layout: "json" or "table"
    pub sidecar: SidecarFormat,

    /// File name of the consolidated table (used with `sidecar = "table"`)
    pub table_file_name: String,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            sidecar: SidecarFormat::Json,
            table_file_name: "locations.txt".to_string(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
