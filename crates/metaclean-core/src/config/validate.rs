//! Configuration validation with range checks.

use std::path::{Component, Path};

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.processing.parallel_workers == 0 {
            return Err(ConfigError::ValidationError(
                "processing.parallel_workers must be > 0".into(),
            ));
        }
        if !(1..=100).contains(&self.stripping.jpeg_quality) {
            return Err(ConfigError::ValidationError(
                "stripping.jpeg_quality must be between 1 and 100".into(),
            ));
        }
        if !is_plain_file_name(&self.index.file_name) {
            return Err(ConfigError::ValidationError(
                "index.file_name must be a plain file name".into(),
            ));
        }
        if !is_plain_file_name(&self.location.table_file_name) {
            return Err(ConfigError::ValidationError(
                "location.table_file_name must be a plain file name".into(),
            ));
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::ValidationError(
                "logging.format must be \"pretty\" or \"json\"".into(),
            ));
        }
        Ok(())
    }
}

/// A single normal path component: no separators, no `.`/`..`, not empty.
fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
