//! metaclean core - incremental image metadata removal.
//!
//! Walks a directory tree, strips embedded metadata from every image, keeps
//! the GPS position when there is one, and remembers what it has already
//! cleaned so the next run only touches files that changed.
//!
//! # Architecture
//!
//! ```text
//! root/ → discover → read → verify against index ─┬─ unchanged: carry entry over
//!                                                 └─ changed: extract GPS → strip → re-index
//! ```
//!
//! [`BatchProcessor::run`] is side-effect free: it returns the outcomes and
//! a freshly built [`FileIndex`]. Writing stripped images, location sidecars
//! and the index file back is done by the caller through [`store`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use metaclean_core::{BatchProcessor, Config, IndexStore, OutcomeWriter};
//!
//! #[tokio::main]
//! async fn main() -> metaclean_core::Result<()> {
//!     let config = Config::load()?;
//!     let root = std::path::Path::new("./photos");
//!
//!     let store = IndexStore::new(root, &config.index);
//!     let prior = store.load()?;
//!     let output = BatchProcessor::new(&config).run(root, &prior).await?;
//!
//!     OutcomeWriter::new(root, &config.location).write(&output.outcomes);
//!     store.save(&output.index)?;
//!     println!("{}", output.summary());
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod index;
pub mod pipeline;
pub mod store;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;

// Re-exports for convenient access
pub use config::Config;
pub use error::{ConfigError, IndexError, MetacleanError, ProcessError, Result, StripError};
pub use index::FileIndex;
pub use pipeline::{BatchOutput, BatchProcessor, ContentHasher, ImageClassifier};
pub use store::{IndexStore, OutcomeWriter, WriteReport};
pub use types::{BatchSummary, Coordinate, FailureReason, Fingerprint, ProcessingOutcome};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
