//! Incremental processing pipeline.
//!
//! - **discovery**: Find candidate images under a root directory
//! - **hash**: Content fingerprints for change detection
//! - **location**: Extract GPS coordinates from EXIF
//! - **strip**: Remove metadata by re-encoding pixel data
//! - **processor**: Reconcile a directory snapshot against the prior index

pub mod discovery;
pub mod hash;
pub mod location;
pub mod processor;
pub mod strip;

// Re-exports for convenient access
pub use discovery::{FileDiscovery, ImageClassifier, SUPPORTED_EXTENSIONS};
pub use hash::ContentHasher;
pub use location::{ExifLocationExtractor, LocationExtractor};
pub use processor::{BatchOutput, BatchProcessor};
pub use strip::{ImageStripper, MetadataStripper};
