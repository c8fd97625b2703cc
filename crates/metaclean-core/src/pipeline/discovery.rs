//! File discovery for finding candidate images in a directory tree.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions (lower-case, without the dot) of files eligible for processing.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["tiff", "jpeg", "jpg", "png", "webp", "heic"];

/// Decides from a path alone whether a file is a candidate image.
pub struct ImageClassifier;

impl ImageClassifier {
    /// True if the path's extension, lower-cased, is in [`SUPPORTED_EXTENSIONS`].
    ///
    /// Pure function of the path string: no filesystem access, so it cannot
    /// tell a directory named `album.jpg` from a file. [`FileDiscovery`]
    /// filters directories out before asking.
    pub fn is_candidate(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext_lower = ext.to_lowercase();
                SUPPORTED_EXTENSIONS.iter().any(|fmt| *fmt == ext_lower)
            })
            .unwrap_or(false)
    }
}

/// Enumerates candidate images under a root directory.
pub struct FileDiscovery;

impl FileDiscovery {
    /// Recursively find every regular file under `root` that is a candidate.
    ///
    /// Symlinks are not followed and unreadable entries are skipped. Paths
    /// are joined onto `root`, so a canonical root yields canonical paths.
    pub fn discover(root: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| ImageClassifier::is_candidate(path))
            .collect();

        // Sort by path for deterministic ordering
        files.sort();
        files
    }
}
