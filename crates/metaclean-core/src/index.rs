//! Change-detection index: absolute path → content fingerprint.
//!
//! # Wire format
//!
//! One record per line, `<absolute-path>\t<fingerprint>`, no header. Paths are
//! stored as raw OS bytes. Blank lines are ignored when parsing. Records are written sorted by path so the
//! file diffs cleanly between runs.
//!
//! # Keys
//!
//! Every path goes through [`normalize_path`] before it touches the map, so
//! `photos/./a.jpg`, `photos/x/../a.jpg` and the absolute spelling all land
//! on the same entry.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use crate::error::IndexError;
use crate::pipeline::ContentHasher;
use crate::types::Fingerprint;

const FIELD_SEPARATOR: u8 = b'\t';

/// Mapping from absolute file path to the fingerprint recorded on the last run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileIndex {
    entries: BTreeMap<PathBuf, Fingerprint>,
}

impl FileIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fingerprint recorded for `path`, if it was ever indexed.
    pub fn lookup(&self, path: &Path) -> Option<&Fingerprint> {
        self.entries.get(&normalize_path(path))
    }

    /// Insert or overwrite the fingerprint for `path`.
    pub fn update(&mut self, path: &Path, fingerprint: Fingerprint) {
        self.entries.insert(normalize_path(path), fingerprint);
    }

    /// True iff `path` is indexed with the fingerprint of `data`.
    ///
    /// An unknown path is simply unverified, not an error.
    pub fn verify(&self, path: &Path, data: &[u8]) -> bool {
        self.lookup(path)
            .is_some_and(|recorded| *recorded == ContentHasher::fingerprint(data))
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(&normalize_path(path))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forget `path`, returning the fingerprint it had.
    pub fn remove(&mut self, path: &Path) -> Option<Fingerprint> {
        self.entries.remove(&normalize_path(path))
    }

    /// Render the index in its on-disk form.
    ///
    /// Paths are written as raw OS bytes, so names that are not valid UTF-8
    /// survive a round trip. An empty index renders as no bytes at all.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for (path, fingerprint) in &self.entries {
            out.extend_from_slice(path.as_os_str().as_encoded_bytes());
            out.push(FIELD_SEPARATOR);
            out.extend_from_slice(fingerprint.as_str().as_bytes());
            out.push(b'\n');
        }
        out
    }

    /// Parse the on-disk form.
    ///
    /// An empty fingerprint field is kept as-is; it never verifies, so the
    /// file is simply processed again.
    pub fn deserialize(data: &[u8]) -> Result<Self, IndexError> {
        let mut index = Self::new();
        for (i, line) in data.split(|&b| b == b'\n').enumerate() {
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            let malformed = || IndexError::MalformedRecord { line: i + 1 };

            let split = line.iter().position(|&b| b == FIELD_SEPARATOR);
            let Some((path, fingerprint)) = split.map(|at| (&line[..at], &line[at + 1..])) else {
                return Err(malformed());
            };
            if path.is_empty() || fingerprint.contains(&FIELD_SEPARATOR) {
                return Err(malformed());
            }
            let fingerprint = std::str::from_utf8(fingerprint).map_err(|_| malformed())?;
            let path = path_from_bytes(path).ok_or_else(malformed)?;

            index.update(&path, Fingerprint::new(fingerprint));
        }
        Ok(index)
    }
}

#[cfg(unix)]
fn path_from_bytes(bytes: &[u8]) -> Option<PathBuf> {
    use std::os::unix::ffi::OsStrExt;
    Some(PathBuf::from(std::ffi::OsStr::from_bytes(bytes)))
}

// Elsewhere the OS encoding can't be rebuilt from arbitrary bytes safely,
// so only UTF-8 paths are accepted back.
#[cfg(not(unix))]
fn path_from_bytes(bytes: &[u8]) -> Option<PathBuf> {
    std::str::from_utf8(bytes).ok().map(PathBuf::from)
}

impl FromIterator<(PathBuf, Fingerprint)> for FileIndex {
    fn from_iter<I: IntoIterator<Item = (PathBuf, Fingerprint)>>(iter: I) -> Self {
        let mut index = Self::new();
        for (path, fingerprint) in iter {
            index.update(&path, fingerprint);
        }
        index
    }
}

/// Make `path` absolute and resolve `.` and `..` lexically.
///
/// Symlinks are not resolved here; the batch processor canonicalizes the
/// root directory once so discovered paths are already canonical.
pub fn normalize_path(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}
