//! Batch orchestration: reconcile a directory snapshot against the prior index.
//!
//! Each candidate file walks a small state machine:
//!
//! ```text
//! Unseen → read ─┬─ ReadFailed                      (Failure, dropped from index)
//!                └─ verify ─┬─ Unchanged            (carried over, no outcome)
//!                           └─ extract + strip ─┬─ StripFailed (Failure, dropped)
//!                                               └─ Stripped    (Success, re-indexed)
//! ```
//!
//! Nothing here writes to disk. The caller decides what to persist, which
//! makes a dry run nothing more than discarding the [`BatchOutput`].

use futures_util::stream::{FuturesUnordered, StreamExt};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::{MetacleanError, Result, StripError};
use crate::index::{normalize_path, FileIndex};
use crate::types::{BatchSummary, FailureReason, Fingerprint, ProcessingOutcome};

use super::discovery::FileDiscovery;
use super::hash::ContentHasher;
use super::location::{ExifLocationExtractor, LocationExtractor};
use super::strip::{ImageStripper, MetadataStripper};

/// Everything a batch run produced.
#[derive(Debug, Default)]
pub struct BatchOutput {
    /// One outcome per file that was actually processed, in completion order
    pub outcomes: Vec<ProcessingOutcome>,

    /// Index built from scratch: carried-over entries plus successes
    pub index: FileIndex,

    /// Number of files carried over unchanged
    pub unchanged: usize,

    /// Candidates never started because the run was cancelled
    pub unvisited: Vec<PathBuf>,
}

impl BatchOutput {
    pub fn was_cancelled(&self) -> bool {
        !self.unvisited.is_empty()
    }

    pub fn summary(&self) -> BatchSummary {
        BatchSummary::from_outcomes(&self.outcomes, self.unchanged)
    }

    /// Copy prior entries for unvisited files into the new index.
    ///
    /// Lets a caller persist a cancelled run without forgetting files it
    /// never got to; they are re-verified on the next run as usual.
    pub fn carry_forward(&mut self, prior: &FileIndex) {
        for path in &self.unvisited {
            if let Some(fingerprint) = prior.lookup(path) {
                self.index.update(path, fingerprint.clone());
            }
        }
    }

    fn record(&mut self, visit: Visit) {
        match visit {
            Visit::Unchanged { path, fingerprint } => {
                self.index.update(&path, fingerprint);
                self.unchanged += 1;
            }
            Visit::Processed(outcome) => {
                if let ProcessingOutcome::Success {
                    path, fingerprint, ..
                } = &outcome
                {
                    self.index.update(path, fingerprint.clone());
                }
                self.outcomes.push(outcome);
            }
        }
    }
}

/// Terminal state of one file.
enum Visit {
    Unchanged {
        path: PathBuf,
        fingerprint: Fingerprint,
    },
    Processed(ProcessingOutcome),
}

/// Runs the incremental pipeline over a directory tree.
pub struct BatchProcessor {
    stripper: Arc<dyn MetadataStripper>,
    extractor: Arc<dyn LocationExtractor>,
    parallel_workers: usize,
}

impl BatchProcessor {
    /// Create a processor with the default `image`/EXIF collaborators.
    pub fn new(config: &Config) -> Self {
        Self::with_collaborators(
            Arc::new(ImageStripper::new(config.stripping.clone())),
            Arc::new(ExifLocationExtractor),
            config.processing.parallel_workers,
        )
    }

    /// Create a processor with custom collaborators.
    pub fn with_collaborators(
        stripper: Arc<dyn MetadataStripper>,
        extractor: Arc<dyn LocationExtractor>,
        parallel_workers: usize,
    ) -> Self {
        Self {
            stripper,
            extractor,
            parallel_workers: parallel_workers.max(1),
        }
    }

    /// Process every candidate image under `root` against `prior`.
    ///
    /// Fails only if `root` is not an existing directory; per-file problems
    /// are reported as [`ProcessingOutcome::Failure`].
    pub async fn run(&self, root: &Path, prior: &FileIndex) -> Result<BatchOutput> {
        self.run_until_cancelled(root, prior, &CancellationToken::new())
            .await
    }

    /// Like [`run`](Self::run), stopping early once `cancel` fires.
    ///
    /// The token is checked before each file starts. Files already in flight
    /// complete, so the returned index only ever holds finished entries.
    pub async fn run_until_cancelled(
        &self,
        root: &Path,
        prior: &FileIndex,
        cancel: &CancellationToken,
    ) -> Result<BatchOutput> {
        let root = resolve_root(root).await?;
        let files = FileDiscovery::discover(&root);
        tracing::debug!("Discovered {} candidate image(s) in {:?}", files.len(), root);

        Ok(self.process_files(files, prior, cancel).await)
    }

    /// Process an explicit list of candidate files.
    ///
    /// Paths are normalized first, so duplicate spellings of the same file are
    /// visited once and outcomes carry the same path as the index key.
    pub async fn process_files(
        &self,
        files: Vec<PathBuf>,
        prior: &FileIndex,
        cancel: &CancellationToken,
    ) -> BatchOutput {
        let mut seen = HashSet::new();
        let files: Vec<PathBuf> = files
            .iter()
            .map(|path| normalize_path(path))
            .filter(|path| seen.insert(path.clone()))
            .collect();

        let start = std::time::Instant::now();
        let mut output = BatchOutput::default();
        let mut pending = files.into_iter();
        let mut in_flight = FuturesUnordered::new();

        loop {
            while in_flight.len() < self.parallel_workers && !cancel.is_cancelled() {
                match pending.next() {
                    Some(path) => in_flight.push(self.visit(path, prior)),
                    None => break,
                }
            }

            // Single consumer: the index and outcome list have one writer
            match in_flight.next().await {
                Some(visit) => output.record(visit),
                None => break,
            }
        }

        output.unvisited = pending.collect();
        tracing::debug!(
            "Batch finished in {:?}: {} processed, {} unchanged, {} unvisited",
            start.elapsed(),
            output.outcomes.len(),
            output.unchanged,
            output.unvisited.len()
        );
        output
    }

    async fn visit(&self, path: PathBuf, prior: &FileIndex) -> Visit {
        let data = match tokio::fs::read(&path).await {
            Ok(data) => data,
            Err(e) => {
                return Visit::Processed(ProcessingOutcome::Failure {
                    path,
                    reason: FailureReason::ReadError,
                    error: Some(e.into()),
                })
            }
        };

        if prior.verify(&path, &data) {
            if let Some(fingerprint) = prior.lookup(&path) {
                tracing::trace!("Unchanged: {:?}", path);
                return Visit::Unchanged {
                    path,
                    fingerprint: fingerprint.clone(),
                };
            }
        }

        let stripper = Arc::clone(&self.stripper);
        let extractor = Arc::clone(&self.extractor);
        let start = std::time::Instant::now();

        // Decoding and re-encoding are CPU-bound
        let result = tokio::task::spawn_blocking(move || {
            let location = extractor.extract(&data);
            let stripped = stripper.strip(&data).map(|stripped| {
                let fingerprint = ContentHasher::fingerprint(&stripped);
                (stripped, fingerprint)
            });
            (location, stripped)
        })
        .await;
        tracing::trace!("  Extract + strip {:?}: {:?}", path, start.elapsed());

        let outcome = match result {
            Ok((location, Ok((stripped, fingerprint)))) => ProcessingOutcome::Success {
                path,
                stripped,
                location,
                fingerprint,
            },
            Ok((_, Err(e))) => ProcessingOutcome::Failure {
                path,
                reason: FailureReason::MetadataRemovalFailed,
                error: Some(e.into()),
            },
            Err(e) => ProcessingOutcome::Failure {
                path,
                reason: FailureReason::MetadataRemovalFailed,
                error: Some(StripError::Aborted(e.to_string()).into()),
            },
        };
        Visit::Processed(outcome)
    }
}

/// Canonicalize `root` and make sure it is a directory.
async fn resolve_root(root: &Path) -> Result<PathBuf> {
    let not_found = |source: std::io::Error| MetacleanError::RootNotFound {
        path: root.to_path_buf(),
        source,
    };

    let canonical = tokio::fs::canonicalize(root).await.map_err(not_found)?;
    let metadata = tokio::fs::metadata(&canonical).await.map_err(not_found)?;
    if !metadata.is_dir() {
        return Err(not_found(std::io::Error::other("not a directory")));
    }
    Ok(canonical)
}
