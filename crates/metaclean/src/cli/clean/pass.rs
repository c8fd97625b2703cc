//! One load → clean → persist cycle over the root.

use metaclean_core::{BatchProcessor, BatchSummary, FileIndex, IndexStore, OutcomeWriter};
use tokio_util::sync::CancellationToken;

use super::report::print_report;
use super::PassOptions;

/// Clean the tree once and, unless this is a dry run, write the results back.
///
/// An unreadable index is treated as empty: every file gets re-verified,
/// which costs time but never skips a dirty image.
pub(crate) async fn run_pass(
    processor: &BatchProcessor,
    options: &PassOptions<'_>,
    cancel: &CancellationToken,
) -> anyhow::Result<BatchSummary> {
    let store = IndexStore::new(options.root, &options.config.index);
    let prior = match store.load() {
        Ok(index) => index,
        Err(e) => {
            tracing::warn!("Ignoring unreadable index {:?}: {e}", store.path());
            FileIndex::new()
        }
    };
    tracing::debug!("Loaded {} index entries from {:?}", prior.len(), store.path());

    let mut output = processor
        .run_until_cancelled(options.root, &prior, cancel)
        .await?;

    if output.was_cancelled() {
        tracing::warn!(
            "Run cancelled with {} files not yet visited",
            output.unvisited.len()
        );
        output.carry_forward(&prior);
    }

    if !options.dry_run {
        let written = OutcomeWriter::new(options.root, &options.config.location)
            .write(&output.outcomes);
        for failure in &written.failures {
            tracing::warn!("Failed to write {:?}: {}", failure.path, failure.error);
        }
        if !written.unwritten.is_empty() {
            tracing::warn!(
                "{} images left untouched, retrying them next run",
                written.unwritten.len()
            );
            written.forget_unwritten(&mut output.index);
        }
        tracing::debug!(
            "Wrote {} images and {} locations",
            written.images_written,
            written.locations_written
        );

        store.save(&output.index)?;
        tracing::debug!("Saved {} index entries", output.index.len());
    }

    print_report(&output);
    Ok(output.summary())
}
