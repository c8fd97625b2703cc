//! End-to-end runs with the real stripper, extractor and persistence.

use image::{DynamicImage, ImageFormat, RgbImage};
use metaclean_core::{
    BatchProcessor, Config, ContentHasher, FailureReason, FileIndex, Fingerprint, IndexStore,
    OutcomeWriter, ProcessingOutcome,
};
use std::io::Cursor;
use std::path::{Path, PathBuf};

fn encoded(format: ImageFormat, seed: u8) -> Vec<u8> {
    let img = RgbImage::from_fn(12, 9, |x, y| {
        image::Rgb([seed.wrapping_add(x as u8 * 9), (y * 20) as u8, seed])
    });
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, format)
        .unwrap();
    buf.into_inner()
}

/// Root with four valid images in nested folders and some non-candidates.
fn photo_tree() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let root = std::fs::canonicalize(dir.path()).unwrap();
    std::fs::create_dir_all(root.join("2024/summer")).unwrap();

    std::fs::write(root.join("1.jpg"), encoded(ImageFormat::Jpeg, 1)).unwrap();
    std::fs::write(root.join("2.png"), encoded(ImageFormat::Png, 2)).unwrap();
    std::fs::write(root.join("2024/3.tiff"), encoded(ImageFormat::Tiff, 3)).unwrap();
    std::fs::write(root.join("2024/summer/4.webp"), encoded(ImageFormat::WebP, 4)).unwrap();
    std::fs::write(root.join("2024/readme.md"), b"# trip").unwrap();
    (dir, root)
}

/// What the CLI does after a run, minus reporting.
fn persist(root: &Path, config: &Config, outcomes: &[ProcessingOutcome], index: &FileIndex) {
    let report = OutcomeWriter::new(root, &config.location).write(outcomes);
    assert!(report.failures.is_empty(), "{:?}", report.failures);
    IndexStore::new(root, &config.index).save(index).unwrap();
}

#[tokio::test]
async fn first_run_processes_every_image() {
    let (_dir, root) = photo_tree();
    let config = Config::default();

    let output = BatchProcessor::new(&config)
        .run(&root, &FileIndex::new())
        .await
        .unwrap();

    assert_eq!(output.outcomes.len(), 4);
    assert!(output.outcomes.iter().all(|o| o.is_success()));
    assert_eq!(output.index.len(), 4);
    assert_eq!(output.summary().to_string(), "Files: 4 Success: 4 Failure: 0");
}

#[tokio::test]
async fn persisted_run_is_idempotent() {
    let (_dir, root) = photo_tree();
    let config = Config::default();
    let processor = BatchProcessor::new(&config);
    let store = IndexStore::new(&root, &config.index);

    let first = processor.run(&root, &store.load().unwrap()).await.unwrap();
    persist(&root, &config, &first.outcomes, &first.index);

    let second = processor.run(&root, &store.load().unwrap()).await.unwrap();
    assert!(second.outcomes.is_empty());
    assert_eq!(second.unchanged, 4);
    assert_eq!(second.index, first.index);

    // The index file itself is never a candidate
    assert!(!second.index.contains(store.path()));
}

#[tokio::test]
async fn stale_entry_is_reprocessed_and_current_entry_is_kept() {
    let (_dir, root) = photo_tree();
    let config = Config::default();
    let a = root.join("1.jpg");
    let b = root.join("2.png");
    let b_fingerprint = ContentHasher::fingerprint(&std::fs::read(&b).unwrap());

    let mut prior = FileIndex::new();
    prior.update(&a, Fingerprint::new("None"));
    prior.update(&b, b_fingerprint.clone());

    let output = BatchProcessor::new(&config).run(&root, &prior).await.unwrap();

    assert_eq!(output.outcomes.len(), 3);
    assert_eq!(output.index.len(), 4);
    assert_eq!(output.index.lookup(&b), Some(&b_fingerprint));
    assert_ne!(output.index.lookup(&a), Some(&Fingerprint::new("None")));
}

#[tokio::test]
async fn undecodable_candidate_fails_and_stays_out_of_the_index() {
    let (_dir, root) = photo_tree();
    let bogus = root.join("2024/broken.heic");
    std::fs::write(&bogus, b"\x00\x00\x00\x18ftypheic not really").unwrap();

    let output = BatchProcessor::new(&Config::default())
        .run(&root, &FileIndex::new())
        .await
        .unwrap();

    let failures: Vec<_> = output
        .outcomes
        .iter()
        .filter(|o| !o.is_success())
        .collect();
    assert_eq!(failures.len(), 1);
    match failures[0] {
        ProcessingOutcome::Failure {
            path,
            reason,
            error,
        } => {
            assert_eq!(path, &bogus);
            assert_eq!(*reason, FailureReason::MetadataRemovalFailed);
            assert!(error.is_some());
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(output.index.len(), 4);
    assert!(!output.index.contains(&bogus));
}

#[tokio::test]
async fn modified_file_is_picked_up_on_the_next_run() {
    let (_dir, root) = photo_tree();
    let config = Config::default();
    let processor = BatchProcessor::new(&config);

    let first = processor.run(&root, &FileIndex::new()).await.unwrap();
    persist(&root, &config, &first.outcomes, &first.index);

    let replaced = root.join("2.png");
    std::fs::write(&replaced, encoded(ImageFormat::Png, 200)).unwrap();

    let second = processor.run(&root, &first.index).await.unwrap();
    assert_eq!(second.outcomes.len(), 1);
    assert_eq!(second.outcomes[0].path(), replaced);
    assert_eq!(second.unchanged, 3);
}
