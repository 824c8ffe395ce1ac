//! Dataset check tests
//!
//! Runs the checker over datasets written to disk and listed the same way
//! the CLI lists them.

mod common;

use common::{Dataset, METADATA_KEY};
use seqforge::check::{self, CheckOptions, IntegrityContext, Integrity, MetadataValidator, Validator};
use seqforge::listing::{self, InputDirType};
use seqforge::Result;
use seqforge_av::CancelToken;
use seqforge_common::{ArtifactKind, RunList};
use std::path::Path;

fn options(images: u32, frames: u32) -> CheckOptions {
    CheckOptions {
        images,
        frames,
        progress_every: 2,
        report_out_of_range: true,
    }
}

fn run_check(ds: &Dataset, images: u32, frames: u32) -> check::CheckReport {
    let files = listing::list_files_recursive(ds.path(), &CancelToken::new()).unwrap();
    check::check_files(
        &files,
        ds.path(),
        &options(images, frames),
        None,
        &CancelToken::new(),
    )
    .unwrap()
}

/// Accepts any file that is not empty.
struct NonEmpty;

impl Validator for NonEmpty {
    fn label(&self) -> &'static str {
        "image"
    }

    fn validate(&self, path: &Path, _cancel: &CancelToken) -> Result<bool> {
        Ok(std::fs::metadata(path)?.len() > 0)
    }
}

fn runs(s: &str) -> RunList {
    s.parse().unwrap()
}

#[test]
fn test_dataset_layout_is_detected() {
    let ds = Dataset::new();
    assert_eq!(listing::input_dir_type(ds.path()), InputDirType::Extraction);
    assert_eq!(
        listing::input_dir_type(&ds.path().join("nope")),
        InputDirType::Nonexistent
    );
    assert_eq!(
        listing::input_dir_type(&ds.path().join("images")),
        InputDirType::Tars
    );
}

#[test]
fn test_complete_dataset_is_clean() {
    let ds = Dataset::new();
    ds.complete(1..=6, 3);

    let report = run_check(&ds, 6, 3);

    assert!(report.is_clean());
    assert_eq!(report.total_files, 6 + 6 + 18);
    for kind in [ArtifactKind::Image, ArtifactKind::Metadata, ArtifactKind::Frame] {
        let coverage = report.coverage(kind).unwrap();
        assert!(coverage.complete, "{kind} should be complete");
        assert_eq!(coverage.runs, runs("1-6"));
        assert!(coverage.missing.is_empty());
    }
    let rendered = report.render(100);
    assert!(rendered.contains("   images COMPLETE\n"));
    assert!(rendered.contains("   metadata MATCHES images\n"));
    assert!(rendered.contains("   complete anims MATCH images\n"));
}

#[test]
fn test_gaps_in_every_kind() {
    let ds = Dataset::new();
    ds.complete(1..=10, 4);
    ds.remove("images/0004.png")
        .remove("metadata/0009.json")
        .remove("frames/0002/0002_0003.png");

    let report = run_check(&ds, 10, 4);
    assert!(!report.is_clean());

    let images = report.coverage(ArtifactKind::Image).unwrap();
    assert_eq!(images.missing, runs("4"));
    assert_eq!(images.runs, runs("1-3, 5-10"));

    let meta = report.coverage(ArtifactKind::Metadata).unwrap();
    assert_eq!(meta.missing, runs("9"));
    assert_eq!(meta.matches_images, Some(false));

    let frames = report.coverage(ArtifactKind::Frame).unwrap();
    assert_eq!(frames.missing, runs("2"));
    assert_eq!(frames.runs, runs("1, 3-10"));
    let anims = frames.anims.unwrap();
    assert_eq!((anims.complete, anims.incomplete), (9, 1));
    assert_eq!(frames.matches_images, Some(false));

    let rendered = report.render(100);
    assert!(rendered.contains("   1 missing in 1 runs: 4\n"));
    assert!(rendered.contains("   9 complete anims, 1 incomplete\n"));
    assert!(rendered.contains("   complete anims DON'T match images\n"));
}

#[test]
fn test_out_of_range_items_are_reported() {
    let ds = Dataset::new();
    ds.complete(1..=3, 2);
    ds.image(5).metadata(5).frames(5, 2);

    let report = run_check(&ds, 3, 2);

    for kind in [ArtifactKind::Image, ArtifactKind::Metadata, ArtifactKind::Frame] {
        let coverage = report.coverage(kind).unwrap();
        assert!(coverage.missing.is_empty(), "{kind} has no gaps");
        assert_eq!(coverage.out_of_range, runs("5"), "{kind} beyond range");
    }
}

#[test]
fn test_missing_kind_is_reported_empty() {
    let ds = Dataset::new();
    for n in 1..=3 {
        ds.image(n).frames(n, 2);
    }

    let report = run_check(&ds, 3, 2);

    assert!(report.coverage(ArtifactKind::Metadata).is_none());
    assert!(!report.is_clean());
    assert!(report.render(100).contains("   NO metadata\n"));
}

#[test]
fn test_integrity_scan_reports_every_corrupt_item() {
    let ds = Dataset::new();
    ds.complete(1..=4, 2);
    ds.bad_metadata(2).bad_metadata(3);
    std::fs::write(ds.path().join("images/0001.png"), b"").unwrap();
    std::fs::write(ds.path().join("frames/0004/0004_0001.png"), b"").unwrap();

    let files = listing::list_files_recursive(ds.path(), &CancelToken::new()).unwrap();
    let validation = IntegrityContext {
        root: ds.path().to_path_buf(),
        images: Box::new(NonEmpty),
        metadata: Box::new(MetadataValidator::new(METADATA_KEY)),
    };
    let report = check::check_files(
        &files,
        ds.path(),
        &options(4, 2),
        Some(&validation),
        &CancelToken::new(),
    )
    .unwrap();

    // Coverage is unaffected by integrity failures.
    assert!(report.coverage(ArtifactKind::Image).unwrap().complete);
    assert!(!report.is_clean());

    match &report.coverage(ArtifactKind::Image).unwrap().integrity {
        Some(Integrity::Files(r)) => {
            assert_eq!(r.checked, 4);
            assert_eq!(r.corrupt, [ds.path().join("images/0001.png")]);
        }
        other => panic!("unexpected image integrity: {other:?}"),
    }
    match &report.coverage(ArtifactKind::Metadata).unwrap().integrity {
        Some(Integrity::Files(r)) => assert_eq!(r.corrupt.len(), 2),
        other => panic!("unexpected metadata integrity: {other:?}"),
    }
    match &report.coverage(ArtifactKind::Frame).unwrap().integrity {
        Some(Integrity::Frames(r)) => {
            assert_eq!(r.corrupt.len(), 1);
            assert_eq!(r.corrupt[0].get(), 4);
        }
        other => panic!("unexpected frame integrity: {other:?}"),
    }

    let rendered = report.render(100);
    assert!(rendered.contains("   metadata integrity NOT verified\n"));
    assert!(rendered.contains("   1 animations with error(s):\n"));
}

#[test]
fn test_cancelled_integrity_scan_aborts() {
    let ds = Dataset::new();
    ds.complete(1..=3, 2);

    let files = listing::list_files_recursive(ds.path(), &CancelToken::new()).unwrap();
    let validation = IntegrityContext {
        root: ds.path().to_path_buf(),
        images: Box::new(NonEmpty),
        metadata: Box::new(MetadataValidator::new(METADATA_KEY)),
    };
    let cancel = CancelToken::new();
    cancel.cancel();

    let err = check::check_files(&files, ds.path(), &options(3, 2), Some(&validation), &cancel)
        .unwrap_err();
    assert!(err.is_cancelled());
}

#[test]
fn test_json_report_shape() {
    let ds = Dataset::new();
    ds.complete(1..=5, 2);
    ds.remove("images/0003.png");

    let report = run_check(&ds, 5, 2);
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["total_files"], 4 + 5 + 10);
    let kinds = json["kinds"].as_array().unwrap();
    assert_eq!(kinds.len(), 3);
    assert_eq!(kinds[0]["status"], "checked");
    assert_eq!(kinds[0]["missing"], serde_json::json!([3]));
}
