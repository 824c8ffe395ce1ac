//! Completeness and integrity checks over a dataset listing.
//!
//! Images, metadata and frame groups are checked independently against the
//! expected range, then compared with each other through their run lists.
//! When the listing comes from an extracted tree, every file can also be
//! validated in place.

pub mod completeness;
pub mod frames;
pub mod integrity;
pub mod report;

pub use completeness::{is_complete, missing, runs_match, Membership, ObservedSet};
pub use frames::{partition_frames, scan_frame_completeness, AnimScan, FrameGroups};
pub use integrity::{ImageValidator, IntegrityReport, MetadataValidator, Validator};
pub use report::{CheckReport, Coverage, Integrity, KindReport, KindStatus};

use crate::config::CheckConfig;
use crate::{Error, Result};
use chrono::Utc;
use report::AnimCounts;
use seqforge_av::CancelToken;
use seqforge_common::{ArtifactKind, ExpectedRange, RunList, SequenceNumber};
use std::path::{Path, PathBuf};
use tracing::info;

/// Parameters of one check.
#[derive(Debug, Clone)]
pub struct CheckOptions {
    pub images: u32,
    pub frames: u32,
    pub progress_every: u32,
    pub report_out_of_range: bool,
}

impl From<&CheckConfig> for CheckOptions {
    fn from(config: &CheckConfig) -> Self {
        Self {
            images: config.images,
            frames: config.frames,
            progress_every: config.progress_every,
            report_out_of_range: config.report_out_of_range,
        }
    }
}

/// Validators run over an extracted tree rooted at `root`.
pub struct IntegrityContext {
    pub root: PathBuf,
    pub images: Box<dyn Validator>,
    pub metadata: Box<dyn Validator>,
}

impl IntegrityContext {
    /// `pngcheck` for images and a required-key test for metadata.
    pub fn standard(root: impl Into<PathBuf>, pngcheck: impl Into<PathBuf>, metadata_key: &str) -> Self {
        Self {
            root: root.into(),
            images: Box::new(ImageValidator::new(pngcheck)),
            metadata: Box::new(MetadataValidator::new(metadata_key)),
        }
    }

    fn paths(&self, names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(|name| self.root.join(name)).collect()
    }
}

fn ensure_running(cancel: &CancelToken) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(Error::Cancelled);
    }
    Ok(())
}

/// Check a listing of dataset-relative paths.
///
/// # Errors
///
/// An inconsistent expected range fails before anything is scanned. A frame
/// path with an unparseable sequence token, cancellation, and I/O failures
/// abort; corrupt or unparseable items are only reported.
pub fn check_files(
    files: &[String],
    source: &Path,
    options: &CheckOptions,
    validation: Option<&IntegrityContext>,
    cancel: &CancelToken,
) -> Result<CheckReport> {
    let range = ExpectedRange::one_based(options.images)?;
    let frame_range = ExpectedRange::zero_based(options.frames)?;
    let progress_every = options.progress_every as usize;

    info!("Checking {} files", files.len());

    let select = |kind: ArtifactKind| {
        let prefix = kind.prefix();
        files
            .iter()
            .map(String::as_str)
            .filter(|name| name.starts_with(&prefix))
            .collect::<Vec<_>>()
    };

    let mut kinds = Vec::with_capacity(3);

    // Images
    ensure_running(cancel)?;
    let image_names = select(ArtifactKind::Image);
    let images = ObservedSet::collect(image_names.iter().copied(), ArtifactKind::Image);
    let image_runs = images.runs();
    let image_report = if image_names.is_empty() {
        empty(ArtifactKind::Image)
    } else {
        let mut coverage = coverage(&images, &range, options);
        if let Some(ctx) = validation {
            let report = integrity::scan(
                ctx.images.as_ref(),
                &ctx.paths(&image_names),
                progress_every,
                cancel,
            )?;
            coverage.integrity = Some(Integrity::Files(report));
        }
        checked(ArtifactKind::Image, image_names.len(), coverage)
    };
    kinds.push(image_report);

    // Metadata
    ensure_running(cancel)?;
    let meta_names = select(ArtifactKind::Metadata);
    let meta_report = if meta_names.is_empty() {
        empty(ArtifactKind::Metadata)
    } else {
        let meta = ObservedSet::collect(meta_names.iter().copied(), ArtifactKind::Metadata);
        let mut coverage = coverage(&meta, &range, options);
        coverage.matches_images = Some(runs_match(&coverage.runs, &image_runs));
        if let Some(ctx) = validation {
            let report = integrity::scan(
                ctx.metadata.as_ref(),
                &ctx.paths(&meta_names),
                progress_every,
                cancel,
            )?;
            coverage.integrity = Some(Integrity::Files(report));
        }
        checked(ArtifactKind::Metadata, meta_names.len(), coverage)
    };
    kinds.push(meta_report);

    // Frames
    ensure_running(cancel)?;
    let frame_names = select(ArtifactKind::Frame);
    let frame_report = if frame_names.is_empty() {
        empty(ArtifactKind::Frame)
    } else {
        let groups = partition_frames(frame_names.iter().copied())?;
        let scan = scan_frame_completeness(
            &groups,
            &range,
            &frame_range,
            options.progress_every,
            cancel,
            |p| {
                info!(
                    "found complete anims: {}, incomplete: {}",
                    p.complete, p.incomplete
                )
            },
        )?;

        let out_of_range = if options.report_out_of_range {
            ObservedSet::from_numbers(
                groups
                    .sequences()
                    .map(SequenceNumber::get)
                    .filter(|&n| !range.contains(n)),
            )
            .runs()
        } else {
            RunList::default()
        };

        let mut coverage = Coverage {
            complete: scan.is_complete(),
            matches_images: Some(runs_match(&scan.complete, &image_runs)),
            anims: Some(AnimCounts {
                complete: scan.complete.count(),
                incomplete: scan.incomplete.count(),
            }),
            runs: scan.complete,
            missing: scan.incomplete,
            out_of_range,
            unparseable: Vec::new(),
            integrity: None,
        };
        if let Some(ctx) = validation {
            let report = integrity::scan_frame_groups(
                ctx.images.as_ref(),
                &ctx.root,
                &groups,
                progress_every,
                cancel,
            )?;
            coverage.integrity = Some(Integrity::Frames(report));
        }
        checked(ArtifactKind::Frame, frame_names.len(), coverage)
    };
    kinds.push(frame_report);

    Ok(CheckReport {
        generated_at: Utc::now(),
        source: source.display().to_string(),
        range,
        frames_per_sequence: options.frames,
        total_files: files.len(),
        kinds,
    })
}

fn coverage(observed: &ObservedSet, range: &ExpectedRange, options: &CheckOptions) -> Coverage {
    Coverage {
        complete: is_complete(observed, range),
        runs: observed.runs(),
        missing: missing(observed, range),
        out_of_range: if options.report_out_of_range {
            observed.out_of_range(range)
        } else {
            RunList::default()
        },
        matches_images: None,
        unparseable: observed.unparseable().to_vec(),
        anims: None,
        integrity: None,
    }
}

fn empty(kind: ArtifactKind) -> KindReport {
    KindReport {
        kind,
        count: 0,
        status: KindStatus::Empty,
    }
}

fn checked(kind: ArtifactKind, count: usize, coverage: Coverage) -> KindReport {
    KindReport {
        kind,
        count,
        status: KindStatus::Checked(coverage),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seqforge_common::paths::{frame_path, image_path, metadata_path};

    fn options(images: u32, frames: u32) -> CheckOptions {
        CheckOptions {
            images,
            frames,
            progress_every: 100,
            report_out_of_range: true,
        }
    }

    fn run(files: &[String], opts: &CheckOptions) -> CheckReport {
        check_files(files, Path::new("dataset"), opts, None, &CancelToken::new()).unwrap()
    }

    #[test]
    fn test_images_with_gap() {
        let files: Vec<String> = [1, 2, 3, 5, 6, 7, 8, 9, 10]
            .into_iter()
            .map(|n| image_path(SequenceNumber(n)))
            .collect();
        let report = run(&files, &options(10, 1));

        let images = report.coverage(ArtifactKind::Image).unwrap();
        assert!(!images.complete);
        assert_eq!(images.runs.to_string(), "1-3, 5-10");
        assert_eq!(images.missing.to_string(), "4");

        assert!(matches!(
            report.kind(ArtifactKind::Metadata).unwrap().status,
            KindStatus::Empty
        ));
        assert!(!report.is_clean());
    }

    #[test]
    fn test_complete_dataset_is_clean() {
        let mut files = Vec::new();
        for n in 1..=3 {
            let seq = SequenceNumber(n);
            files.push(image_path(seq));
            files.push(metadata_path(seq));
            files.extend((0..2).map(|f| frame_path(seq, f)));
        }
        let report = run(&files, &options(3, 2));
        assert!(report.is_clean());

        let frames = report.coverage(ArtifactKind::Frame).unwrap();
        assert_eq!(frames.runs.to_string(), "1-3");
        assert_eq!(frames.matches_images, Some(true));
        assert_eq!(
            frames.anims,
            Some(AnimCounts {
                complete: 3,
                incomplete: 0
            })
        );
    }

    #[test]
    fn test_metadata_mismatch() {
        let files = vec![
            image_path(SequenceNumber(1)),
            image_path(SequenceNumber(2)),
            metadata_path(SequenceNumber(1)),
            metadata_path(SequenceNumber(3)),
        ];
        let report = run(&files, &options(2, 1));
        let meta = report.coverage(ArtifactKind::Metadata).unwrap();
        assert_eq!(meta.matches_images, Some(false));
        assert_eq!(meta.out_of_range.to_string(), "3");
        assert_eq!(meta.missing.to_string(), "2");
    }

    #[test]
    fn test_frames_complete_independent_of_metadata() {
        let mut files = vec![image_path(SequenceNumber(1))];
        files.extend((0..3).map(|f| frame_path(SequenceNumber(1), f)));
        let report = run(&files, &options(1, 3));

        assert!(matches!(
            report.kind(ArtifactKind::Metadata).unwrap().status,
            KindStatus::Empty
        ));
        assert!(report.coverage(ArtifactKind::Frame).unwrap().complete);
    }

    #[test]
    fn test_range_error_before_scanning() {
        let files = vec!["frames/bad/bad_0000.png".to_string()];
        let err = check_files(
            &files,
            Path::new("dataset"),
            &options(0, 300),
            None,
            &CancelToken::new(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Range { .. }));
    }

    #[test]
    fn test_bad_frame_token_is_fatal() {
        let files = vec!["frames/00x1/00x1_0000.png".to_string()];
        let err = check_files(
            &files,
            Path::new("dataset"),
            &options(1, 1),
            None,
            &CancelToken::new(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn test_cancelled_check_without_frames_stops() {
        let mut files = Vec::new();
        for n in 1..=10 {
            files.push(image_path(SequenceNumber(n)));
            files.push(metadata_path(SequenceNumber(n)));
        }
        let cancel = CancelToken::new();
        cancel.cancel();

        let err = check_files(&files, Path::new("dataset"), &options(10, 1), None, &cancel)
            .unwrap_err();
        assert!(err.is_cancelled());
    }
}
