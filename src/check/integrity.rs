//! Per-file integrity verdicts.
//!
//! Validators only answer valid or corrupt. A scan never stops at the first
//! corrupt file; it runs over every item and returns the failures.

use super::frames::FrameGroups;
use crate::{Error, Result};
use seqforge_av::{CancelToken, ToolCommand};
use seqforge_common::SequenceNumber;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Decides whether one file is intact.
pub trait Validator {
    /// Noun used in progress and corruption lines.
    fn label(&self) -> &'static str;

    /// `Ok(false)` marks the file corrupt. Errors are reserved for
    /// conditions that must stop the batch, such as cancellation.
    fn validate(&self, path: &Path, cancel: &CancelToken) -> Result<bool>;
}

/// Structural PNG check delegated to `pngcheck`.
#[derive(Debug, Clone)]
pub struct ImageValidator {
    program: PathBuf,
}

impl ImageValidator {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Validator for ImageValidator {
    fn label(&self) -> &'static str {
        "image"
    }

    fn validate(&self, path: &Path, cancel: &CancelToken) -> Result<bool> {
        match ToolCommand::new(&self.program)
            .arg(path)
            .discard_stdout()
            .status(cancel)
        {
            Ok(status) => Ok(status.success()),
            Err(e) if e.is_cancelled() => Err(Error::Cancelled),
            Err(e) => {
                tracing::debug!("Validator failed on {:?}: {}", path, e);
                Ok(false)
            }
        }
    }
}

/// A metadata document is valid iff it parses as a JSON object carrying the
/// required top-level key.
#[derive(Debug, Clone)]
pub struct MetadataValidator {
    required_key: String,
}

impl MetadataValidator {
    pub fn new(required_key: impl Into<String>) -> Self {
        Self {
            required_key: required_key.into(),
        }
    }

    pub fn validate_bytes(&self, bytes: &[u8]) -> bool {
        match serde_json::from_slice::<serde_json::Value>(bytes) {
            Ok(serde_json::Value::Object(map)) => map.contains_key(&self.required_key),
            _ => false,
        }
    }
}

impl Validator for MetadataValidator {
    fn label(&self) -> &'static str {
        "json"
    }

    fn validate(&self, path: &Path, cancel: &CancelToken) -> Result<bool> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        match std::fs::read(path) {
            Ok(bytes) => Ok(self.validate_bytes(&bytes)),
            Err(e) => {
                tracing::debug!("Cannot read {:?}: {}", path, e);
                Ok(false)
            }
        }
    }
}

/// Outcome of an integrity scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IntegrityReport {
    pub checked: usize,
    pub corrupt: Vec<PathBuf>,
}

impl IntegrityReport {
    pub fn is_verified(&self) -> bool {
        self.corrupt.is_empty()
    }
}

/// Validate every file in `files`, logging every `progress_every` items.
pub fn scan<V: Validator + ?Sized>(
    validator: &V,
    files: &[PathBuf],
    progress_every: usize,
    cancel: &CancelToken,
) -> Result<IntegrityReport> {
    let mut report = IntegrityReport::default();
    let total = files.len();

    for (i, file) in files.iter().enumerate() {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        if !validator.validate(file, cancel)? {
            error!("CORRUPT {}: {}", validator.label(), file.display());
            report.corrupt.push(file.clone());
        }
        report.checked += 1;

        if progress_every > 0 && (i + 1) % progress_every == 0 {
            info!(
                "{} verified: {}/{}, corrupt: {}/{}",
                validator.label(),
                report.checked - report.corrupt.len(),
                total,
                report.corrupt.len(),
                total
            );
        }
    }

    Ok(report)
}

/// Frame groups with at least one corrupt frame.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FrameIntegrity {
    pub verified: usize,
    pub corrupt: Vec<SequenceNumber>,
    pub corrupt_frames: Vec<PathBuf>,
}

impl FrameIntegrity {
    pub fn is_verified(&self) -> bool {
        self.corrupt.is_empty()
    }
}

/// Validate every frame of every group under `root`.
pub fn scan_frame_groups<V: Validator + ?Sized>(
    validator: &V,
    root: &Path,
    groups: &FrameGroups,
    progress_every: usize,
    cancel: &CancelToken,
) -> Result<FrameIntegrity> {
    let mut out = FrameIntegrity::default();

    for (seq, frames) in groups.iter() {
        let files: Vec<PathBuf> = frames.iter().map(|f| root.join(f)).collect();
        let report = scan(validator, &files, progress_every, cancel)?;
        if report.is_verified() {
            out.verified += 1;
        } else {
            out.corrupt.push(seq);
            out.corrupt_frames.extend(report.corrupt);
        }
        info!(
            "anims verified: {}, corrupt: {}",
            out.verified,
            out.corrupt.len()
        );
    }

    Ok(out)
}
