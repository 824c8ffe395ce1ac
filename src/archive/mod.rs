//! Size-bounded zip archives of dataset folders.
//!
//! Each target folder becomes one archive split into parts of at most
//! `part_size` bytes, either with zip's own multipart naming
//! (`images.z01`, …, `images.zip`) or as a byte stream cut by `split`
//! (`images.zip.001`, …).

pub mod numbering;

pub use numbering::{normalize, PartNumbering};

use crate::{Error, Result};
use seqforge_av::{CancelToken, Pipeline, Platform, ToolCommand};
use seqforge_common::paths::{FRAMES_DIR, IMAGES_DIR, METADATA_DIR, MOVIES_DIR, SHEETS_DIR};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// A folder that can be archived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveTarget {
    Meta,
    Sheets,
    Images,
    Movies,
    Frames,
}

impl ArchiveTarget {
    /// Expansion of `all`, in archiving order.
    pub const ALL: [ArchiveTarget; 5] = [
        Self::Meta,
        Self::Sheets,
        Self::Images,
        Self::Movies,
        Self::Frames,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Meta => "meta",
            Self::Sheets => "sheets",
            Self::Images => "images",
            Self::Movies => "movies",
            Self::Frames => "frames",
        }
    }

    /// Folder archived for this target, also the archive's base name.
    pub fn folder(&self) -> &'static str {
        match self {
            Self::Meta => METADATA_DIR,
            Self::Sheets => SHEETS_DIR,
            Self::Images => IMAGES_DIR,
            Self::Movies => MOVIES_DIR,
            Self::Frames => FRAMES_DIR,
        }
    }
}

impl fmt::Display for ArchiveTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for ArchiveTarget {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.name() == s.trim())
            .ok_or_else(|| format!("Unknown archive target: {}", s))
    }
}

/// Parse a comma separated target list such as `all` or `images,frames`.
///
/// Unknown names are dropped with a warning and duplicates collapse.
pub fn parse_targets(list: &str) -> Vec<ArchiveTarget> {
    let mut out: Vec<ArchiveTarget> = Vec::new();
    for name in list.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        let expanded = if name == "all" {
            ArchiveTarget::ALL.to_vec()
        } else {
            match name.parse::<ArchiveTarget>() {
                Ok(target) => vec![target],
                Err(e) => {
                    warn!("{}", e);
                    continue;
                }
            }
        };
        for target in expanded {
            if !out.contains(&target) {
                out.push(target);
            }
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArchiveMode {
    /// `zip -s`: `<target>.z01`, …, `<target>.zip`.
    #[default]
    Combined,
    /// `zip | split`: `<target>.zip.001`, `<target>.zip.002`, ….
    Numbered,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveOutcome {
    /// The target folder does not exist.
    Skipped { folder: PathBuf },
    /// Parts written, in order.
    Written { parts: Vec<PathBuf> },
}

/// Splits folders into archive parts with external `zip` and `split`.
#[derive(Debug, Clone)]
pub struct Splitter {
    zip: PathBuf,
    split: PathBuf,
    part_size: String,
    mode: ArchiveMode,
    platform: Platform,
}

impl Splitter {
    pub fn new(
        zip: impl Into<PathBuf>,
        split: impl Into<PathBuf>,
        part_size: impl Into<String>,
        mode: ArchiveMode,
        platform: Platform,
    ) -> Self {
        Self {
            zip: zip.into(),
            split: split.into(),
            part_size: part_size.into(),
            mode,
            platform,
        }
    }

    /// Archive `<src>/<folder>` into `<dest>/<folder>.zip[...]`.
    ///
    /// # Errors
    ///
    /// A failing `zip` or `split` yields [`Error::Archive`] naming the
    /// target; whatever parts were written stay on disk.
    pub fn archive(
        &self,
        target: ArchiveTarget,
        src: &Path,
        dest: &Path,
        cancel: &CancelToken,
    ) -> Result<ArchiveOutcome> {
        let folder = target.folder();
        let input = src.join(folder);
        if !input.is_dir() {
            warn!(
                "Archiving {}: Skipping. Folder doesn't exist: {}",
                target,
                input.display()
            );
            return Ok(ArchiveOutcome::Skipped { folder: input });
        }

        fs::create_dir_all(dest)?;
        let dest = fs::canonicalize(dest)?;
        let archive = dest.join(format!("{folder}.zip"));

        for stale in existing_outputs(&dest, folder)? {
            info!("Removing {}", stale.display());
            fs::remove_file(&stale)?;
        }

        info!(
            "Archiving {}: {} -> {}{}",
            target,
            input.display(),
            archive.display(),
            if self.mode == ArchiveMode::Numbered { "[.001]" } else { "" }
        );

        let parts = match self.mode {
            ArchiveMode::Combined => {
                self.zip_combined(src, folder, &archive, cancel)
                    .map_err(|e| e.for_archive_target(target.name()))?;
                existing_outputs(&dest, folder)?
            }
            ArchiveMode::Numbered => {
                self.zip_numbered(src, folder, &archive, cancel)
                    .map_err(|e| e.for_archive_target(target.name()))?;
                normalize(&archive, PartNumbering::for_platform(self.platform))?
            }
        };

        Ok(ArchiveOutcome::Written { parts })
    }

    fn zip_combined(&self, src: &Path, folder: &str, archive: &Path, cancel: &CancelToken) -> Result<()> {
        ToolCommand::new(&self.zip)
            .current_dir(src)
            .args(["-s", self.part_size.as_str(), "-r"])
            .arg(archive)
            .arg(folder)
            .discard_stdout()
            .execute(cancel)?;
        Ok(())
    }

    fn zip_numbered(&self, src: &Path, folder: &str, archive: &Path, cancel: &CancelToken) -> Result<()> {
        let mut zip = ToolCommand::new(&self.zip);
        zip.current_dir(src).args(["-r", "-", folder]);

        let mut prefix = archive.as_os_str().to_os_string();
        prefix.push(".");
        let mut split = ToolCommand::new(&self.split);
        split
            .args(self.platform.split_numeric_args().iter().copied())
            .args(["-a", "3", "-b"])
            .arg(self.part_size.to_uppercase())
            .arg("-")
            .arg(prefix);

        Pipeline::new(&zip, &split).execute(cancel)?;
        Ok(())
    }
}

/// Outputs of a previous run for `folder` in `dest`: `<folder>.zip`,
/// `<folder>.zip.NNN` and `<folder>.zNN`, sorted with `.zip` last.
fn existing_outputs(dest: &Path, folder: &str) -> Result<Vec<PathBuf>> {
    let archive_name = format!("{folder}.zip");
    let numbered = format!("{archive_name}.");
    let combined = format!("{folder}.z");
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

    let mut parts = Vec::new();
    let mut has_archive = false;
    for entry in fs::read_dir(dest)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if name == archive_name {
            has_archive = true;
        } else if name.strip_prefix(&numbered).is_some_and(digits)
            || name.strip_prefix(&combined).is_some_and(digits)
        {
            parts.push(dest.join(name));
        }
    }
    parts.sort();
    if has_archive {
        parts.push(dest.join(archive_name));
    }
    Ok(parts)
}

/// Archive every target in order, stopping at the first failure.
pub fn archive_targets(
    splitter: &Splitter,
    targets: &[ArchiveTarget],
    src: &Path,
    dest: &Path,
    cancel: &CancelToken,
) -> Result<Vec<(ArchiveTarget, ArchiveOutcome)>> {
    if targets.is_empty() {
        return Err(Error::invalid_input("no valid archive targets"));
    }
    targets
        .iter()
        .map(|&target| Ok((target, splitter.archive(target, src, dest, cancel)?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_targets() {
        assert_eq!(parse_targets("all"), ArchiveTarget::ALL.to_vec());
        assert_eq!(
            parse_targets("frames, images,bogus,frames"),
            [ArchiveTarget::Frames, ArchiveTarget::Images]
        );
        assert!(parse_targets("bogus").is_empty());
        assert!(parse_targets("").is_empty());
    }

    #[test]
    fn test_target_folders() {
        let folders: Vec<&str> = ArchiveTarget::ALL.iter().map(|t| t.folder()).collect();
        assert_eq!(folders, ["metadata", "overviews", "images", "videos", "frames"]);
    }

    #[test]
    fn test_existing_outputs() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "images.zip",
            "images.z01",
            "images.z02",
            "images.zip.001",
            "images.zip.part",
            "frames.zip",
            "images.zebra",
        ] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        let found: Vec<String> = existing_outputs(dir.path(), "images")
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(found, ["images.z01", "images.z02", "images.zip.001", "images.zip"]);
    }

    #[test]
    fn test_missing_folder_is_skipped() {
        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        let splitter = Splitter::new(
            "zip",
            "split",
            "5g",
            ArchiveMode::Numbered,
            Platform::Gnu,
        );
        let outcome = splitter
            .archive(ArchiveTarget::Movies, src.path(), dest.path(), &CancelToken::new())
            .unwrap();
        assert_eq!(
            outcome,
            ArchiveOutcome::Skipped {
                folder: src.path().join("videos")
            }
        );
    }

    #[test]
    fn test_no_targets_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let splitter = Splitter::new("zip", "split", "5g", ArchiveMode::Combined, Platform::Gnu);
        let err = archive_targets(&splitter, &[], dir.path(), dir.path(), &CancelToken::new())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_tool_names_target() {
        let src = tempfile::tempdir().unwrap();
        fs::create_dir(src.path().join("images")).unwrap();
        let dest = tempfile::tempdir().unwrap();
        let splitter = Splitter::new("false", "split", "5g", ArchiveMode::Combined, Platform::Gnu);

        let err = splitter
            .archive(ArchiveTarget::Images, src.path(), dest.path(), &CancelToken::new())
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Archive { ref target, code: Some(1), .. } if target == "images"
        ));
    }
}
