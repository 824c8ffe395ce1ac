//! Dataset listings.
//!
//! A check consumes a flat list of `/`-separated paths relative to the
//! dataset root, produced either by walking an extracted tree or by reading
//! the member names of the source tars.

use crate::{Error, Result};
use seqforge_av::{actions, CancelToken};
use seqforge_common::paths::{is_dotfile, FRAMES_DIR, IMAGES_DIR, METADATA_DIR};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// What an input folder holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputDirType {
    Nonexistent,
    /// An extracted dataset with `images/`, `frames/` and `metadata/`.
    Extraction,
    /// Anything else is assumed to be a folder of tars.
    Tars,
}

pub fn input_dir_type(dir: &Path) -> InputDirType {
    if !dir.exists() {
        return InputDirType::Nonexistent;
    }
    if [IMAGES_DIR, FRAMES_DIR, METADATA_DIR]
        .iter()
        .all(|kind| dir.join(kind).is_dir())
    {
        InputDirType::Extraction
    } else {
        InputDirType::Tars
    }
}

/// Files directly in `dir` with the given extension, sorted.
///
/// A missing directory yields an empty list.
pub fn list_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    list_children(dir, |path| {
        path.is_file() && path.extension().is_some_and(|ext| ext == extension)
    })
}

/// Subdirectories of `dir` whose name is all digits, sorted.
pub fn list_numeric_dirs(dir: &Path) -> Result<Vec<PathBuf>> {
    list_children(dir, |path| {
        path.is_dir()
            && path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit()))
    })
}

fn list_children(dir: &Path, keep: impl Fn(&Path) -> bool) -> Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut out = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let hidden = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(is_dotfile);
        if !hidden && keep(&path) {
            out.push(path);
        }
    }
    out.sort();
    Ok(out)
}

/// Entries walked between cancellation checks.
const CANCEL_CHECK_EVERY: usize = 1000;

/// Every file under `root` as a sorted list of relative `/`-separated paths.
///
/// Dotfiles are skipped; directories never appear in the listing. Symlinks
/// are not followed, and unreadable entries are skipped with a warning.
pub fn list_files_recursive(root: &Path, cancel: &CancelToken) -> Result<Vec<String>> {
    let mut out = Vec::new();

    let walker = WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_str().is_some_and(is_dotfile));
    for (i, entry) in walker.enumerate() {
        if i % CANCEL_CHECK_EVERY == 0 && cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        out.push(name);
    }

    info!("Listed {} files under {:?}", out.len(), root);
    out.sort();
    Ok(out)
}

/// Member names of every tar in `tars`, concatenated in order.
///
/// Names repeated within one tar are listed once; a name present in several
/// tars appears once per tar.
pub fn list_tar_contents(tar: &Path, tars: &[PathBuf], cancel: &CancelToken) -> Result<Vec<String>> {
    let mut out = Vec::new();

    for (i, archive) in tars.iter().enumerate() {
        let members = actions::list_members(tar, archive, cancel)?;
        let mut seen = HashSet::with_capacity(members.len());
        let before = out.len();
        out.extend(members.into_iter().filter(|name| seen.insert(name.clone())));

        info!(
            "({}/{}) Listing {}: {} files, {} total",
            i + 1,
            tars.len(),
            archive
                .file_name()
                .map(|n| n.to_string_lossy())
                .unwrap_or_default(),
            out.len() - before,
            out.len()
        );
    }

    Ok(out)
}

/// Keep paths whose file stem is a number within `[from, to]`.
///
/// A bound of 0 is open. Paths without a numeric stem are dropped.
pub fn limit_range(paths: Vec<PathBuf>, from: u32, to: u32) -> Vec<PathBuf> {
    paths
        .into_iter()
        .filter(|path| {
            let Some(num) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse::<u32>().ok())
            else {
                debug!("Ignoring non-numeric name {:?}", path);
                return false;
            };
            (from == 0 || num >= from) && (to == 0 || num <= to)
        })
        .collect()
}
