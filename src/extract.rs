//! Extraction of a folder of tars into one dataset tree.

use crate::Result;
use seqforge_av::actions::{extract, ExtractOptions};
use seqforge_av::{CancelToken, Platform};
use std::path::{Path, PathBuf};
use tracing::info;

/// Suffix of the folder a tar folder is extracted into.
pub const EXTRACT_SUFFIX: &str = "_processed";

/// `<out>/<basename(tar_dir)>_processed`
pub fn extract_folder_for(tar_dir: &Path, out: &Path) -> PathBuf {
    let base = tar_dir
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    out.join(format!("{base}{EXTRACT_SUFFIX}"))
}

/// 1-based inclusive window of tar indices selected by `from`/`to`.
///
/// `from` below 1 starts at the first tar, `to` of 0 runs to the last, and
/// `to` never ends before `from`.
pub fn tar_window(count: usize, from: usize, to: usize) -> (usize, usize) {
    let from = from.max(1);
    let to = if to == 0 { count } else { to };
    (from, to.max(from))
}

/// Extract the selected `tars` into `dest`.
pub fn extract_tars(
    tar: &Path,
    tars: &[PathBuf],
    dest: &Path,
    window: (usize, usize),
    options: ExtractOptions,
    platform: Platform,
    cancel: &CancelToken,
) -> Result<usize> {
    let (from, to) = window;
    if from > 1 || to < tars.len() {
        info!("Range: {}-{}", from, to);
    }
    if options.verbose {
        info!("Using tar option v (verbose)");
    }
    if options.keep_old {
        info!("Using tar option {} (keep old files)", platform.tar_keep_old_flag());
    }

    std::fs::create_dir_all(dest)?;
    let mut extracted = 0;
    for (i, archive) in tars.iter().enumerate() {
        let n = i + 1;
        if n < from || n > to {
            continue;
        }
        info!("({}/{}) Extracting {}", n, tars.len(), archive.display());
        extract(tar, archive, dest, options, platform, cancel)?;
        extracted += 1;
    }
    Ok(extracted)
}
