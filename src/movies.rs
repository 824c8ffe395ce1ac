//! Movies encoded from per-sequence frame folders.

use crate::Result;
use seqforge_av::actions::{encode_movie, MovieSettings};
use seqforge_av::CancelToken;
use std::path::{Path, PathBuf};
use tracing::info;

/// Input pattern and output file for one frame folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieJob {
    pub folder: PathBuf,
    /// `<folder>/<seq>_%04d.png`
    pub pattern: PathBuf,
    /// `<out_dir>/<seq>.<ext>`
    pub target: PathBuf,
}

pub fn plan_movies(folders: &[PathBuf], out_dir: &Path, settings: &MovieSettings) -> Vec<MovieJob> {
    folders
        .iter()
        .filter_map(|folder| {
            let seq = folder.file_name()?.to_string_lossy().to_string();
            Some(MovieJob {
                folder: folder.clone(),
                pattern: folder.join(format!("{seq}_%04d.png")),
                target: out_dir.join(format!("{seq}.{}", settings.codec.extension())),
            })
        })
        .collect()
}

/// Encode every folder into `out_dir`, which is created if needed.
pub fn create_movies(
    ffmpeg: &Path,
    folders: &[PathBuf],
    out_dir: &Path,
    settings: &MovieSettings,
    cancel: &CancelToken,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir)?;
    let jobs = plan_movies(folders, out_dir, settings);
    let total = jobs.len();

    let mut written = Vec::with_capacity(total);
    for (i, job) in jobs.into_iter().enumerate() {
        info!(
            "({}/{}) {} -> {}",
            i + 1,
            total,
            job.folder.display(),
            job.target.display()
        );
        encode_movie(ffmpeg, &job.pattern, &job.target, settings, cancel)?;
        written.push(job.target);
    }
    Ok(written)
}
