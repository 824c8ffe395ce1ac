//! Contact sheets: pages of image thumbnails for visual review.

use crate::config::SheetsConfig;
use crate::Result;
use seqforge_av::actions::render_sheet;
use seqforge_av::CancelToken;
use std::path::{Path, PathBuf};
use tracing::info;

/// One page of a contact sheet run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetPage {
    /// 1-based page number.
    pub page: usize,
    pub inputs: Vec<PathBuf>,
    pub output: PathBuf,
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Split `images` into pages named `<prefix><page:03>_<first>-<last>.png`.
pub fn plan_sheets(images: &[PathBuf], per_page: usize, prefix: &str, out_dir: &Path) -> Vec<SheetPage> {
    images
        .chunks(per_page.max(1))
        .enumerate()
        .map(|(i, chunk)| {
            let first = chunk.first().map(|p| stem(p)).unwrap_or_default();
            let last = chunk.last().map(|p| stem(p)).unwrap_or_default();
            SheetPage {
                page: i + 1,
                inputs: chunk.to_vec(),
                output: out_dir.join(format!("{prefix}{:03}_{first}-{last}.png", i + 1)),
            }
        })
        .collect()
}

/// Render every page into `out_dir`, which is created if needed.
pub fn create_contact_sheets(
    gm: &Path,
    images: &[PathBuf],
    out_dir: &Path,
    config: &SheetsConfig,
    cancel: &CancelToken,
) -> Result<Vec<PathBuf>> {
    let layout = config.layout();
    let pages = plan_sheets(images, layout.per_page(), &config.prefix, out_dir);
    info!("{} sheets, {} images each", pages.len(), layout.per_page());

    std::fs::create_dir_all(out_dir)?;
    let total = pages.len();
    let mut written = Vec::with_capacity(total);
    for page in pages {
        info!(
            "({}/{}) {} images -> {}",
            page.page,
            total,
            page.inputs.len(),
            page.output.display()
        );
        render_sheet(gm, &page.inputs, &page.output, &layout, cancel)?;
        written.push(page.output);
    }
    Ok(written)
}
