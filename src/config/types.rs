use seqforge_av::actions::{MovieSettings, SheetLayout};
use seqforge_av::Platform;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub check: CheckConfig,

    #[serde(default)]
    pub archive: ArchiveConfig,

    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub sheets: SheetsConfig,

    #[serde(default)]
    pub movies: MovieSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CheckConfig {
    /// Expected numbered items; images and metadata span `[1, images]`
    #[serde(default = "default_images")]
    pub images: u32,

    /// Expected frames per animation, numbered `[0, frames - 1]`
    #[serde(default = "default_frames")]
    pub frames: u32,

    /// Log a progress line every this many items
    #[serde(default = "default_progress_every")]
    pub progress_every: u32,

    /// Itemize run lists up to this many runs, print only the count above
    #[serde(default = "default_display_run_limit")]
    pub display_run_limit: usize,

    /// Top-level key every metadata document must carry
    #[serde(default = "default_metadata_key")]
    pub metadata_key: String,

    /// Report numbers found outside the expected range
    #[serde(default = "default_true")]
    pub report_out_of_range: bool,
}

fn default_images() -> u32 {
    8760
}
fn default_frames() -> u32 {
    300
}
fn default_progress_every() -> u32 {
    100
}
fn default_display_run_limit() -> usize {
    100
}
fn default_metadata_key() -> String {
    "_nft_metadata".to_string()
}
fn default_true() -> bool {
    true
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            images: default_images(),
            frames: default_frames(),
            progress_every: default_progress_every(),
            display_run_limit: default_display_run_limit(),
            metadata_key: default_metadata_key(),
            report_out_of_range: default_true(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArchiveConfig {
    /// Part size threshold handed verbatim to zip/split (e.g. "5g", "700m")
    #[serde(default = "default_part_size")]
    pub part_size: String,

    /// Use `split` numbering (`.zip.001`) instead of zip's own multipart naming
    #[serde(default)]
    pub numbered: bool,

    /// Userland flavour of `split`; detected from the build target when unset
    #[serde(default)]
    pub platform: Option<Platform>,
}

fn default_part_size() -> String {
    "5g".to_string()
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            part_size: default_part_size(),
            numbered: false,
            platform: None,
        }
    }
}

impl ArchiveConfig {
    pub fn platform(&self) -> Platform {
        self.platform.unwrap_or_else(Platform::current)
    }
}

/// Explicit executable paths; anything unset is looked up in `PATH`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub tar: Option<PathBuf>,

    #[serde(default)]
    pub zip: Option<PathBuf>,

    #[serde(default)]
    pub split: Option<PathBuf>,

    #[serde(default)]
    pub pngcheck: Option<PathBuf>,

    #[serde(default)]
    pub ffmpeg: Option<PathBuf>,

    #[serde(default)]
    pub gm: Option<PathBuf>,
}

impl ToolsConfig {
    fn configured(&self, name: &str) -> Option<&Path> {
        match name {
            "tar" => self.tar.as_deref(),
            "zip" => self.zip.as_deref(),
            "split" => self.split.as_deref(),
            "pngcheck" => self.pngcheck.as_deref(),
            "ffmpeg" => self.ffmpeg.as_deref(),
            "gm" => self.gm.as_deref(),
            _ => None,
        }
    }

    /// Resolve a tool, preferring the configured path.
    pub fn resolve(&self, name: &str) -> seqforge_av::Result<PathBuf> {
        seqforge_av::get_tool_path(name, self.configured(name))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SheetsConfig {
    #[serde(default = "default_sheet_size")]
    pub size: u32,

    #[serde(default = "default_border_w")]
    pub border_w: u32,

    #[serde(default = "default_border_h")]
    pub border_h: u32,

    #[serde(default = "default_tiles_x")]
    pub tiles_x: u32,

    #[serde(default = "default_tiles_y")]
    pub tiles_y: u32,

    /// File name prefix of each page
    #[serde(default = "default_sheet_prefix")]
    pub prefix: String,
}

fn default_sheet_size() -> u32 {
    500
}
fn default_border_w() -> u32 {
    30
}
fn default_border_h() -> u32 {
    8
}
fn default_tiles_x() -> u32 {
    8
}
fn default_tiles_y() -> u32 {
    5
}
fn default_sheet_prefix() -> String {
    "overview_".to_string()
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            size: default_sheet_size(),
            border_w: default_border_w(),
            border_h: default_border_h(),
            tiles_x: default_tiles_x(),
            tiles_y: default_tiles_y(),
            prefix: default_sheet_prefix(),
        }
    }
}

impl SheetsConfig {
    pub fn layout(&self) -> SheetLayout {
        SheetLayout {
            size: self.size,
            border_w: self.border_w,
            border_h: self.border_h,
            tiles_x: self.tiles_x,
            tiles_y: self.tiles_y,
        }
    }
}
