//! Wrappers around the external collaborators of a batch run.
//!
//! This module provides narrow entry points for:
//! - Listing and extracting tar archives
//! - Tiling stills into contact sheets (graphicsmagick)
//! - Encoding frame sequences into movies (ffmpeg)

mod montage;
mod tar;
mod transcode;

pub use montage::{render_sheet, SheetLayout};
pub use tar::{extract, list_members, ExtractOptions};
pub use transcode::{encode_movie, ffmpeg_args, MovieCodec, MovieSettings};
