//! Dataset naming conventions.
//!
//! Every path in a dataset listing is relative to the dataset root and uses
//! `/` separators:
//!
//! - images: `images/<seq:04>.png`
//! - metadata: `metadata/<seq:04>.json`
//! - frames: `frames/<seq:04>/<seq:04>_<frame:04>.png`
//!
//! These names are bit-exact; the completeness scan builds them and tests
//! membership, so any drift here breaks every check.

use crate::sequence::parse_digits;
use crate::{Result, SequenceNumber};

/// Directory of still images.
pub const IMAGES_DIR: &str = "images";
/// Directory of per-image metadata records.
pub const METADATA_DIR: &str = "metadata";
/// Directory of per-sequence frame folders.
pub const FRAMES_DIR: &str = "frames";
/// Output directory for generated contact sheets.
pub const SHEETS_DIR: &str = "overviews";
/// Output directory for generated movies.
pub const MOVIES_DIR: &str = "videos";

pub const PNG_SUFFIX: &str = ".png";
pub const JSON_SUFFIX: &str = ".json";

/// Digits in every zero-padded number of the naming scheme.
pub const INDEX_WIDTH: usize = 4;

/// `images/0007.png`
pub fn image_path(seq: SequenceNumber) -> String {
    format!("{IMAGES_DIR}/{}{PNG_SUFFIX}", seq.padded(INDEX_WIDTH))
}

/// `metadata/0007.json`
pub fn metadata_path(seq: SequenceNumber) -> String {
    format!("{METADATA_DIR}/{}{JSON_SUFFIX}", seq.padded(INDEX_WIDTH))
}

/// `frames/0007/0007_`, the name prefix shared by all frames of one sequence.
pub fn frame_prefix(seq: SequenceNumber) -> String {
    let padded = seq.padded(INDEX_WIDTH);
    format!("{FRAMES_DIR}/{padded}/{padded}_")
}

/// `frames/0007/0007_0123.png`
pub fn frame_path(seq: SequenceNumber, frame: u32) -> String {
    format!(
        "{}{}{PNG_SUFFIX}",
        frame_prefix(seq),
        SequenceNumber(frame).padded(INDEX_WIDTH)
    )
}

/// Sequence number of a frame path, read from the fixed-width token right
/// after `frames/`.
///
/// The token is taken by position, not by splitting on `/`; a path whose
/// token is short or not numeric is a parse error.
///
/// # Examples
///
/// ```
/// use seqforge_common::paths::frame_sequence;
///
/// assert_eq!(frame_sequence("frames/0007/0007_0299.png")?.get(), 7);
/// assert!(frame_sequence("frames/x/0007_0299.png").is_err());
/// # Ok::<(), seqforge_common::Error>(())
/// ```
pub fn frame_sequence(path: &str) -> Result<SequenceNumber> {
    let start = FRAMES_DIR.len() + 1;
    let end = start + INDEX_WIDTH;
    let token = path.get(start..end).unwrap_or("");
    parse_digits(path, token)
}

/// Whether a path component is hidden (`.DS_Store`, `._0001.png`).
pub fn is_dotfile(name: &str) -> bool {
    name.starts_with('.')
}
