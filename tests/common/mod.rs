//! Shared test harness for integration tests.
//!
//! Provides [`Dataset`], a builder for extracted datasets on disk laid out
//! the way `seqforge extract` leaves them.

#![allow(dead_code)]

use seqforge_common::paths::{frame_path, image_path, metadata_path};
use seqforge_common::SequenceNumber;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Smallest byte string `pngcheck` would not be asked about in these tests.
pub const FAKE_PNG: &[u8] = b"\x89PNG\r\n\x1a\n";

pub const METADATA_KEY: &str = "_nft_metadata";

/// An extracted dataset in a temporary directory.
pub struct Dataset {
    dir: TempDir,
}

impl Dataset {
    /// Empty `images/`, `metadata/` and `frames/` folders.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        for sub in ["images", "metadata", "frames"] {
            fs::create_dir_all(dir.path().join(sub)).unwrap();
        }
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    fn write(&self, relative: &str, bytes: &[u8]) -> PathBuf {
        let path = self.dir.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, bytes).unwrap();
        path
    }

    pub fn image(&self, n: u32) -> &Self {
        self.write(&image_path(SequenceNumber(n)), FAKE_PNG);
        self
    }

    pub fn metadata(&self, n: u32) -> &Self {
        let body = format!(r#"{{"{METADATA_KEY}": {{"id": {n}}}}}"#);
        self.write(&metadata_path(SequenceNumber(n)), body.as_bytes());
        self
    }

    /// Metadata that parses as JSON but lacks the required key.
    pub fn bad_metadata(&self, n: u32) -> &Self {
        self.write(&metadata_path(SequenceNumber(n)), br#"{"other": 1}"#);
        self
    }

    /// Frames `0..count` of sequence `n`.
    pub fn frames(&self, n: u32, count: u32) -> &Self {
        for frame in 0..count {
            self.write(&frame_path(SequenceNumber(n), frame), FAKE_PNG);
        }
        self
    }

    /// Image, metadata and a full animation for every number in `range`.
    pub fn complete(&self, range: std::ops::RangeInclusive<u32>, frames: u32) -> &Self {
        for n in range {
            self.image(n).metadata(n).frames(n, frames);
        }
        self
    }

    pub fn remove(&self, relative: &str) -> &Self {
        fs::remove_file(self.dir.path().join(relative)).unwrap();
        self
    }

    /// A config file next to the dataset with the given expectations.
    pub fn config(&self, images: u32, frames: u32) -> PathBuf {
        let body = format!(
            "[check]\nimages = {images}\nframes = {frames}\nprogress_every = 2\n"
        );
        self.write(".seqforge.toml", body.as_bytes())
    }
}
