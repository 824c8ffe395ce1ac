//! Sequence model shared by every check.
//!
//! A dataset is a set of numbered items checked against an inclusive
//! [`ExpectedRange`]. Items are identified by a [`SequenceNumber`] parsed out
//! of a `<prefix><digits><suffix>` name.

use crate::paths;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

/// Logical index of one image, metadata record, animation or frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SequenceNumber(pub u32);

impl SequenceNumber {
    /// Raw numeric value.
    pub fn get(self) -> u32 {
        self.0
    }

    /// Zero-padded rendering, e.g. `7` at width 4 is `0007`.
    pub fn padded(self, width: usize) -> String {
        format!("{:0width$}", self.0, width = width)
    }
}

impl fmt::Display for SequenceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for SequenceNumber {
    fn from(n: u32) -> Self {
        Self(n)
    }
}

impl From<SequenceNumber> for u32 {
    fn from(n: SequenceNumber) -> Self {
        n.0
    }
}

/// Inclusive `[low, high]` universe a collection is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedRange {
    low: u32,
    high: u32,
}

impl ExpectedRange {
    /// Create a range, rejecting `high < low`.
    pub fn new(low: u32, high: u32) -> Result<Self> {
        if high < low {
            return Err(Error::Range { low, high });
        }
        Ok(Self { low, high })
    }

    /// `[1, count]`, the range of a dataset with `count` numbered items.
    pub fn one_based(count: u32) -> Result<Self> {
        Self::new(1, count)
    }

    /// `[0, count - 1]`, the frame indices of one animation.
    pub fn zero_based(count: u32) -> Result<Self> {
        match count.checked_sub(1) {
            Some(high) => Self::new(0, high),
            None => Err(Error::Range { low: 0, high: 0 }),
        }
    }

    pub fn low(&self) -> u32 {
        self.low
    }

    pub fn high(&self) -> u32 {
        self.high
    }

    /// Number of integers in the range.
    pub fn len(&self) -> u64 {
        u64::from(self.high - self.low) + 1
    }

    /// A range always holds at least one number.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, n: u32) -> bool {
        (self.low..=self.high).contains(&n)
    }

    pub fn iter(&self) -> RangeInclusive<u32> {
        self.low..=self.high
    }
}

impl fmt::Display for ExpectedRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.low, self.high)
    }
}

/// Category of numbered items checked independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// Still image, `images/0001.png`.
    Image,
    /// Metadata record, `metadata/0001.json`.
    Metadata,
    /// Animation frame group, `frames/0001/0001_0000.png`.
    Frame,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 3] = [Self::Image, Self::Metadata, Self::Frame];

    /// Top-level directory holding items of this kind.
    pub fn dir(&self) -> &'static str {
        match self {
            Self::Image => paths::IMAGES_DIR,
            Self::Metadata => paths::METADATA_DIR,
            Self::Frame => paths::FRAMES_DIR,
        }
    }

    /// Filename suffix of items of this kind.
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Image | Self::Frame => paths::PNG_SUFFIX,
            Self::Metadata => paths::JSON_SUFFIX,
        }
    }

    /// Path prefix (`images/`) that selects this kind in a listing.
    pub fn prefix(&self) -> String {
        format!("{}/", self.dir())
    }

    /// Plural noun used in reports.
    pub fn noun(&self) -> &'static str {
        match self {
            Self::Image => "images",
            Self::Metadata => "metadata",
            Self::Frame => "frames",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image => write!(f, "image"),
            Self::Metadata => write!(f, "metadata"),
            Self::Frame => write!(f, "frame"),
        }
    }
}

/// Parse `<prefix><digits><suffix>` into a [`SequenceNumber`].
///
/// The digits may carry any amount of zero padding. Anything else between
/// prefix and suffix, including signs or whitespace, is a parse error.
///
/// # Examples
///
/// ```
/// use seqforge_common::{parse_sequence_number, SequenceNumber};
///
/// let n = parse_sequence_number("images/0042.png", "images/", ".png")?;
/// assert_eq!(n, SequenceNumber(42));
/// assert!(parse_sequence_number("images/42a.png", "images/", ".png").is_err());
/// # Ok::<(), seqforge_common::Error>(())
/// ```
pub fn parse_sequence_number(name: &str, prefix: &str, suffix: &str) -> Result<SequenceNumber> {
    let digits = name
        .strip_prefix(prefix)
        .ok_or_else(|| Error::parse(name, format!("missing prefix {prefix:?}")))?
        .strip_suffix(suffix)
        .ok_or_else(|| Error::parse(name, format!("missing suffix {suffix:?}")))?;

    parse_digits(name, digits)
}

/// Parse a bare run of ASCII digits, reporting failures against `name`.
pub(crate) fn parse_digits(name: &str, digits: &str) -> Result<SequenceNumber> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::parse(name, "not a decimal integer"));
    }
    digits
        .parse::<u32>()
        .map(SequenceNumber)
        .map_err(|e| Error::parse(name, e.to_string()))
}
