//! Frame groups: frame paths partitioned by animation sequence.

use super::completeness::{is_complete, NameIndex};
use crate::{Error, Result};
use seqforge_av::CancelToken;
use seqforge_common::paths::{self, frame_prefix, INDEX_WIDTH, PNG_SUFFIX};
use seqforge_common::runs::RunBuilder;
use seqforge_common::{ExpectedRange, RunList, SequenceNumber};
use std::collections::BTreeMap;

/// Sorted frame paths of each animation sequence.
#[derive(Debug, Clone, Default)]
pub struct FrameGroups {
    groups: BTreeMap<SequenceNumber, Vec<String>>,
}

impl FrameGroups {
    pub fn get(&self, seq: SequenceNumber) -> Option<&[String]> {
        self.groups.get(&seq).map(Vec::as_slice)
    }

    /// Number of sequences with at least one frame.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SequenceNumber, &[String])> {
        self.groups.iter().map(|(seq, frames)| (*seq, frames.as_slice()))
    }

    pub fn sequences(&self) -> impl Iterator<Item = SequenceNumber> + '_ {
        self.groups.keys().copied()
    }
}

/// Group frame paths by the sequence token after `frames/`.
///
/// A path whose token does not parse fails the whole partition.
pub fn partition_frames<'a, I>(frames: I) -> Result<FrameGroups>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut groups: BTreeMap<SequenceNumber, Vec<String>> = BTreeMap::new();
    for path in frames {
        let seq = paths::frame_sequence(path)?;
        groups.entry(seq).or_default().push(path.to_string());
    }
    for frames in groups.values_mut() {
        frames.sort();
        frames.dedup();
    }
    Ok(FrameGroups { groups })
}

/// Running totals handed to the progress callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimProgress {
    pub scanned: u32,
    pub complete: u32,
    pub incomplete: u32,
}

/// Outcome of a frame completeness scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnimScan {
    /// Sequences whose frames are all present.
    pub complete: RunList,
    /// Sequences with missing frames, including those with no frames at all.
    pub incomplete: RunList,
}

impl AnimScan {
    pub fn is_complete(&self) -> bool {
        self.incomplete.is_empty()
    }
}

/// Test every sequence of `sequences` for a full set of `frames`.
///
/// `on_progress` is called after every `progress_every` sequences. Only the
/// two run lists are accumulated.
pub fn scan_frame_completeness(
    groups: &FrameGroups,
    sequences: &ExpectedRange,
    frames: &ExpectedRange,
    progress_every: u32,
    cancel: &CancelToken,
    mut on_progress: impl FnMut(AnimProgress),
) -> Result<AnimScan> {
    let mut complete = RunBuilder::new();
    let mut incomplete = RunBuilder::new();
    let mut progress = AnimProgress {
        scanned: 0,
        complete: 0,
        incomplete: 0,
    };

    for n in sequences.iter() {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let seq = SequenceNumber(n);
        let prefix = frame_prefix(seq);
        let found = groups.get(seq).is_some_and(|names| {
            is_complete(
                &NameIndex::new(names, &prefix, PNG_SUFFIX, INDEX_WIDTH),
                frames,
            )
        });

        if found {
            complete.push(n);
            progress.complete += 1;
        } else {
            incomplete.push(n);
            progress.incomplete += 1;
        }
        progress.scanned += 1;

        if progress_every > 0 && progress.scanned % progress_every == 0 {
            on_progress(progress);
        }
    }

    Ok(AnimScan {
        complete: complete.finish(),
        incomplete: incomplete.finish(),
    })
}
