//! Run-length summaries of integer sets.
//!
//! Tens of thousands of present/missing flags are reported as a short list of
//! maximal contiguous runs, e.g. `12, 45-52, 90`. The [`RunList`] is the
//! canonical form: two artifact kinds track each other exactly when their run
//! lists are equal.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A maximal block of consecutive integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Run {
    /// A lone number with no neighbours in the set.
    Single(u32),
    /// `start..=end` with `start < end`.
    Span(u32, u32),
}

impl Run {
    pub fn start(&self) -> u32 {
        match *self {
            Run::Single(n) => n,
            Run::Span(start, _) => start,
        }
    }

    pub fn end(&self) -> u32 {
        match *self {
            Run::Single(n) => n,
            Run::Span(_, end) => end,
        }
    }

    /// Count of integers covered by the run.
    pub fn len(&self) -> u64 {
        u64::from(self.end() - self.start()) + 1
    }

    /// A run always covers at least one integer.
    pub fn is_empty(&self) -> bool {
        false
    }

    fn from_bounds(start: u32, end: u32) -> Self {
        if start == end {
            Run::Single(start)
        } else {
            Run::Span(start, end)
        }
    }
}

impl fmt::Display for Run {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Run::Single(n) => write!(f, "{n}"),
            Run::Span(start, end) => write!(f, "{start}-{end}"),
        }
    }
}

/// Sorted, disjoint, non-adjacent runs whose union is the summarized set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunList(Vec<Run>);

impl RunList {
    pub fn runs(&self) -> &[Run] {
        &self.0
    }

    /// Number of runs (not of integers).
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total count of integers covered by all runs.
    pub fn count(&self) -> u64 {
        self.0.iter().map(Run::len).sum()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Run> {
        self.0.iter()
    }

    /// Every covered integer in ascending order.
    pub fn flatten(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().flat_map(|run| run.start()..=run.end())
    }
}

impl fmt::Display for RunList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, run) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{run}")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a RunList {
    type Item = &'a Run;
    type IntoIter = std::slice::Iter<'a, Run>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Parses the rendered form back, e.g. `"1-3, 5, 7-9"`.
///
/// The parsed items are re-summarized, so `"1, 2, 3"` yields `1-3`.
impl FromStr for RunList {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut nums = Vec::new();
        for item in s.split(',').map(str::trim).filter(|item| !item.is_empty()) {
            let (start, end) = match item.split_once('-') {
                Some((a, b)) => (parse_bound(s, a)?, parse_bound(s, b)?),
                None => {
                    let n = parse_bound(s, item)?;
                    (n, n)
                }
            };
            if end < start {
                return Err(Error::parse(s, format!("descending run {item:?}")));
            }
            nums.extend(start..=end);
        }
        Ok(summarize(nums))
    }
}

fn parse_bound(input: &str, token: &str) -> Result<u32> {
    token
        .trim()
        .parse::<u32>()
        .map_err(|e| Error::parse(input, format!("{token:?}: {e}")))
}

/// Summarize integers into maximal contiguous runs.
///
/// Input order does not matter and duplicates collapse.
///
/// # Examples
///
/// ```
/// use seqforge_common::runs::{summarize, Run};
///
/// let runs = summarize([90u32, 12, 45, 46, 47, 48, 49, 50, 51, 52, 12]);
/// assert_eq!(runs.runs(), &[Run::Single(12), Run::Span(45, 52), Run::Single(90)]);
/// assert_eq!(runs.to_string(), "12, 45-52, 90");
/// ```
pub fn summarize<I>(nums: I) -> RunList
where
    I: IntoIterator,
    I::Item: Into<u32>,
{
    let mut sorted: Vec<u32> = nums.into_iter().map(Into::into).collect();
    sorted.sort_unstable();
    sorted.dedup();

    let mut runs = Vec::new();
    let mut iter = sorted.into_iter();
    let Some(first) = iter.next() else {
        return RunList(runs);
    };

    let (mut start, mut end) = (first, first);
    for n in iter {
        if end.checked_add(1) == Some(n) {
            end = n;
        } else {
            runs.push(Run::from_bounds(start, end));
            start = n;
            end = n;
        }
    }
    runs.push(Run::from_bounds(start, end));

    RunList(runs)
}

/// Summarize a sorted, duplicate-free stream without buffering it.
///
/// Used where the caller already produces numbers in ascending order (a
/// range scan), so the full set never has to be materialized.
#[derive(Debug, Default)]
pub struct RunBuilder {
    runs: Vec<Run>,
    current: Option<(u32, u32)>,
}

impl RunBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the next number. Numbers must arrive strictly ascending;
    /// anything else is ignored.
    pub fn push(&mut self, n: u32) {
        match self.current {
            None => self.current = Some((n, n)),
            Some((start, end)) if end.checked_add(1) == Some(n) => {
                self.current = Some((start, n));
            }
            Some((_, end)) if n <= end => {}
            Some((start, end)) => {
                self.runs.push(Run::from_bounds(start, end));
                self.current = Some((n, n));
            }
        }
    }

    pub fn finish(mut self) -> RunList {
        if let Some((start, end)) = self.current.take() {
            self.runs.push(Run::from_bounds(start, end));
        }
        RunList(self.runs)
    }
}
