//! Existence scans of an observed collection over an expected range.

use seqforge_common::runs::RunBuilder;
use seqforge_common::{parse_sequence_number, ArtifactKind, ExpectedRange, RunList};
use std::collections::{BTreeSet, HashSet};
use tracing::warn;

/// Set-like view of observed numbers.
pub trait Membership {
    fn contains_number(&self, n: u32) -> bool;
}

impl Membership for HashSet<u32> {
    fn contains_number(&self, n: u32) -> bool {
        self.contains(&n)
    }
}

impl Membership for BTreeSet<u32> {
    fn contains_number(&self, n: u32) -> bool {
        self.contains(&n)
    }
}

/// A sorted, duplicate-free slice, searched by bisection.
impl Membership for [u32] {
    fn contains_number(&self, n: u32) -> bool {
        self.binary_search(&n).is_ok()
    }
}

/// Membership over a sorted list of names, probing `<prefix><n:0width><suffix>`.
///
/// Lets a frame group be scanned without parsing every name first.
#[derive(Debug, Clone, Copy)]
pub struct NameIndex<'a> {
    names: &'a [String],
    prefix: &'a str,
    suffix: &'a str,
    width: usize,
}

impl<'a> NameIndex<'a> {
    /// `names` must be sorted.
    pub fn new(names: &'a [String], prefix: &'a str, suffix: &'a str, width: usize) -> Self {
        Self {
            names,
            prefix,
            suffix,
            width,
        }
    }
}

impl Membership for NameIndex<'_> {
    fn contains_number(&self, n: u32) -> bool {
        let name = format!("{}{:0width$}{}", self.prefix, n, self.suffix, width = self.width);
        self.names
            .binary_search_by(|probe| probe.as_str().cmp(name.as_str()))
            .is_ok()
    }
}

/// Whether every number of `range` is present. Extras outside the range do
/// not matter.
pub fn is_complete<M: Membership + ?Sized>(observed: &M, range: &ExpectedRange) -> bool {
    range.iter().all(|n| observed.contains_number(n))
}

/// Absent numbers of `range` as runs.
pub fn missing<M: Membership + ?Sized>(observed: &M, range: &ExpectedRange) -> RunList {
    let mut runs = RunBuilder::new();
    for n in range.iter().filter(|&n| !observed.contains_number(n)) {
        runs.push(n);
    }
    runs.finish()
}

/// Two kinds track each other iff their run lists are identical.
pub fn runs_match(a: &RunList, b: &RunList) -> bool {
    a == b
}

/// Sequence numbers parsed out of the names of one artifact kind.
#[derive(Debug, Clone, Default)]
pub struct ObservedSet {
    numbers: BTreeSet<u32>,
    unparseable: Vec<String>,
}

impl ObservedSet {
    /// Collect the names under `kind`'s directory. Duplicates collapse;
    /// names that do not parse are kept aside and scanning goes on.
    pub fn collect<'a, I>(names: I, kind: ArtifactKind) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let prefix = kind.prefix();
        let mut set = Self::default();
        for name in names.into_iter().filter(|name| name.starts_with(&prefix)) {
            match parse_sequence_number(name, &prefix, kind.suffix()) {
                Ok(seq) => {
                    set.numbers.insert(seq.get());
                }
                Err(e) => {
                    warn!("Skipping {} name: {}", kind, e);
                    set.unparseable.push(name.to_string());
                }
            }
        }
        set
    }

    pub fn from_numbers(numbers: impl IntoIterator<Item = u32>) -> Self {
        Self {
            numbers: numbers.into_iter().collect(),
            unparseable: Vec::new(),
        }
    }

    /// Count of distinct numbers.
    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }

    pub fn numbers(&self) -> &BTreeSet<u32> {
        &self.numbers
    }

    pub fn unparseable(&self) -> &[String] {
        &self.unparseable
    }

    /// Every observed number as runs.
    pub fn runs(&self) -> RunList {
        let mut runs = RunBuilder::new();
        for &n in &self.numbers {
            runs.push(n);
        }
        runs.finish()
    }

    /// Observed numbers outside `range`.
    pub fn out_of_range(&self, range: &ExpectedRange) -> RunList {
        let mut runs = RunBuilder::new();
        for &n in self.numbers.iter().filter(|&&n| !range.contains(n)) {
            runs.push(n);
        }
        runs.finish()
    }
}

impl Membership for ObservedSet {
    fn contains_number(&self, n: u32) -> bool {
        self.numbers.contains(&n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn range(low: u32, high: u32) -> ExpectedRange {
        ExpectedRange::new(low, high).unwrap()
    }

    #[test]
    fn test_gap_in_range() {
        let observed = ObservedSet::from_numbers([1, 2, 3, 5, 6, 7, 8, 9, 10]);
        let r = range(1, 10);
        assert!(!is_complete(&observed, &r));
        assert_eq!(observed.runs().to_string(), "1-3, 5-10");
        assert_eq!(missing(&observed, &r).to_string(), "4");
    }

    #[test]
    fn test_extras_do_not_break_completeness() {
        let observed = ObservedSet::from_numbers([0, 1, 2, 3, 4, 12]);
        let r = range(1, 4);
        assert!(is_complete(&observed, &r));
        assert!(missing(&observed, &r).is_empty());
        assert_eq!(observed.out_of_range(&r).to_string(), "0, 12");
    }

    #[test]
    fn test_collect_names() {
        let names = [
            "images/0001.png",
            "images/0002.png",
            "images/0002.png",
            "images/thumb.png",
            "metadata/0001.json",
        ];
        let images = ObservedSet::collect(names, ArtifactKind::Image);
        assert_eq!(images.len(), 2);
        assert_eq!(images.unparseable(), ["images/thumb.png"]);

        let meta = ObservedSet::collect(names, ArtifactKind::Metadata);
        assert_eq!(meta.numbers().iter().copied().collect::<Vec<_>>(), [1]);
    }

    #[test]
    fn test_name_index() {
        let names: Vec<String> = ["frames/0007/0007_0000.png", "frames/0007/0007_0001.png"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let index = NameIndex::new(&names, "frames/0007/0007_", ".png", 4);
        assert!(is_complete(&index, &range(0, 1)));
        assert!(!is_complete(&index, &range(0, 2)));
    }

    #[test]
    fn test_sorted_slice_membership() {
        let nums: &[u32] = &[1, 2, 4];
        assert!(nums.contains_number(4));
        assert_eq!(missing(nums, &range(1, 5)).to_string(), "3, 5");
    }

    #[test]
    fn test_runs_match_is_exact() {
        let a = ObservedSet::from_numbers([1, 2, 3]).runs();
        let b = ObservedSet::from_numbers([1, 2, 3]).runs();
        let c = ObservedSet::from_numbers([1, 3]).runs();
        assert!(runs_match(&a, &b));
        assert!(!runs_match(&a, &c));
        assert!(!runs_match(&c, &a));
    }

    proptest! {
        #[test]
        fn prop_complete_iff_all_present(
            nums in proptest::collection::btree_set(0u32..60, 0..60),
            low in 0u32..30,
            len in 0u32..30,
        ) {
            let r = range(low, low + len);
            let expected = r.iter().all(|n| nums.contains(&n));
            prop_assert_eq!(is_complete(&nums, &r), expected);
            prop_assert_eq!(missing(&nums, &r).is_empty(), expected);
        }
    }
}
