//! Check results and their text rendering.

use super::integrity::{FrameIntegrity, IntegrityReport};
use chrono::{DateTime, Utc};
use seqforge_common::{ArtifactKind, ExpectedRange, RunList};
use serde::Serialize;
use std::fmt::Write;

/// Full result of one check invocation.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub generated_at: DateTime<Utc>,
    /// Folder the listing came from.
    pub source: String,
    pub range: ExpectedRange,
    pub frames_per_sequence: u32,
    pub total_files: usize,
    pub kinds: Vec<KindReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct KindReport {
    pub kind: ArtifactKind,
    /// Files of this kind in the listing.
    pub count: usize,
    #[serde(flatten)]
    pub status: KindStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum KindStatus {
    /// No items of this kind; nothing was scanned.
    Empty,
    Checked(Coverage),
}

#[derive(Debug, Clone, Serialize)]
pub struct Coverage {
    pub complete: bool,
    /// Observed numbers, or complete animations for frames.
    pub runs: RunList,
    pub missing: RunList,
    #[serde(skip_serializing_if = "RunList::is_empty")]
    pub out_of_range: RunList,
    /// Whether `runs` equals the image runs; `None` for images themselves.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matches_images: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unparseable: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anims: Option<AnimCounts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub integrity: Option<Integrity>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnimCounts {
    pub complete: u64,
    pub incomplete: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Integrity {
    Files(IntegrityReport),
    Frames(FrameIntegrity),
}

impl Integrity {
    pub fn is_verified(&self) -> bool {
        match self {
            Integrity::Files(report) => report.is_verified(),
            Integrity::Frames(frames) => frames.is_verified(),
        }
    }
}

impl CheckReport {
    pub fn kind(&self, kind: ArtifactKind) -> Option<&KindReport> {
        self.kinds.iter().find(|k| k.kind == kind)
    }

    /// Coverage of a kind, if it had any items.
    pub fn coverage(&self, kind: ArtifactKind) -> Option<&Coverage> {
        match self.kind(kind).map(|k| &k.status) {
            Some(KindStatus::Checked(coverage)) => Some(coverage),
            _ => None,
        }
    }

    /// Every kind present, complete, matching images and intact.
    pub fn is_clean(&self) -> bool {
        self.kinds.iter().all(|k| match &k.status {
            KindStatus::Empty => false,
            KindStatus::Checked(c) => {
                c.complete
                    && c.matches_images.unwrap_or(true)
                    && c.integrity.as_ref().map_or(true, Integrity::is_verified)
            }
        })
    }

    /// Human-readable report. Run lists longer than `run_limit` runs are
    /// shown as a count only.
    pub fn render(&self, run_limit: usize) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Checking {} files", self.total_files);
        for kind in &self.kinds {
            render_kind(&mut out, kind, run_limit);
        }
        out
    }
}

fn run_noun(kind: ArtifactKind) -> &'static str {
    match kind {
        ArtifactKind::Image => "image",
        ArtifactKind::Metadata => "metadata",
        ArtifactKind::Frame => "anim",
    }
}

fn count_line(kind: ArtifactKind, count: usize) -> String {
    match kind {
        ArtifactKind::Metadata => format!("{count} metadata files"),
        _ => format!("{count} {}", kind.noun()),
    }
}

fn render_runs(out: &mut String, lead: String, runs: &RunList, run_limit: usize) {
    let _ = write!(out, "   {lead}");
    if runs.len() <= run_limit {
        let _ = write!(out, ": {runs}");
    }
    out.push('\n');
}

fn render_kind(out: &mut String, report: &KindReport, run_limit: usize) {
    let kind = report.kind;
    let noun = kind.noun();
    let _ = writeln!(out, "{}", count_line(kind, report.count));

    let coverage = match &report.status {
        KindStatus::Empty => {
            let _ = writeln!(out, "   NO {noun}");
            return;
        }
        KindStatus::Checked(coverage) => coverage,
    };

    if let Some(anims) = coverage.anims {
        let _ = writeln!(
            out,
            "   {} complete anims, {} incomplete",
            anims.complete, anims.incomplete
        );
    }

    let verdict = if coverage.complete { "COMPLETE" } else { "NOT complete" };
    let _ = writeln!(out, "   {noun} {verdict}");

    if let Some(matches) = coverage.matches_images {
        let line = match (kind, matches) {
            (ArtifactKind::Frame, true) => "complete anims MATCH images".to_string(),
            (ArtifactKind::Frame, false) => "complete anims DON'T match images".to_string(),
            (_, true) => format!("{noun} MATCHES images"),
            (_, false) => format!("{noun} NOT matching images"),
        };
        let _ = writeln!(out, "   {line}");
    }

    let runs = &coverage.runs;
    let lead = format!("{} {} runs", runs.len(), run_noun(kind));
    render_runs(out, lead, runs, run_limit);

    for (what, runs) in [
        ("missing", &coverage.missing),
        ("out of range", &coverage.out_of_range),
    ] {
        if !runs.is_empty() {
            let lead = format!("{} {what} in {} runs", runs.count(), runs.len());
            render_runs(out, lead, runs, run_limit);
        }
    }
    if !coverage.unparseable.is_empty() {
        let _ = writeln!(
            out,
            "   {} unparseable name(s): {}",
            coverage.unparseable.len(),
            coverage.unparseable.join(", ")
        );
    }

    if let Some(integrity) = &coverage.integrity {
        render_integrity(out, kind, integrity);
    }
}

fn render_integrity(out: &mut String, kind: ArtifactKind, integrity: &Integrity) {
    if integrity.is_verified() {
        let _ = writeln!(out, "   {kind} integrity VERIFIED");
        return;
    }
    let _ = writeln!(out, "   {kind} integrity NOT verified");
    match integrity {
        Integrity::Files(report) => {
            let _ = writeln!(out, "   {} error(s):", report.corrupt.len());
            let names: Vec<String> = report
                .corrupt
                .iter()
                .map(|p| p.display().to_string())
                .collect();
            let _ = writeln!(out, "   {}", names.join(", "));
        }
        Integrity::Frames(frames) => {
            let _ = writeln!(out, "   {} animations with error(s):", frames.corrupt.len());
            let seqs: Vec<String> = frames.corrupt.iter().map(|s| s.to_string()).collect();
            let _ = writeln!(out, "   {}", seqs.join(", "));
            let names: Vec<String> = frames
                .corrupt_frames
                .iter()
                .map(|p| p.display().to_string())
                .collect();
            let _ = writeln!(out, "   {}", names.join(", "));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seqforge_common::runs::summarize;

    fn report(kinds: Vec<KindReport>) -> CheckReport {
        CheckReport {
            generated_at: Utc::now(),
            source: "dataset".to_string(),
            range: ExpectedRange::one_based(10).unwrap(),
            frames_per_sequence: 300,
            total_files: 9,
            kinds,
        }
    }

    fn images(runs: RunList, missing: RunList) -> KindReport {
        KindReport {
            kind: ArtifactKind::Image,
            count: runs.count() as usize,
            status: KindStatus::Checked(Coverage {
                complete: missing.is_empty(),
                runs,
                missing,
                out_of_range: RunList::default(),
                matches_images: None,
                unparseable: Vec::new(),
                anims: None,
                integrity: None,
            }),
        }
    }

    #[test]
    fn test_render_gap() {
        let r = report(vec![images(
            summarize([1u32, 2, 3, 5, 6, 7, 8, 9, 10]),
            summarize([4u32]),
        )]);
        let text = r.render(100);
        assert!(text.contains("9 images\n"));
        assert!(text.contains("   images NOT complete\n"));
        assert!(text.contains("   2 image runs: 1-3, 5-10\n"));
        assert!(text.contains("   1 missing in 1 runs: 4\n"));
        assert!(!r.is_clean());
    }

    #[test]
    fn test_render_suppresses_long_lists() {
        let odd: Vec<u32> = (1..=20).filter(|n| n % 2 == 1).collect();
        let r = report(vec![images(summarize(odd), RunList::default())]);
        let text = r.render(5);
        assert!(text.contains("   10 image runs\n"));
        assert!(!text.contains("1, 3, 5"));
    }

    #[test]
    fn test_render_empty_kind() {
        let r = report(vec![KindReport {
            kind: ArtifactKind::Metadata,
            count: 0,
            status: KindStatus::Empty,
        }]);
        let text = r.render(100);
        assert!(text.contains("0 metadata files\n   NO metadata\n"));
        assert!(!text.contains("COMPLETE"));
    }

    #[test]
    fn test_json_shape() {
        let r = report(vec![images(summarize([1u32, 2, 3, 5]), summarize([4u32]))]);
        let json = serde_json::to_value(&r).unwrap();
        let kind = &json["kinds"][0];
        assert_eq!(kind["kind"], "image");
        assert_eq!(kind["status"], "checked");
        assert_eq!(kind["runs"], serde_json::json!([[1, 3], 5]));
        assert_eq!(kind["missing"], serde_json::json!([4]));
        assert!(kind.get("out_of_range").is_none());
    }
}
