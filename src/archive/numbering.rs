//! Part naming of numbered archives.
//!
//! `split` names parts `<archive>.NNN`. Depending on the platform the first
//! part is `000` or `001`; output is normalized so a target always ends up
//! as either a lone `<target>.zip` or `.001`, `.002`, ….

use crate::Result;
use seqforge_av::Platform;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Digits of a numbered part suffix.
pub const SUFFIX_WIDTH: usize = 3;

/// How parts written by `split` must be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartNumbering {
    /// Parts already start at `001`.
    OneBased,
    /// Parts start at `000` and are shifted up by one.
    ZeroBased,
}

impl PartNumbering {
    pub fn for_platform(platform: Platform) -> Self {
        match platform.split_start_index() {
            0 => PartNumbering::ZeroBased,
            _ => PartNumbering::OneBased,
        }
    }
}

/// One numbered part on disk.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Part {
    pub index: u32,
    pub path: PathBuf,
}

/// A pending rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rename {
    pub from: PathBuf,
    pub to: PathBuf,
}

fn part_path(archive: &Path, index: u32) -> PathBuf {
    let mut name = archive.as_os_str().to_os_string();
    name.push(format!(".{:0width$}", index, width = SUFFIX_WIDTH));
    PathBuf::from(name)
}

/// Numbered parts of `archive`, sorted by index.
///
/// Only names of the form `<archive>.<digits>` count.
pub fn find_parts(archive: &Path) -> Result<Vec<Part>> {
    let (Some(dir), Some(stem)) = (archive.parent(), archive.file_name()) else {
        return Ok(Vec::new());
    };
    let dir = if dir.as_os_str().is_empty() {
        Path::new(".")
    } else {
        dir
    };
    let stem = stem.to_string_lossy();
    let prefix = format!("{stem}.");

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut parts = Vec::new();
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        let Some(suffix) = name.to_str().and_then(|n| n.strip_prefix(&prefix)) else {
            continue;
        };
        if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
            continue;
        }
        if let Ok(index) = suffix.parse::<u32>() {
            parts.push(Part {
                index,
                path: dir.join(&name),
            });
        }
    }
    parts.sort();
    Ok(parts)
}

/// Renames that bring `parts` into final form.
///
/// A single part loses its suffix. Zero-based parts are shifted up by one,
/// highest index first, so no rename targets a part that has not moved yet.
pub fn plan(archive: &Path, parts: &[Part], numbering: PartNumbering) -> Vec<Rename> {
    if let [only] = parts {
        return vec![Rename {
            from: only.path.clone(),
            to: archive.to_path_buf(),
        }];
    }
    if numbering == PartNumbering::OneBased {
        return Vec::new();
    }

    let mut sorted: Vec<&Part> = parts.iter().collect();
    sorted.sort_by(|a, b| b.index.cmp(&a.index));
    sorted
        .into_iter()
        .map(|part| Rename {
            from: part.path.clone(),
            to: part_path(archive, part.index + 1),
        })
        .collect()
}

/// Bring the parts of `archive` into final form and return the final paths.
pub fn normalize(archive: &Path, numbering: PartNumbering) -> Result<Vec<PathBuf>> {
    let parts = find_parts(archive)?;
    let renames = plan(archive, &parts, numbering);

    for rename in &renames {
        debug!("Renaming {:?} -> {:?}", rename.from, rename.to);
        fs::rename(&rename.from, &rename.to)?;
    }

    if renames.len() == 1 && parts.len() == 1 {
        return Ok(vec![archive.to_path_buf()]);
    }
    Ok(find_parts(archive)?.into_iter().map(|p| p.path).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn parts(archive: &Path, indices: &[u32]) -> Vec<Part> {
        indices
            .iter()
            .map(|&index| Part {
                index,
                path: part_path(archive, index),
            })
            .collect()
    }

    #[test]
    fn test_numbering_from_platform() {
        assert_eq!(
            PartNumbering::for_platform(Platform::Bsd),
            PartNumbering::ZeroBased
        );
        assert_eq!(
            PartNumbering::for_platform(Platform::Gnu),
            PartNumbering::OneBased
        );
    }

    #[test]
    fn test_single_part_loses_suffix() {
        let archive = Path::new("out/images.zip");
        for numbering in [PartNumbering::ZeroBased, PartNumbering::OneBased] {
            let plan = plan(archive, &parts(archive, &[0]), numbering);
            assert_eq!(
                plan,
                [Rename {
                    from: PathBuf::from("out/images.zip.000"),
                    to: PathBuf::from("out/images.zip"),
                }]
            );
        }
    }

    #[test]
    fn test_zero_based_shift_descending() {
        let archive = Path::new("out/frames.zip");
        let plan = plan(archive, &parts(archive, &[0, 1, 2]), PartNumbering::ZeroBased);
        let pairs: Vec<(String, String)> = plan
            .iter()
            .map(|r| {
                (
                    r.from.display().to_string(),
                    r.to.display().to_string(),
                )
            })
            .collect();
        assert_eq!(
            pairs,
            [
                ("out/frames.zip.002".into(), "out/frames.zip.003".into()),
                ("out/frames.zip.001".into(), "out/frames.zip.002".into()),
                ("out/frames.zip.000".into(), "out/frames.zip.001".into()),
            ]
        );
    }

    #[test]
    fn test_plan_never_clobbers() {
        let archive = Path::new("frames.zip");
        let indices: Vec<u32> = (0..12).collect();
        let plan = plan(archive, &parts(archive, &indices), PartNumbering::ZeroBased);

        // Replay the renames over a set of names.
        let mut on_disk: HashSet<PathBuf> = parts(archive, &indices)
            .into_iter()
            .map(|p| p.path)
            .collect();
        for rename in &plan {
            assert!(!on_disk.contains(&rename.to), "{:?} clobbered", rename.to);
            assert!(on_disk.remove(&rename.from));
            on_disk.insert(rename.to.clone());
        }
        let expected: HashSet<PathBuf> = (1..=12).map(|i| part_path(archive, i)).collect();
        assert_eq!(on_disk, expected);
    }

    #[test]
    fn test_one_based_left_alone() {
        let archive = Path::new("images.zip");
        assert!(plan(archive, &parts(archive, &[1, 2]), PartNumbering::OneBased).is_empty());
    }

    #[test]
    fn test_normalize_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("frames.zip");
        for i in 0..3 {
            fs::write(part_path(&archive, i), format!("part {i}")).unwrap();
        }
        fs::write(dir.path().join("frames.zip.tmp"), b"x").unwrap();

        let out = normalize(&archive, PartNumbering::ZeroBased).unwrap();
        assert_eq!(
            out,
            [
                part_path(&archive, 1),
                part_path(&archive, 2),
                part_path(&archive, 3)
            ]
        );
        assert_eq!(
            fs::read_to_string(part_path(&archive, 1)).unwrap(),
            "part 0"
        );
        assert_eq!(
            fs::read_to_string(part_path(&archive, 3)).unwrap(),
            "part 2"
        );
        assert!(!part_path(&archive, 0).exists());
    }

    #[test]
    fn test_normalize_single() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("meta.zip");
        fs::write(part_path(&archive, 1), b"only").unwrap();

        let out = normalize(&archive, PartNumbering::OneBased).unwrap();
        assert_eq!(out, [archive.clone()]);
        assert_eq!(fs::read(&archive).unwrap(), b"only");
    }
}
