//! Tar listing and extraction.

use crate::{CancelToken, Platform, Result, ToolCommand};
use std::path::Path;

/// Options for [`extract`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractOptions {
    /// List members while extracting (`tar v`).
    pub verbose: bool,
    /// Never overwrite files already on disk.
    pub keep_old: bool,
}

/// Member names of one tar archive, in archive order.
///
/// Directory entries are skipped and a leading `./` is stripped, so names
/// line up with a filesystem listing of the extracted tree.
pub fn list_members(tar: &Path, archive: &Path, cancel: &CancelToken) -> Result<Vec<String>> {
    let output = ToolCommand::new(tar)
        .arg("-tf")
        .arg(archive)
        .capture()
        .execute(cancel)?;

    Ok(output
        .stdout
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .map(|line| line.strip_prefix("./").unwrap_or(line))
        .filter(|name| !name.is_empty() && !name.ends_with('/'))
        .map(str::to_string)
        .collect())
}

/// Extract `archive` into `dest`.
///
/// `tar` overwrites by default; `keep_old` uses the platform's flag to skip
/// existing files instead.
pub fn extract(
    tar: &Path,
    archive: &Path,
    dest: &Path,
    options: ExtractOptions,
    platform: Platform,
    cancel: &CancelToken,
) -> Result<()> {
    let mut cmd = ToolCommand::new(tar);
    cmd.arg(if options.verbose { "-xvf" } else { "-xf" }).arg(archive);
    if options.keep_old {
        cmd.arg(platform.tar_keep_old_flag());
    }
    cmd.arg("--directory").arg(dest);

    tracing::debug!("Extracting {:?} -> {:?}", archive, dest);
    cmd.execute(cancel)?;
    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;

    fn tar_available() -> bool {
        which::which("tar").is_ok()
    }

    #[test]
    fn test_list_and_extract_roundtrip() {
        if !tar_available() {
            eprintln!("Skipping: tar not installed");
            return;
        }
        let src = tempfile::tempdir().unwrap();
        fs::create_dir_all(src.path().join("images")).unwrap();
        fs::write(src.path().join("images/0001.png"), b"png").unwrap();
        fs::write(src.path().join("images/0002.png"), b"png").unwrap();

        let archive = src.path().join("batch.tar");
        let tar = which::which("tar").unwrap();
        ToolCommand::new(&tar)
            .current_dir(src.path())
            .args(["-cf", "batch.tar", "images"])
            .execute(&CancelToken::new())
            .unwrap();

        let mut names = list_members(&tar, &archive, &CancelToken::new()).unwrap();
        names.sort();
        assert_eq!(names, ["images/0001.png", "images/0002.png"]);

        let dest = tempfile::tempdir().unwrap();
        extract(
            &tar,
            &archive,
            dest.path(),
            ExtractOptions::default(),
            Platform::current(),
            &CancelToken::new(),
        )
        .unwrap();
        assert!(dest.path().join("images/0002.png").is_file());
    }
}
