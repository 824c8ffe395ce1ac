//! External tool detection and management.

use crate::{Error, Result};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Tools the batch job shells out to, the argument that makes each one
/// print a version banner, and the commands that need it.
const KNOWN_TOOLS: &[(&str, &str, &str)] = &[
    ("tar", "--version", "check, extract"),
    ("zip", "-v", "archive"),
    ("split", "--version", "archive --numbered"),
    ("pngcheck", "-h", "check --integrity"),
    ("ffmpeg", "-version", "movies"),
    ("gm", "version", "sheets"),
];

/// Commands that need `name`, if it is a known tool.
pub fn used_by(name: &str) -> Option<&'static str> {
    KNOWN_TOOLS
        .iter()
        .find(|(tool, _, _)| *tool == name)
        .map(|(_, _, commands)| *commands)
}

/// Information about an external tool.
#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    /// Name of the tool.
    pub name: String,
    /// Whether the tool is available.
    pub available: bool,
    /// Version string if available.
    pub version: Option<String>,
    /// Path to the tool executable.
    pub path: Option<PathBuf>,
}

/// One status line: mark, name, the commands that need it, then the
/// version banner and path or `not found`.
impl fmt::Display for ToolInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = if self.available { '✓' } else { '✗' };
        write!(f, "{} {}", mark, self.name)?;
        if let Some(commands) = used_by(&self.name) {
            write!(f, " [{}]", commands)?;
        }
        match (&self.path, &self.version) {
            (Some(path), Some(version)) => write!(f, ": {} ({})", path.display(), version),
            (Some(path), None) => write!(f, ": {}", path.display()),
            (None, _) => write!(f, ": not found"),
        }
    }
}

/// Check if a tool is available and get its information.
///
/// # Example
///
/// ```no_run
/// use seqforge_av::check_tool;
///
/// let info = check_tool("pngcheck");
/// if info.available {
///     println!("pngcheck at {:?}", info.path);
/// }
/// ```
pub fn check_tool(name: &str) -> ToolInfo {
    let version_arg = KNOWN_TOOLS
        .iter()
        .find(|(tool, _, _)| *tool == name)
        .map(|(_, arg, _)| *arg)
        .unwrap_or("--version");
    check_tool_with_arg(name, version_arg)
}

/// Check if a tool is available using a custom version argument.
///
/// Availability is decided by a `PATH` lookup. Not every tool has a version
/// flag (BSD `split` has none), so a failing version probe only leaves
/// `version` empty.
pub fn check_tool_with_arg(name: &str, version_arg: &str) -> ToolInfo {
    match which::which(name) {
        Ok(path) => ToolInfo {
            name: name.to_string(),
            available: true,
            version: detect_version(&path, version_arg),
            path: Some(path),
        },
        Err(_) => ToolInfo {
            name: name.to_string(),
            available: false,
            version: None,
            path: None,
        },
    }
}

/// Check every tool the batch job may call.
///
/// Returns information about tar, zip, split, pngcheck, ffmpeg and gm.
pub fn check_tools() -> Vec<ToolInfo> {
    KNOWN_TOOLS
        .iter()
        .map(|(name, arg, _)| check_tool_with_arg(name, arg))
        .collect()
}

/// Require that a tool is available, returning its path.
///
/// # Errors
///
/// Returns an error if the tool is not found.
pub fn require_tool(name: &str) -> Result<PathBuf> {
    which::which(name).map_err(|_| Error::tool_not_found(name))
}

/// Get the path to a tool, preferring a configured path over PATH lookup.
pub fn get_tool_path(name: &str, config_path: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = config_path {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        tracing::warn!(
            "Configured path for {} does not exist: {:?}, falling back to PATH",
            name,
            path
        );
    }

    require_tool(name)
}

fn detect_version(path: &Path, version_arg: &str) -> Option<String> {
    let output = Command::new(path)
        .arg(version_arg)
        .stdin(Stdio::null())
        .output()
        .ok()?;

    // Some tools (pngcheck, zip) print their banner on stderr or exit non-zero
    // from a help flag; take the first non-empty line from either stream.
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    stdout
        .lines()
        .chain(stderr.lines())
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(|line| line.to_string())
}
