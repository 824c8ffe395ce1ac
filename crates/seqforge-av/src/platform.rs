//! Userland conventions of the host's command-line tools.
//!
//! BSD userlands (macOS) and GNU coreutils disagree on a couple of flags this
//! tool depends on. The descriptor is resolved once at startup and handed to
//! whatever needs it, instead of branching on the OS at each call site.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Flavour of the host's `tar` and `split`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// BSD tools: `split -d` numbers parts from `000`, `tar -k` keeps files.
    Bsd,
    /// GNU tools: `split --numeric-suffixes=1` numbers from `001`.
    Gnu,
}

impl Platform {
    /// Descriptor for the platform this binary was built for.
    pub fn current() -> Self {
        if cfg!(any(
            target_os = "macos",
            target_os = "ios",
            target_os = "freebsd",
            target_os = "openbsd",
            target_os = "netbsd",
            target_os = "dragonfly"
        )) {
            Platform::Bsd
        } else {
            Platform::Gnu
        }
    }

    /// First numeric suffix `split` emits.
    pub fn split_start_index(&self) -> u32 {
        match self {
            Platform::Bsd => 0,
            Platform::Gnu => 1,
        }
    }

    /// Flags that make `split` emit numeric suffixes.
    pub fn split_numeric_args(&self) -> &'static [&'static str] {
        match self {
            Platform::Bsd => &["-d"],
            Platform::Gnu => &["--numeric-suffixes=1"],
        }
    }

    /// `tar` flag that skips members already present on disk.
    pub fn tar_keep_old_flag(&self) -> &'static str {
        match self {
            Platform::Bsd => "-k",
            Platform::Gnu => "--skip-old-files",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Bsd => write!(f, "bsd"),
            Platform::Gnu => write!(f, "gnu"),
        }
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bsd" | "darwin" | "macos" => Ok(Platform::Bsd),
            "gnu" | "linux" => Ok(Platform::Gnu),
            _ => Err(format!("Unknown platform: {}", s)),
        }
    }
}
