//! # seqforge-av
//!
//! The external-tool boundary of seqforge.
//!
//! This crate provides functionality for:
//! - Discovering tar, zip, split, pngcheck, ffmpeg and graphicsmagick
//! - Running them as blocking, cancellable child processes ([`ToolCommand`],
//!   [`Pipeline`])
//! - Selecting userland conventions once per run ([`Platform`])
//! - Thin wrappers for tar extraction, contact sheets and movie encoding
//!   ([`actions`])
//!
//! ## Example
//!
//! ```no_run
//! use seqforge_av::{require_tool, CancelToken, ToolCommand};
//!
//! let pngcheck = require_tool("pngcheck")?;
//! let status = ToolCommand::new(pngcheck)
//!     .arg("/data/images/0001.png")
//!     .discard_stdout()
//!     .status(&CancelToken::new())?;
//! println!("valid: {}", status.success());
//! # Ok::<(), seqforge_av::Error>(())
//! ```

pub mod actions;
mod cancel;
pub mod command;
mod error;
pub mod platform;
pub mod tools;

// Re-exports
pub use cancel::CancelToken;
pub use command::{OutputMode, Pipeline, ToolCommand, ToolOutput};
pub use error::{Error, Result};
pub use platform::Platform;
pub use tools::{check_tool, check_tools, get_tool_path, require_tool, ToolInfo};
