//! Error taxonomy of a batch run.
//!
//! Per-item problems found while scanning (a corrupt PNG, an unparseable
//! image name) are accumulated in reports and never surface here. These
//! variants are the failures that stop a run: bad setup, a failed split,
//! or a user interrupt.

/// Errors that abort a seqforge command.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A name or token does not match the dataset conventions.
    #[error("Parse error: {input:?}: {message}")]
    Parse { input: String, message: String },

    /// Expected range bounds are inconsistent.
    #[error("Invalid range: high {high} is below low {low}")]
    Range { low: u32, high: u32 },

    /// A required external tool is missing.
    #[error("Tool not found: {tool}")]
    ToolNotFound { tool: String },

    /// An external tool failed.
    #[error("Tool failed: {tool}: {message}")]
    Tool {
        tool: String,
        code: Option<i32>,
        message: String,
    },

    /// Splitting an archive target failed; partial parts are left on disk.
    #[error("Archiving {target} failed (exit code {}): {message}", display_code(.code))]
    Archive {
        target: String,
        code: Option<i32>,
        message: String,
    },

    /// The user interrupted the run.
    #[error("Cancelled")]
    Cancelled,

    /// Invalid input was provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn display_code(code: &Option<i32>) -> String {
    code.map(|c| c.to_string())
        .unwrap_or_else(|| "none".to_string())
}

impl Error {
    /// Create a new InvalidInput error.
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Re-tag a tool failure as the failure of one archive target.
    pub fn for_archive_target(self, target: impl Into<String>) -> Self {
        match self {
            Self::Tool { code, message, .. } => Self::Archive {
                target: target.into(),
                code,
                message,
            },
            other => other,
        }
    }
}

impl From<seqforge_common::Error> for Error {
    fn from(err: seqforge_common::Error) -> Self {
        match err {
            seqforge_common::Error::Parse { input, message } => Self::Parse { input, message },
            seqforge_common::Error::Range { low, high } => Self::Range { low, high },
            seqforge_common::Error::Io(e) => Self::Io(e),
            seqforge_common::Error::InvalidInput(msg) => Self::InvalidInput(msg),
        }
    }
}

impl From<seqforge_av::Error> for Error {
    fn from(err: seqforge_av::Error) -> Self {
        match err {
            seqforge_av::Error::Cancelled { .. } => Self::Cancelled,
            seqforge_av::Error::ToolNotFound { tool } => Self::ToolNotFound { tool },
            seqforge_av::Error::ToolFailed {
                tool,
                code,
                message,
            } => Self::Tool {
                tool,
                code,
                message,
            },
            seqforge_av::Error::FileNotFound { path } => {
                Self::InvalidInput(format!("file not found: {}", path.display()))
            }
            seqforge_av::Error::Io(e) => Self::Io(e),
            seqforge_av::Error::InvalidInput(msg) => Self::InvalidInput(msg),
        }
    }
}

/// Result type alias for seqforge operations.
pub type Result<T> = std::result::Result<T, Error>;
