//! Common error types used throughout seqforge.
//!
//! Parse failures are per-item and recoverable by callers; range failures
//! are setup errors raised before any scanning starts.

/// Common error type for seqforge.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A name or token does not follow the expected numeric convention.
    #[error("Parse error: {input:?}: {message}")]
    Parse { input: String, message: String },

    /// Expected range bounds are inconsistent.
    #[error("Invalid range: {low}..={high}")]
    Range { low: u32, high: u32 },

    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid input was provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Create a new Parse error.
    pub fn parse<S: Into<String>, M: Into<String>>(input: S, message: M) -> Self {
        Self::Parse {
            input: input.into(),
            message: message.into(),
        }
    }

    /// Create a new InvalidInput error.
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }
}

/// Result type alias for common operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = Error::parse("images/abc.png", "not a decimal integer");
        assert_eq!(
            err.to_string(),
            "Parse error: \"images/abc.png\": not a decimal integer"
        );
    }

    #[test]
    fn test_range_error_display() {
        let err = Error::Range { low: 10, high: 1 };
        assert_eq!(err.to_string(), "Invalid range: 10..=1");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
