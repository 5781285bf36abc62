//! Error types for pme-report

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during report generation
#[derive(Debug, Error)]
pub enum Error {
    /// IO error (from std::io)
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Report directory is not usable
    #[error("Invalid output directory {path}: {reason}")]
    InvalidOutput {
        /// Path given
        path: String,
        /// Why it was rejected
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_output_display() {
        let err = Error::InvalidOutput {
            path: "/tmp/report.txt".to_string(),
            reason: "not a directory".to_string(),
        };
        assert!(err.to_string().contains("/tmp/report.txt"));
        assert!(err.to_string().contains("not a directory"));
    }

    #[test]
    fn test_io_error_conversion() {
        let err: Error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(err.to_string().contains("gone"));
    }
}
