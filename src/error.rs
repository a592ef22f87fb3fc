//! Error types for the capture ingestion and classification engine

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Convenient `Result` alias used throughout the crate.
pub type RfiResult<T> = Result<T, RfiError>;

/// Errors that can occur while windowing, classifying or building datasets
///
/// Cross-file sample-count disagreement during a dataset build is *not* an
/// error by itself: it is logged, and the merge's row-count check decides.
#[derive(Debug, Error)]
pub enum RfiError {
    /// Invalid input parameters or malformed shapes
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Data failed a validation check (row counts, columns, directory contents)
    #[error("Validation error: {0}")]
    Validation(String),

    /// A required file or directory does not exist
    #[error("Missing resource: {}", .0.display())]
    MissingResource(PathBuf),

    /// I/O failure on a specific path
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// Path being read or written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// CSV encoding or decoding failure
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON configuration failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The classification model failed or is unavailable
    #[error("Model error: {0}")]
    Model(String),

    /// The worker pool could not be started
    #[error("Worker pool error: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    /// A worker observed the pool-wide cancellation signal
    #[error("Task for {} cancelled", .0.display())]
    Cancelled(PathBuf),

    /// A worker exceeded its per-task deadline
    #[error("Task for {} exceeded its deadline after {elapsed:?}", path.display())]
    TaskTimeout {
        /// Capture file being processed
        path: PathBuf,
        /// Time spent before the deadline check fired
        elapsed: Duration,
    },

    /// A dataset build aborted; carries the per-chunk files produced so far
    #[error("Dataset build aborted ({} partial files): {cause}", partial_files.len())]
    BuildAborted {
        /// First failure, in input order
        #[source]
        cause: Box<RfiError>,
        /// Chunk files written by tasks that completed before the abort
        partial_files: Vec<PathBuf>,
    },
}

impl RfiError {
    /// Wrap an I/O error with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RfiError::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error belongs to the validation class (always fatal).
    pub fn is_validation(&self) -> bool {
        matches!(self, RfiError::InvalidInput(_) | RfiError::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let e = RfiError::Validation("3 rows instead of 4".to_string());
        assert_eq!(e.to_string(), "Validation error: 3 rows instead of 4");

        let e = RfiError::MissingResource(PathBuf::from("/nope/file.bin"));
        assert!(e.to_string().contains("/nope/file.bin"));
    }

    #[test]
    fn test_build_aborted_keeps_cause() {
        let e = RfiError::BuildAborted {
            cause: Box::new(RfiError::Validation("empty".to_string())),
            partial_files: vec![PathBuf::from("a_1.csv"), PathBuf::from("b_1.csv")],
        };
        assert!(e.to_string().contains("2 partial files"));
        let source = std::error::Error::source(&e).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("Validation error: empty"));
    }

    #[test]
    fn test_validation_class() {
        assert!(RfiError::InvalidInput("x".into()).is_validation());
        assert!(!RfiError::Model("x".into()).is_validation());
    }
}
