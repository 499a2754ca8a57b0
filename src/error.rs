//! Error types.
//!
//! Two layers:
//!
//! - [`EngineError`] is what the library returns. Each variant corresponds to a
//!   failure class of the ingestion/scoring pipeline.
//! - [`AppError`] is what the binary prints. It carries the process exit code so
//!   `main` can stay a one-liner.

use std::path::PathBuf;

use thiserror::Error;

/// Exit code for usage, configuration, schema, and local I/O errors.
pub const EXIT_INPUT: u8 = 2;
/// Exit code when a run produces no scored objects.
pub const EXIT_EMPTY: u8 = 3;
/// Exit code for download and decompression failures.
pub const EXIT_ACQUIRE: u8 = 4;
/// Exit code for internal contract violations.
pub const EXIT_CONTRACT: u8 = 5;

/// Failures raised by the ingestion and scoring engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The catalog header lacks one or more required columns.
    #[error("catalog schema mismatch: missing required column(s) {}", .missing.join(", "))]
    SchemaMismatch { missing: Vec<String> },

    /// A single row could not be used. Counted and skipped by the pipeline.
    #[error("malformed row at line {line}: {reason}")]
    RowMalformed { line: u64, reason: String },

    /// The classifier was handed a negative or non-finite score.
    #[error("invalid score {0}: scores must be finite and >= 0")]
    InvalidScore(f64),

    /// The request failed or its body ended early.
    #[error("failed to download catalog from {url}: {source}")]
    DownloadFailure {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("failed to decompress catalog stream: {0}")]
    DecompressionFailure(#[source] std::io::Error),

    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl EngineError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EngineError::Io {
            path: path.into(),
            source,
        }
    }

    /// Exit code the binary should use for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            EngineError::SchemaMismatch { .. }
            | EngineError::RowMalformed { .. }
            | EngineError::Io { .. }
            | EngineError::Csv(_)
            | EngineError::Json(_)
            | EngineError::InvalidConfig(_) => EXIT_INPUT,
            EngineError::DownloadFailure { .. } | EngineError::DecompressionFailure(_) => EXIT_ACQUIRE,
            EngineError::InvalidScore(_) => EXIT_CONTRACT,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_errors_map_to_exit_codes() {
        let schema = EngineError::SchemaMismatch {
            missing: vec!["hip".to_string(), "mass".to_string()],
        };
        assert_eq!(schema.exit_code(), EXIT_INPUT);
        assert!(schema.to_string().contains("hip, mass"));

        let app: AppError = EngineError::InvalidScore(-1.0).into();
        assert_eq!(app.exit_code(), EXIT_CONTRACT);

        let decomp = EngineError::DecompressionFailure(std::io::Error::other("bad gzip"));
        assert_eq!(decomp.exit_code(), EXIT_ACQUIRE);

        let cut = EngineError::DownloadFailure {
            url: "http://example.org/hyg.csv".to_string(),
            source: Box::new(std::io::Error::other("connection reset")),
        };
        assert_eq!(cut.exit_code(), EXIT_ACQUIRE);
        assert!(cut.to_string().contains("connection reset"));
    }
}
