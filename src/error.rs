//! Error types.
//!
//! `AppError` is what the binary surfaces: a readable message plus a process
//! exit code. Library code returns the typed errors below and converts at the
//! edge.
//!
//! Exit codes:
//! - 2: usage, configuration or load problems
//! - 3: no data where a command needed some
//! - 4: terminal / runtime I/O

use std::path::PathBuf;

use thiserror::Error;

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

/// Failure to produce a Loan Record Store from the backing source.
///
/// Always fatal for the render that triggered it.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Loan data file not found: '{}'", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read loan data '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed loan data: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing required column: `{0}`")]
    MissingColumn(&'static str),

    #[error("Invalid value in column `{column}` on line {line}: {message}")]
    InvalidRow {
        line: usize,
        column: &'static str,
        message: String,
    },
}

/// A mean or ratio was requested over zero records.
///
/// Recoverable: the caller shows a "no data" indicator for that one metric.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregationError {
    #[error("No records available to compute {metric}.")]
    Empty { metric: &'static str },
}

impl AggregationError {
    pub fn empty(metric: &'static str) -> Self {
        Self::Empty { metric }
    }
}

/// Synthetic dataset generation failures.
#[derive(Debug, Error)]
pub enum SampleError {
    #[error("Invalid sample settings: {0}")]
    InvalidSettings(String),

    #[error("Failed to write sample '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write sample CSV: {0}")]
    Csv(#[from] csv::Error),
}

impl From<LoadError> for AppError {
    fn from(err: LoadError) -> Self {
        AppError::new(2, err.to_string())
    }
}

impl From<AggregationError> for AppError {
    fn from(err: AggregationError) -> Self {
        AppError::new(3, err.to_string())
    }
}

impl From<SampleError> for AppError {
    fn from(err: SampleError) -> Self {
        AppError::new(2, err.to_string())
    }
}
