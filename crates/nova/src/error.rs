//! Error types for the Nova library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Nova operations.
#[derive(Debug, Error)]
pub enum NovaError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error parsing tabular or numeric data.
    #[error("Parse error at row {row}, column {column}: {message}")]
    Parse {
        row: usize,
        column: usize,
        message: String,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Empty file or no data to process.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// A batch stage found nothing to process.
    #[error("No input files matching '{pattern}' found in '{dir}'")]
    NoInputs { dir: PathBuf, pattern: String },

    /// Required columns absent after reconciliation.
    #[error("Missing required columns: {}", columns.join(", "))]
    MissingColumns { columns: Vec<String> },

    /// Directory layout could not be created or is incomplete.
    #[error("Setup error: {0}")]
    Setup(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// TOML configuration could not be parsed.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An external program exited unsuccessfully.
    #[error("External command '{command}' failed with {status}: {stderr}")]
    ExternalTool {
        command: String,
        status: String,
        stderr: String,
    },
}

impl NovaError {
    /// Wrap an IO error with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        NovaError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for Nova operations.
pub type Result<T> = std::result::Result<T, NovaError>;
