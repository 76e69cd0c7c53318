use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the channel insights crates.
#[derive(Error, Debug)]
pub enum InsightsError {
    /// The export document is structurally invalid (missing keys, ragged rows,
    /// bad author objects).
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// A timestamp string did not match any recognised format.
    #[error("Invalid timestamp format in row {row}: {value}")]
    TimestampParse { row: usize, value: String },

    /// A caller-supplied argument is out of range (e.g. top-N of zero).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A view that needs at least one row was asked for on an empty table.
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A chart backend failed to draw or write its output.
    #[error("Render error: {0}")]
    Render(String),
}

/// Coarse error categories: load errors, bad arguments, empty tables and
/// file or backend failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MalformedInput,
    InvalidArgument,
    EmptyInput,
    Io,
}

impl InsightsError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            InsightsError::MalformedInput(_)
            | InsightsError::TimestampParse { .. }
            | InsightsError::JsonParse(_) => ErrorKind::MalformedInput,
            InsightsError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            InsightsError::EmptyInput(_) => ErrorKind::EmptyInput,
            InsightsError::FileRead { .. } | InsightsError::Render(_) => ErrorKind::Io,
        }
    }
}

/// Convenience alias used throughout the insights crates.
pub type Result<T> = std::result::Result<T, InsightsError>;
