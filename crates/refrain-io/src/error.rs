//! I/O error types for refrain-io.

use std::path::PathBuf;

use refrain_path::{PathError, SsmError};

/// Errors from file I/O, CSV parsing, and result serialization.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when the input file does not exist or is unreadable.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the CSV parser encounters a malformed record.
    #[error("CSV parse error in {path} at byte offset {offset}")]
    CsvParse {
        /// Path to the CSV file.
        path: PathBuf,
        /// Byte offset where the error occurred.
        offset: u64,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Returned when the CSV file contains no data rows.
    #[error("empty dataset (no data rows) in {path}")]
    EmptyDataset {
        /// Path to the CSV file.
        path: PathBuf,
    },

    /// Returned when an SSM row has a different number of columns than the first row.
    #[error("inconsistent row length in {path}: row {row_index} has {got} columns, expected {expected}")]
    InconsistentRowLength {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based row index.
        row_index: usize,
        /// Expected number of columns (from the first row).
        expected: usize,
        /// Actual number of columns in this row.
        got: usize,
    },

    /// Returned when a cell value is NaN, Inf, or otherwise not a finite float.
    #[error("non-finite value in {path}: row {row_index}, column {col_index}, raw value \"{raw}\"")]
    NonFiniteValue {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based row index (excluding any header).
        row_index: usize,
        /// Zero-based column index.
        col_index: usize,
        /// The raw string value that failed to parse.
        raw: String,
    },

    /// Returned when a segment row holds invalid times.
    #[error("invalid segment in {path}: row {row_index}")]
    InvalidSegment {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based row index (excluding header).
        row_index: usize,
        /// Validation failure.
        source: PathError,
    },

    /// Returned when the run name contains characters outside `[a-zA-Z0-9_-]`.
    #[error("invalid run name \"{name}\": must match [a-zA-Z0-9_-]+")]
    InvalidRunName {
        /// The invalid name.
        name: String,
    },

    /// Returned when the output directory cannot be created.
    #[error("cannot create output directory {path}")]
    OutputDirCreate {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a result artifact cannot be serialized.
    #[error("cannot serialize result for {path}")]
    Serialize {
        /// Target file.
        path: PathBuf,
        /// Underlying serialization error.
        source: serde_json::Error,
    },

    /// Returned when a result file cannot be written.
    #[error("cannot write file {path}")]
    WriteFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when parsed values do not form a valid SSM.
    #[error(transparent)]
    Ssm(#[from] SsmError),

    /// Returned when a path computation fails on loaded data.
    #[error(transparent)]
    Path(#[from] PathError),
}
