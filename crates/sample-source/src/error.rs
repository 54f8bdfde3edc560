//! Source Error Types

use thiserror::Error;

/// Errors while loading a feature table
#[derive(Debug, Error)]
pub enum SourceError {
    /// Underlying read failure
    #[error("Failed to read feature table: {0}")]
    Io(#[from] std::io::Error),

    /// Table has no header row
    #[error("Feature table is missing a header row")]
    MissingHeader,

    /// Requested column is not in the header
    #[error("Column not found in header: {0}")]
    MissingColumn(String),

    /// Row width differs from the header
    #[error("Line {line}: expected {expected} values, got {actual}")]
    RaggedRow {
        line: usize,
        expected: usize,
        actual: usize,
    },

    /// Cell is not a number
    #[error("Line {line}: column '{column}' has non-numeric value '{value}'")]
    InvalidNumber {
        line: usize,
        column: String,
        value: String,
    },
}
