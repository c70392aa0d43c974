//! Error types for ingestion, fitting and the initial-data wait.

use std::time::Duration;

use thiserror::Error;

/// A row that was discarded during ingestion. The table is never touched
/// when one of these is produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RowError {
    /// Fewer than two tab-separated fields.
    #[error("Row skipped, too few fields: {row:?}")]
    TooFewFields { row: String },

    /// The line carries a NUL byte.
    #[error("Line contains NULL, skipping: {row:?}")]
    NullByte { row: String },

    /// A field is not a plain numeric literal.
    #[error("Bad line {row:?}: column {column} ({field:?}) is not a number")]
    InvalidNumber {
        row: String,
        field: String,
        column: usize,
    },
}

impl RowError {
    /// The raw input line that was rejected.
    pub fn row(&self) -> &str {
        match self {
            RowError::TooFewFields { row }
            | RowError::NullByte { row }
            | RowError::InvalidNumber { row, .. } => row,
        }
    }
}

/// Reasons a fit recompute is ignored.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    #[error("need at least 2 control points, got {got}")]
    TooFewPoints { got: usize },

    #[error("control point {index} has non-positive y ({y}); log undefined")]
    NonPositive { index: usize, y: f64 },

    #[error("control points do not determine a polynomial")]
    Singular,

    #[error("control points contain non-finite coordinates")]
    NonFinite,
}

/// Failure while waiting for the first row.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IngestError {
    #[error("input stream closed before any data arrived")]
    StreamClosed,

    #[error("no data arrived within {waited:?}")]
    TimedOut { waited: Duration },
}
