//! Error types for model operations
//!
//! Only shape mismatches and CSV ingestion failures surface as `Err` values.
//! Everything else in the failure taxonomy is deliberately softer: size
//! violations and transport failures go through the notification sink,
//! out-of-range selection indices are ignored, and stale completions are
//! discarded.

use thiserror::Error;

/// Errors reported by model mutation and ingestion operations
#[derive(Debug, Error)]
pub enum ModelError {
    /// A row's cell count disagrees with the header length
    #[error("row {row} has {found} cells, expected {expected}")]
    Shape {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// CSV ingestion failed
    #[error("failed to read csv data: {0}")]
    Csv(#[from] csv::Error),
}

/// Failure outcome of an upload transport call
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct UploadError(pub String);
