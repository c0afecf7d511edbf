//! Error types for the pipeline stores.
//!
//! Only genuinely transient failures surface as errors here; the component
//! loops log them and retry on the next scheduled tick. Two conditions are
//! deliberately *not* errors:
//! - a missing or empty store reads as an empty snapshot ("no data yet"),
//! - a row that fails schema parsing is skipped and counted, and processing
//!   continues with the remaining rows.

use thiserror::Error;

// ---

/// Convenience alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Failures while reading or writing one of the CSV stores.
#[derive(Error, Debug)]
pub enum StoreError {
    /// I/O failure on the underlying file (wraps `std::io::Error`).
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV encoding or reader-level failure (wraps `csv::Error`).
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
