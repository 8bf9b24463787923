//! Error taxonomy for the booking pipeline.
//!
//! Ingestion problems (missing columns, numeric cells that do not coerce,
//! undecodable text) are fatal and surface as [`PipelineError`]. Row-level
//! data-quality problems are filtered silently by the loader and never become
//! errors. Empty groups are not errors either: selectors return `Option`.

use thiserror::Error;

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Required column '{column}' not found in input headers")]
    MissingColumn { column: String },

    #[error("Row {row}: failed to parse '{value}' as {expected} in column '{column}'")]
    Coercion {
        column: String,
        row: usize,
        value: String,
        expected: &'static str,
    },

    #[error("Price per traveler requested for a booking with zero travelers")]
    ZeroTravelers,

    #[error("Failed to decode text with encoding {encoding}")]
    Decode { encoding: &'static str },

    #[error("Column '{column}' must be declared as {expected}, not {found}")]
    FieldType {
        column: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Unknown column type '{0}' (expected text, small-integer, decimal or date-time)")]
    UnknownColumnType(String),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
