//! Error types for tail aggregation and comparison.

use crate::model::{Methodology, Period};
use thiserror::Error;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, TailError>;

/// Errors that can occur during aggregation, comparison, or ingestion.
///
/// Structural errors abort only the specific operation requested and carry
/// enough context (methodology, period, requested tail size) for the caller
/// to retry with different parameters or surface a message. They are never
/// swallowed into an empty successful result.
#[derive(Debug, Error)]
pub enum TailError {
    /// No raw records matched the requested (methodology, period) filter
    #[error("no {methodology} records for {period}: nothing to aggregate")]
    EmptyInput {
        /// Methodology requested for aggregation
        methodology: Methodology,
        /// Reporting period requested for aggregation
        period: Period,
    },

    /// The two periods' scenario id sets do not intersect
    #[error("no overlapping scenarios between {methodology} COB and Prev COB (requested top {requested})")]
    NoOverlap {
        /// Methodology the change comparison was requested for
        methodology: Methodology,
        /// Tail size requested for the comparison
        requested: usize,
    },

    /// Missing required column in an input table
    #[error("missing required column: {0}")]
    MissingColumn(String),

    /// Invalid startup configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Polars DataFrame error
    #[error("DataFrame error: {0}")]
    Polars(#[from] polars::error::PolarsError),
}
