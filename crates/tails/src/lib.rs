//! VaR tail aggregation and ranking engine.
//!
//! Given per-scenario P&L contributions tagged by risk node and asset class,
//! the engine aggregates them into asset-class and portfolio ("Macro")
//! totals per scenario, separately for the DVaR and SVaR methodologies and
//! for the current and previous close of business, then extracts the most
//! extreme scenarios ("tails") and the scenarios with the largest
//! day-over-day Macro change.
//!
//! The engine is a pure, synchronous batch computation: each stage is a
//! stateless function from immutable input rows to a fresh output table,
//! with no I/O. Reading raw records and presenting the output frames are the
//! caller's responsibility. The four (methodology, period) aggregations are
//! independent and may be run in parallel by the caller; both periods'
//! aggregated tables must exist before comparison.
#![doc(issue_tracker_base_url = "https://github.com/tailrisk/tails/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod aggregate;
pub mod compare;
pub mod config;
pub mod error;
pub mod ingest;
pub mod model;
pub mod report;
pub mod tails;

// Re-export core types
pub use aggregate::aggregate;
pub use compare::{compare_tails, top_changes};
pub use config::{DEFAULT_TAIL_N, EngineConfig, ScenarioRanges};
pub use error::{Result, TailError};
pub use ingest::{records_from_frame, vector_scenario};
pub use model::{
    AggregatedRow, AssetClass, ChangeRow, ClassTotals, Methodology, Period, PeriodDelta,
    RawRecord, ScenarioCalendar, TailRow,
};
pub use report::{change_frame, tail_frame};
pub use tails::select_tails;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
