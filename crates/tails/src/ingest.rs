//! Ingestion of wide risk-node tables into raw records.
//!
//! The source extracts are wide: one `Node` column plus one column per P&L
//! vector, named `pnl_vector<N>` with a `[T-2]` suffix marking the previous
//! close of business. This module melts that shape into [`RawRecord`]s,
//! classifying each vector into DVaR or SVaR by the configured scenario-id
//! ranges and mapping risk nodes to asset classes via the configured node
//! map. Unmapped nodes and empty cells are rejected here, before the engine
//! proper; the transformation stages assume validated input.

use crate::config::EngineConfig;
use crate::error::{Result, TailError};
use crate::model::{AssetClass, Period, RawRecord};
use polars::prelude::*;

/// Column name carrying the risk-node id.
pub const NODE_COLUMN: &str = "Node";

const VECTOR_PREFIX: &str = "pnl_vector";
const PREV_SUFFIX: &str = "[T-2]";

/// Parse a P&L vector column name into (scenario id, period).
///
/// `pnl_vector261` is a current-COB vector for scenario 261;
/// `pnl_vector261[T-2]` is the previous-COB equivalent. Anything else
/// (identifier columns, free-text headers) is `None`. Digits are extracted
/// leniently from the part before the suffix, matching the source extracts'
/// occasional spacing quirks.
pub fn vector_scenario(name: &str) -> Option<(u32, Period)> {
    let (base, period) = match name.split_once(PREV_SUFFIX) {
        Some((head, _)) => (head, Period::PrevCob),
        None => (name, Period::Cob),
    };
    let rest = base.trim().strip_prefix(VECTOR_PREFIX)?;
    let digits: String = rest.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok().map(|id| (id, period))
}

/// Melt a wide risk-node table into raw records.
///
/// Every column whose name parses as a P&L vector and whose scenario id
/// falls inside one of the configured methodology ranges contributes one
/// record per mapped risk node. Rows whose node is not in the configured
/// mapping are dropped, as are null cells. Vector columns outside both
/// ranges are ignored.
///
/// # Errors
///
/// [`TailError::MissingColumn`] when the table has no `Node` column;
/// [`TailError::Polars`] when a vector column cannot be read as floats.
pub fn records_from_frame(df: &DataFrame, config: &EngineConfig) -> Result<Vec<RawRecord>> {
    let node_column = df
        .column(NODE_COLUMN)
        .map_err(|_| TailError::MissingColumn(NODE_COLUMN.to_string()))?;
    let nodes = node_column.cast(&DataType::Int64)?;
    let classes: Vec<Option<AssetClass>> = nodes
        .i64()?
        .into_iter()
        .map(|node| node.and_then(|n| config.class_for_node(n)))
        .collect();

    let mut records = Vec::new();
    for column in df.get_columns() {
        let Some((scenario_id, period)) = vector_scenario(column.name().as_str()) else {
            continue;
        };
        let Some(methodology) = config.ranges.methodology_for(scenario_id) else {
            continue;
        };

        let values = column.cast(&DataType::Float64)?;
        for (value, class) in values.f64()?.into_iter().zip(&classes) {
            let (Some(value), Some(asset_class)) = (value, *class) else {
                continue;
            };
            records.push(RawRecord {
                scenario_id,
                asset_class,
                methodology,
                period,
                value,
            });
        }
    }

    Ok(records)
}
