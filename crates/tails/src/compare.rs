//! Period comparison: COB tails against the previous COB, and the scenarios
//! with the largest day-over-day Macro change.

use crate::error::{Result, TailError};
use crate::model::{AggregatedRow, ChangeRow, Methodology, PeriodDelta, TailRow};
use std::collections::BTreeMap;

/// Left-join tail rows to the prior-period aggregated table on scenario id.
///
/// A scenario absent on the other day (the two periods can carry different
/// vector universes) keeps its row: all prior-period fields and diffs are
/// zero-filled and the delta is flagged `missing_prior`. Missing-prior is a
/// valid, displayable state, never a fatal condition. Diffs are computed
/// after the zero substitution, per class and for the Macro total.
pub fn compare_tails(tails: &[TailRow], prior: &[AggregatedRow]) -> Vec<TailRow> {
    let prior_by_id: BTreeMap<u32, &AggregatedRow> =
        prior.iter().map(|row| (row.scenario_id, row)).collect();

    tails
        .iter()
        .map(|tail| {
            let delta = match prior_by_id.get(&tail.scenario_id) {
                Some(prev) => PeriodDelta {
                    prior_classes: prev.classes,
                    prior_macro: prev.macro_total,
                    diff_classes: tail.classes.diff(&prev.classes),
                    diff_macro: tail.macro_total - prev.macro_total,
                    missing_prior: false,
                },
                None => PeriodDelta {
                    prior_classes: Default::default(),
                    prior_macro: 0.0,
                    diff_classes: tail.classes.diff(&Default::default()),
                    diff_macro: tail.macro_total,
                    missing_prior: true,
                },
            };
            TailRow {
                delta: Some(delta),
                ..*tail
            }
        })
        .collect()
}

/// Rank scenarios by largest day-over-day Macro change.
///
/// Inner-joins the current and prior aggregated tables on scenario id; rows
/// with no match on either side are excluded entirely. This differs from
/// [`compare_tails`], which keeps unmatched rows with zero-fill: tails are
/// about today's extremes regardless of history, while a change is only
/// meaningful where both days' data exist.
///
/// The `n` largest drops come first (change ranks 1..=n, 1 = biggest drop)
/// followed by the `n` largest rises (descending, ranks 2n down to n+1),
/// mirroring the tail numbering. Ties resolve by ascending scenario id.
///
/// # Errors
///
/// [`TailError::NoOverlap`] when the two periods share no scenario ids; an
/// empty changes table must never be rendered as if it were valid.
pub fn top_changes(
    current: &[AggregatedRow],
    prior: &[AggregatedRow],
    methodology: Methodology,
    n: usize,
) -> Result<Vec<ChangeRow>> {
    let prior_by_id: BTreeMap<u32, &AggregatedRow> =
        prior.iter().map(|row| (row.scenario_id, row)).collect();

    let joined: Vec<(&AggregatedRow, &AggregatedRow)> = current
        .iter()
        .filter_map(|cur| prior_by_id.get(&cur.scenario_id).map(|prev| (cur, *prev)))
        .collect();

    if joined.is_empty() {
        return Err(TailError::NoOverlap {
            methodology,
            requested: n,
        });
    }

    let change_row = |cur: &AggregatedRow, prev: &AggregatedRow, change_rank: u32| ChangeRow {
        scenario_id: cur.scenario_id,
        as_of_date: cur.as_of_date,
        change_rank,
        macro_current: cur.macro_total,
        macro_previous: prev.macro_total,
        diff: cur.macro_total - prev.macro_total,
        classes: cur.classes,
        prior_classes: prev.classes,
    };

    let diff_of = |pair: &(&AggregatedRow, &AggregatedRow)| pair.0.macro_total - pair.1.macro_total;

    let take = n.min(joined.len());
    let mut changes = Vec::with_capacity(2 * take);

    let mut drops = joined.clone();
    drops.sort_by(|a, b| {
        diff_of(a)
            .total_cmp(&diff_of(b))
            .then(a.0.scenario_id.cmp(&b.0.scenario_id))
    });
    for (i, (cur, prev)) in drops.iter().take(take).enumerate() {
        changes.push(change_row(cur, prev, (i + 1) as u32));
    }

    let mut rises = joined;
    rises.sort_by(|a, b| {
        diff_of(b)
            .total_cmp(&diff_of(a))
            .then(a.0.scenario_id.cmp(&b.0.scenario_id))
    });
    for (i, (cur, prev)) in rises.iter().take(take).enumerate() {
        changes.push(change_row(cur, prev, (2 * n - i) as u32));
    }

    Ok(changes)
}
