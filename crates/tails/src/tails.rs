//! Tail selection: the n worst and n best scenarios by Macro total.

use crate::model::{AggregatedRow, TailRow};
use std::cmp::Ordering;

/// Ascending by Macro total, ties broken by ascending scenario id so that
/// repeated runs over identical input produce identical output.
fn by_macro_then_id(a: &AggregatedRow, b: &AggregatedRow) -> Ordering {
    a.macro_total
        .total_cmp(&b.macro_total)
        .then(a.scenario_id.cmp(&b.scenario_id))
}

/// Select the two-sided tails of an aggregated table.
///
/// The `n` most negative Macro totals form the worst block (tail ranks
/// 1..=n, 1 = most negative, ascending order) followed by the `n` most
/// positive as the best block (descending order, ranks 2n down to n+1, the
/// single largest positive value carrying the highest rank number). When the
/// input holds fewer than `n` rows each side takes what is available; partial
/// tails are valid. A scenario extreme enough to land in both blocks appears
/// twice, once per block, with two different ranks.
pub fn select_tails(aggregated: &[AggregatedRow], n: usize) -> Vec<TailRow> {
    let mut sorted: Vec<&AggregatedRow> = aggregated.iter().collect();
    sorted.sort_by(|a, b| by_macro_then_id(a, b));

    let take = n.min(sorted.len());
    let mut tails = Vec::with_capacity(2 * take);

    for (i, row) in sorted.iter().take(take).enumerate() {
        tails.push(TailRow::from_aggregated(row, (i + 1) as u32));
    }

    // Best block: descending Macro totals, ties still ascending by scenario
    // id (a plain reverse of the worst sort would flip them).
    let mut best: Vec<&AggregatedRow> = aggregated.iter().collect();
    best.sort_by(|a, b| {
        b.macro_total
            .total_cmp(&a.macro_total)
            .then(a.scenario_id.cmp(&b.scenario_id))
    });
    for (i, row) in best.iter().take(take).enumerate() {
        tails.push(TailRow::from_aggregated(row, (2 * n - i) as u32));
    }

    tails
}
