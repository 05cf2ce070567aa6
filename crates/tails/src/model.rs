//! Domain value types for the tail engine.
//!
//! All entities are immutable value rows produced by pure transformations of
//! the raw input table. Each pipeline stage produces a new table; nothing is
//! shared or mutated across stages.

use chrono::NaiveDate;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Asset class a risk node rolls up to.
///
/// Derived from a fixed node-to-class mapping at ingestion; never free text.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetClass {
    /// Foreign exchange
    #[display("FX")]
    #[serde(rename = "FX")]
    Fx,
    /// Interest rates
    Rates,
    /// Emerging-markets macro
    #[display("EM Macro")]
    #[serde(rename = "EM Macro")]
    EmMacro,
    /// Anything outside the tracked desks
    Other,
}

impl AssetClass {
    /// Number of asset classes.
    pub const COUNT: usize = 4;

    /// All asset classes in reporting order.
    pub const ALL: [Self; Self::COUNT] = [Self::Fx, Self::Rates, Self::EmMacro, Self::Other];

    const fn index(self) -> usize {
        self as usize
    }
}

/// VaR methodology a P&L vector belongs to.
///
/// The two methodologies draw from disjoint scenario-id ranges in the source
/// data (see [`crate::config::ScenarioRanges`]).
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Methodology {
    /// Diversified/historical VaR
    DVaR,
    /// Stressed VaR, computed over a historical stress window
    SVaR,
}

/// Reporting period a raw record was observed in.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    /// Current close of business
    #[display("COB")]
    #[serde(rename = "COB")]
    Cob,
    /// Previous close of business
    #[display("Prev COB")]
    #[serde(rename = "PrevCOB")]
    PrevCob,
}

/// One raw P&L cell: a single (scenario, risk node) contribution.
///
/// `scenario_id` is unique within a (methodology, period, asset class) slice
/// of validated input; duplicates that survive upstream validation are summed
/// by the aggregator rather than dropped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Scenario rank within its methodology's vector range
    pub scenario_id: u32,
    /// Asset class the contributing risk node maps to
    pub asset_class: AssetClass,
    /// VaR methodology the record belongs to
    pub methodology: Methodology,
    /// Reporting period the record was observed in
    pub period: Period,
    /// P&L contribution
    pub value: f64,
}

/// Dense per-asset-class totals for one scenario.
///
/// Every class has a slot; classes absent from the input hold 0.0, never a
/// missing value.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ClassTotals([f64; AssetClass::COUNT]);

impl ClassTotals {
    /// Totals with every class at zero.
    pub const fn zero() -> Self {
        Self([0.0; AssetClass::COUNT])
    }

    /// Build totals from (class, value) pairs, summing repeated classes.
    pub fn from_pairs(pairs: &[(AssetClass, f64)]) -> Self {
        let mut totals = Self::zero();
        for &(class, value) in pairs {
            totals.add(class, value);
        }
        totals
    }

    /// Total for one asset class.
    pub const fn get(&self, class: AssetClass) -> f64 {
        self.0[class.index()]
    }

    /// Add a contribution to one asset class.
    pub const fn add(&mut self, class: AssetClass, value: f64) {
        self.0[class.index()] += value;
    }

    /// Sum across all asset classes (the Macro total).
    pub fn sum(&self) -> f64 {
        self.0.iter().sum()
    }

    /// Element-wise `self - prior`.
    pub fn diff(&self, prior: &Self) -> Self {
        let mut out = Self::zero();
        for class in AssetClass::ALL {
            out.add(class, self.get(class) - prior.get(class));
        }
        out
    }

    /// Iterate (class, value) in reporting order.
    pub fn iter(&self) -> impl Iterator<Item = (AssetClass, f64)> + '_ {
        AssetClass::ALL.iter().map(|&class| (class, self.get(class)))
    }
}

/// One aggregated scenario: per-class totals plus the Macro portfolio total.
///
/// `macro_total` is always the exact sum of `classes` and is recomputed by
/// the constructor, never copied from the input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregatedRow {
    /// Scenario rank within its methodology's vector range
    pub scenario_id: u32,
    /// Calendar date the scenario maps to, when the collaborator supplied one
    pub as_of_date: Option<NaiveDate>,
    /// Per-asset-class totals
    pub classes: ClassTotals,
    /// Portfolio total: exact sum of `classes`
    pub macro_total: f64,
}

impl AggregatedRow {
    /// Build a row, recomputing the Macro total from the class totals.
    pub fn new(scenario_id: u32, as_of_date: Option<NaiveDate>, classes: ClassTotals) -> Self {
        Self {
            scenario_id,
            as_of_date,
            classes,
            macro_total: classes.sum(),
        }
    }
}

/// Prior-period values and day-over-day diffs attached to a tail row.
///
/// When the scenario has no prior-period counterpart, all fields are
/// zero-filled and `missing_prior` is set; this is a valid, displayable state,
/// never an error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodDelta {
    /// Prior-period per-class totals (zero when the scenario is absent)
    pub prior_classes: ClassTotals,
    /// Prior-period Macro total
    pub prior_macro: f64,
    /// Per-class `current - prior`
    pub diff_classes: ClassTotals,
    /// Macro `current - prior`
    pub diff_macro: f64,
    /// Whether the scenario was absent from the prior period
    pub missing_prior: bool,
}

/// One extreme scenario selected by the tail selector.
///
/// `tail_rank` runs 1..=n for the worst (most negative) block and 2n down to
/// n+1 for the best block, the single largest positive value carrying the
/// highest rank number. Rank numbers are a display convention; ordering is
/// the semantic content.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TailRow {
    /// Scenario rank within its methodology's vector range
    pub scenario_id: u32,
    /// Calendar date the scenario maps to
    pub as_of_date: Option<NaiveDate>,
    /// Two-sided tail rank
    pub tail_rank: u32,
    /// Current-period per-class totals
    pub classes: ClassTotals,
    /// Current-period Macro total
    pub macro_total: f64,
    /// Prior-period comparison, filled by [`crate::compare::compare_tails`]
    pub delta: Option<PeriodDelta>,
}

impl TailRow {
    /// Build a tail row from an aggregated row and its assigned rank.
    pub const fn from_aggregated(row: &AggregatedRow, tail_rank: u32) -> Self {
        Self {
            scenario_id: row.scenario_id,
            as_of_date: row.as_of_date,
            tail_rank,
            classes: row.classes,
            macro_total: row.macro_total,
            delta: None,
        }
    }
}

/// One scenario ranked by day-over-day Macro change.
///
/// Only scenarios present in both periods appear (inner join); `change_rank`
/// mirrors the tail numbering, with drops in 1..=n and rises in 2n..n+1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChangeRow {
    /// Scenario rank within its methodology's vector range
    pub scenario_id: u32,
    /// Calendar date of the current-period scenario
    pub as_of_date: Option<NaiveDate>,
    /// Two-sided change rank
    pub change_rank: u32,
    /// Current-period Macro total
    pub macro_current: f64,
    /// Prior-period Macro total
    pub macro_previous: f64,
    /// `macro_current - macro_previous`
    pub diff: f64,
    /// Current-period per-class totals
    pub classes: ClassTotals,
    /// Prior-period per-class totals
    pub prior_classes: ClassTotals,
}

/// Scenario-id to calendar-date mapping for one (methodology, period) slice.
///
/// Supplied by the external collaborator (derived from the source header
/// row); the engine attaches dates to output rows and does not interpret
/// them further.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioCalendar(BTreeMap<u32, NaiveDate>);

impl ScenarioCalendar {
    /// Empty calendar: every scenario resolves to no date.
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Record the date for a scenario.
    pub fn insert(&mut self, scenario_id: u32, date: NaiveDate) {
        self.0.insert(scenario_id, date);
    }

    /// Date for a scenario, if known.
    pub fn date_for(&self, scenario_id: u32) -> Option<NaiveDate> {
        self.0.get(&scenario_id).copied()
    }

    /// Number of mapped scenarios.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no scenarios are mapped.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(u32, NaiveDate)> for ScenarioCalendar {
    fn from_iter<I: IntoIterator<Item = (u32, NaiveDate)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_totals_default_to_zero() {
        let totals = ClassTotals::zero();
        for class in AssetClass::ALL {
            assert_eq!(totals.get(class), 0.0);
        }
        assert_eq!(totals.sum(), 0.0);
    }

    #[test]
    fn test_class_totals_sum_repeated_classes() {
        let totals = ClassTotals::from_pairs(&[
            (AssetClass::Fx, 10.0),
            (AssetClass::Fx, 5.0),
            (AssetClass::Rates, -3.0),
        ]);

        assert_eq!(totals.get(AssetClass::Fx), 15.0);
        assert_eq!(totals.get(AssetClass::Rates), -3.0);
        assert_eq!(totals.get(AssetClass::EmMacro), 0.0);
        assert!((totals.sum() - 12.0).abs() < 1e-12);
    }

    #[test]
    fn test_aggregated_row_recomputes_macro() {
        let classes = ClassTotals::from_pairs(&[
            (AssetClass::Fx, 100.0),
            (AssetClass::Rates, -40.0),
        ]);
        let row = AggregatedRow::new(7, None, classes);

        assert_eq!(row.macro_total, row.classes.sum());
        assert!((row.macro_total - 60.0).abs() < 1e-12);
    }

    #[test]
    fn test_display_labels() {
        assert_eq!(AssetClass::Fx.to_string(), "FX");
        assert_eq!(AssetClass::EmMacro.to_string(), "EM Macro");
        assert_eq!(Methodology::DVaR.to_string(), "DVaR");
        assert_eq!(Period::PrevCob.to_string(), "Prev COB");
    }

    #[test]
    fn test_calendar_lookup() {
        let calendar: ScenarioCalendar = [
            (261, NaiveDate::from_ymd_opt(2025, 6, 5).unwrap()),
            (262, NaiveDate::from_ymd_opt(2025, 6, 6).unwrap()),
        ]
        .into_iter()
        .collect();

        assert_eq!(calendar.len(), 2);
        assert_eq!(
            calendar.date_for(262),
            NaiveDate::from_ymd_opt(2025, 6, 6)
        );
        assert_eq!(calendar.date_for(999), None);
    }
}
