//! Scenario aggregation: raw P&L cells to one row per scenario.

use crate::error::{Result, TailError};
use crate::model::{
    AggregatedRow, ClassTotals, Methodology, Period, RawRecord, ScenarioCalendar,
};
use std::collections::BTreeMap;

/// Aggregate raw records for one (methodology, period) slice.
///
/// Filters the input to the requested slice, groups the remaining records by
/// scenario id and asset class, and sums values. Multiple raw rows mapping to
/// the same (scenario, class) pair are summed, never overwritten, so duplicate
/// source rows cannot silently drop P&L. Classes with no contribution hold
/// 0.0 rather than a missing value, and the Macro total is recomputed from
/// the class totals.
///
/// Output is ordered by ascending scenario id. Dates are attached from
/// `calendar` where available and left unset otherwise.
///
/// # Errors
///
/// [`TailError::EmptyInput`] when zero records match the requested filter;
/// downstream comparators must not operate on phantom data, so this is
/// reported rather than defaulted to an empty table.
pub fn aggregate(
    records: &[RawRecord],
    methodology: Methodology,
    period: Period,
    calendar: &ScenarioCalendar,
) -> Result<Vec<AggregatedRow>> {
    let mut grouped: BTreeMap<u32, ClassTotals> = BTreeMap::new();
    let mut matched = false;

    for record in records {
        if record.methodology != methodology || record.period != period {
            continue;
        }
        matched = true;
        grouped
            .entry(record.scenario_id)
            .or_insert_with(ClassTotals::zero)
            .add(record.asset_class, record.value);
    }

    if !matched {
        return Err(TailError::EmptyInput {
            methodology,
            period,
        });
    }

    Ok(grouped
        .into_iter()
        .map(|(scenario_id, classes)| {
            AggregatedRow::new(scenario_id, calendar.date_for(scenario_id), classes)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AssetClass;

    fn record(
        scenario_id: u32,
        asset_class: AssetClass,
        methodology: Methodology,
        period: Period,
        value: f64,
    ) -> RawRecord {
        RawRecord {
            scenario_id,
            asset_class,
            methodology,
            period,
            value,
        }
    }

    #[test]
    fn test_filters_to_requested_slice() {
        let records = vec![
            record(1, AssetClass::Fx, Methodology::DVaR, Period::Cob, 10.0),
            record(1, AssetClass::Fx, Methodology::SVaR, Period::Cob, 99.0),
            record(1, AssetClass::Fx, Methodology::DVaR, Period::PrevCob, 50.0),
        ];

        let rows = aggregate(
            &records,
            Methodology::DVaR,
            Period::Cob,
            &ScenarioCalendar::new(),
        )
        .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].classes.get(AssetClass::Fx), 10.0);
    }

    #[test]
    fn test_duplicate_rows_are_summed_not_overwritten() {
        // Two risk nodes under FX contribute to the same scenario.
        let records = vec![
            record(3, AssetClass::Fx, Methodology::DVaR, Period::Cob, 7.0),
            record(3, AssetClass::Fx, Methodology::DVaR, Period::Cob, 5.0),
            record(3, AssetClass::Rates, Methodology::DVaR, Period::Cob, -2.0),
        ];

        let rows = aggregate(
            &records,
            Methodology::DVaR,
            Period::Cob,
            &ScenarioCalendar::new(),
        )
        .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].classes.get(AssetClass::Fx), 12.0);
        assert_eq!(rows[0].classes.get(AssetClass::Rates), -2.0);
    }

    #[test]
    fn test_macro_total_is_sum_of_class_totals() {
        let records = vec![
            record(1, AssetClass::Fx, Methodology::DVaR, Period::Cob, 10.5),
            record(1, AssetClass::Rates, Methodology::DVaR, Period::Cob, -4.25),
            record(2, AssetClass::EmMacro, Methodology::DVaR, Period::Cob, 3.0),
        ];

        let rows = aggregate(
            &records,
            Methodology::DVaR,
            Period::Cob,
            &ScenarioCalendar::new(),
        )
        .unwrap();

        for row in &rows {
            assert_eq!(row.macro_total, row.classes.sum());
        }
        assert!((rows[0].macro_total - 6.25).abs() < 1e-12);
        // Classes absent for scenario 2 are zero, not missing.
        assert_eq!(rows[1].classes.get(AssetClass::Fx), 0.0);
        assert!((rows[1].macro_total - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_output_ordered_by_scenario_id() {
        let records = vec![
            record(9, AssetClass::Fx, Methodology::SVaR, Period::Cob, 1.0),
            record(2, AssetClass::Fx, Methodology::SVaR, Period::Cob, 2.0),
            record(5, AssetClass::Fx, Methodology::SVaR, Period::Cob, 3.0),
        ];

        let rows = aggregate(
            &records,
            Methodology::SVaR,
            Period::Cob,
            &ScenarioCalendar::new(),
        )
        .unwrap();

        let ids: Vec<u32> = rows.iter().map(|r| r.scenario_id).collect();
        assert_eq!(ids, vec![2, 5, 9]);
    }

    #[test]
    fn test_empty_filter_is_an_error() {
        let records = vec![record(
            1,
            AssetClass::Fx,
            Methodology::DVaR,
            Period::Cob,
            1.0,
        )];

        let err = aggregate(
            &records,
            Methodology::SVaR,
            Period::Cob,
            &ScenarioCalendar::new(),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            TailError::EmptyInput {
                methodology: Methodology::SVaR,
                period: Period::Cob,
            }
        ));
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let records = vec![
            record(1, AssetClass::Fx, Methodology::DVaR, Period::Cob, 0.1),
            record(1, AssetClass::Rates, Methodology::DVaR, Period::Cob, 0.2),
            record(2, AssetClass::Fx, Methodology::DVaR, Period::Cob, -0.3),
        ];
        let calendar = ScenarioCalendar::new();

        let first = aggregate(&records, Methodology::DVaR, Period::Cob, &calendar).unwrap();
        let second = aggregate(&records, Methodology::DVaR, Period::Cob, &calendar).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_attaches_calendar_dates() {
        let records = vec![
            record(1, AssetClass::Fx, Methodology::DVaR, Period::Cob, 1.0),
            record(2, AssetClass::Fx, Methodology::DVaR, Period::Cob, 2.0),
        ];
        let calendar: ScenarioCalendar =
            [(1, chrono::NaiveDate::from_ymd_opt(2025, 6, 6).unwrap())]
                .into_iter()
                .collect();

        let rows = aggregate(&records, Methodology::DVaR, Period::Cob, &calendar).unwrap();

        assert_eq!(
            rows[0].as_of_date,
            chrono::NaiveDate::from_ymd_opt(2025, 6, 6)
        );
        assert_eq!(rows[1].as_of_date, None);
    }
}
