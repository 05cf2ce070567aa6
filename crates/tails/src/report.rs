//! Tabular rendering of tail and change rows for the presentation
//! collaborator.
//!
//! Frames carry raw signed floats in a fixed column order and preserve the
//! upstream ranking order verbatim. Number formatting and color-coding of
//! positive/negative diffs are the collaborator's concern, not the engine's.

use crate::error::Result;
use crate::model::{AssetClass, ChangeRow, TailRow};
use polars::prelude::*;

/// Column order of [`tail_frame`] output.
pub const TAIL_COLUMNS: [&str; 18] = [
    "tail_rank",
    "scenario",
    "as_of_date",
    "fx",
    "rates",
    "em_macro",
    "other",
    "macro",
    "fx_prev",
    "rates_prev",
    "em_macro_prev",
    "other_prev",
    "macro_prev",
    "fx_diff",
    "rates_diff",
    "em_macro_diff",
    "other_diff",
    "macro_diff",
];

/// Column order of [`change_frame`] output.
pub const CHANGE_COLUMNS: [&str; 14] = [
    "change_rank",
    "scenario",
    "as_of_date",
    "macro",
    "macro_prev",
    "macro_diff",
    "fx",
    "rates",
    "em_macro",
    "other",
    "fx_prev",
    "rates_prev",
    "em_macro_prev",
    "other_prev",
];

/// Snake-case column stem for an asset class.
const fn class_stem(class: AssetClass) -> &'static str {
    match class {
        AssetClass::Fx => "fx",
        AssetClass::Rates => "rates",
        AssetClass::EmMacro => "em_macro",
        AssetClass::Other => "other",
    }
}

fn date_column(dates: impl Iterator<Item = Option<chrono::NaiveDate>>) -> Column {
    Column::new(
        "as_of_date".into(),
        dates
            .map(|d| d.map(|d| d.to_string()))
            .collect::<Vec<Option<String>>>(),
    )
}

/// Render compared tail rows as a DataFrame in [`TAIL_COLUMNS`] order.
///
/// Rows that were never passed through [`crate::compare::compare_tails`]
/// render their prior and diff columns as 0.0.
pub fn tail_frame(rows: &[TailRow]) -> Result<DataFrame> {
    let mut columns: Vec<Column> = Vec::with_capacity(TAIL_COLUMNS.len());

    columns.push(Column::new(
        "tail_rank".into(),
        rows.iter().map(|r| r.tail_rank).collect::<Vec<u32>>(),
    ));
    columns.push(Column::new(
        "scenario".into(),
        rows.iter().map(|r| r.scenario_id).collect::<Vec<u32>>(),
    ));
    columns.push(date_column(rows.iter().map(|r| r.as_of_date)));

    for class in AssetClass::ALL {
        columns.push(Column::new(
            class_stem(class).into(),
            rows.iter()
                .map(|r| r.classes.get(class))
                .collect::<Vec<f64>>(),
        ));
    }
    columns.push(Column::new(
        "macro".into(),
        rows.iter().map(|r| r.macro_total).collect::<Vec<f64>>(),
    ));

    for class in AssetClass::ALL {
        columns.push(Column::new(
            format!("{}_prev", class_stem(class)).into(),
            rows.iter()
                .map(|r| r.delta.map_or(0.0, |d| d.prior_classes.get(class)))
                .collect::<Vec<f64>>(),
        ));
    }
    columns.push(Column::new(
        "macro_prev".into(),
        rows.iter()
            .map(|r| r.delta.map_or(0.0, |d| d.prior_macro))
            .collect::<Vec<f64>>(),
    ));

    for class in AssetClass::ALL {
        columns.push(Column::new(
            format!("{}_diff", class_stem(class)).into(),
            rows.iter()
                .map(|r| r.delta.map_or(0.0, |d| d.diff_classes.get(class)))
                .collect::<Vec<f64>>(),
        ));
    }
    columns.push(Column::new(
        "macro_diff".into(),
        rows.iter()
            .map(|r| r.delta.map_or(0.0, |d| d.diff_macro))
            .collect::<Vec<f64>>(),
    ));

    Ok(DataFrame::new(columns)?)
}

/// Render change rows as a DataFrame in [`CHANGE_COLUMNS`] order.
pub fn change_frame(rows: &[ChangeRow]) -> Result<DataFrame> {
    let mut columns: Vec<Column> = Vec::with_capacity(CHANGE_COLUMNS.len());

    columns.push(Column::new(
        "change_rank".into(),
        rows.iter().map(|r| r.change_rank).collect::<Vec<u32>>(),
    ));
    columns.push(Column::new(
        "scenario".into(),
        rows.iter().map(|r| r.scenario_id).collect::<Vec<u32>>(),
    ));
    columns.push(date_column(rows.iter().map(|r| r.as_of_date)));

    columns.push(Column::new(
        "macro".into(),
        rows.iter().map(|r| r.macro_current).collect::<Vec<f64>>(),
    ));
    columns.push(Column::new(
        "macro_prev".into(),
        rows.iter().map(|r| r.macro_previous).collect::<Vec<f64>>(),
    ));
    columns.push(Column::new(
        "macro_diff".into(),
        rows.iter().map(|r| r.diff).collect::<Vec<f64>>(),
    ));

    for class in AssetClass::ALL {
        columns.push(Column::new(
            class_stem(class).into(),
            rows.iter()
                .map(|r| r.classes.get(class))
                .collect::<Vec<f64>>(),
        ));
    }
    for class in AssetClass::ALL {
        columns.push(Column::new(
            format!("{}_prev", class_stem(class)).into(),
            rows.iter()
                .map(|r| r.prior_classes.get(class))
                .collect::<Vec<f64>>(),
        ));
    }

    Ok(DataFrame::new(columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::compare_tails;
    use crate::model::{AggregatedRow, ClassTotals};
    use crate::tails::select_tails;

    fn agg_row(scenario_id: u32, fx: f64) -> AggregatedRow {
        AggregatedRow::new(
            scenario_id,
            None,
            ClassTotals::from_pairs(&[(AssetClass::Fx, fx)]),
        )
    }

    #[test]
    fn test_tail_frame_columns_and_order() {
        let current = vec![agg_row(1, -10.0), agg_row(2, 4.0), agg_row(3, 9.0)];
        let prior = vec![agg_row(1, -8.0), agg_row(2, 4.0), agg_row(3, 1.0)];
        let compared = compare_tails(&select_tails(&current, 1), &prior);

        let frame = tail_frame(&compared).unwrap();

        let names: Vec<&str> = frame.get_column_names_str();
        assert_eq!(names, TAIL_COLUMNS);

        // Upstream ranking order preserved: worst block first, then best.
        let scenarios = frame.column("scenario").unwrap().u32().unwrap();
        assert_eq!(scenarios.get(0), Some(1));
        assert_eq!(scenarios.get(1), Some(3));

        let diffs = frame.column("macro_diff").unwrap().f64().unwrap();
        assert!((diffs.get(0).unwrap() - (-2.0)).abs() < 1e-12);
        assert!((diffs.get(1).unwrap() - 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_change_frame_columns() {
        let current = vec![agg_row(1, 10.0), agg_row(2, -5.0)];
        let prior = vec![agg_row(1, 2.0), agg_row(2, 0.0)];
        let changes =
            crate::compare::top_changes(&current, &prior, crate::model::Methodology::DVaR, 1)
                .unwrap();

        let frame = change_frame(&changes).unwrap();

        let names: Vec<&str> = frame.get_column_names_str();
        assert_eq!(names, CHANGE_COLUMNS);
        assert_eq!(frame.height(), 2);
    }

    #[test]
    fn test_uncompared_rows_render_zero_prior() {
        let tails = select_tails(&[agg_row(1, 5.0)], 1);
        let frame = tail_frame(&tails).unwrap();

        let prev = frame.column("macro_prev").unwrap().f64().unwrap();
        assert_eq!(prev.get(0), Some(0.0));
        let diff = frame.column("macro_diff").unwrap().f64().unwrap();
        assert_eq!(diff.get(0), Some(0.0));
    }
}
