//! Historical lag tables for sparkline rendering.
//!
//! For a chosen metric and lag depth N, each state's row carries the
//! metric's value at the latest available date, one day prior, two days
//! prior, and so on — published oldest-first so a sparkline reads left to
//! right. Lookups go through the dense ordinal-day index, so a gap in a
//! state's reporting yields an explicit missing cell, never interpolation.

use chrono::{Duration, NaiveDate};

use crate::aggregate::metrics::DailyMetric;
use crate::core::{Cell, DateIndex, Table};
use crate::pipeline::DailyGatingFrame;

/// Latest date present anywhere in the frame set.
pub fn latest_date(frames: &[DailyGatingFrame]) -> Option<NaiveDate> {
    frames.iter().filter_map(|f| f.dates.last()).copied().max()
}

/// Build the lag sparkline table for one metric.
///
/// Columns run from `T-num_lags` (oldest) to `T-0` (latest). The latest
/// date is taken across every frame, including excluded entities: the
/// exclusion list only removes rows, after all date-window math is done.
pub fn lag_table(
    frames: &[DailyGatingFrame],
    metric: DailyMetric,
    num_lags: usize,
    excluded: &[String],
) -> Table {
    let metric_name = metric.column_name();
    let mut columns = vec!["state".to_string(), "date".to_string()];
    columns.extend((0..=num_lags).rev().map(|lag| format!("{metric_name} T-{lag}")));

    let mut table = Table::new(metric_name, columns);
    let Some(latest) = latest_date(frames) else {
        return table;
    };

    for frame in frames {
        if excluded.iter().any(|e| e == &frame.state) {
            continue;
        }
        let Some(index) = DateIndex::new(&frame.dates) else {
            continue;
        };
        let mut row = vec![Cell::Text(frame.state.clone()), Cell::Date(latest)];
        for lag in (0..=num_lags).rev() {
            let target = latest - Duration::days(lag as i64);
            let cell = index
                .row(target)
                .map(|r| metric.cell(frame, r))
                .unwrap_or(Cell::Missing);
            row.push(cell);
        }
        table.push_row(row);
    }
    table
}
