//! Latest-date summary views and full-history tables.

use chrono::NaiveDate;

use crate::aggregate::lags::latest_date;
use crate::aggregate::metrics::{DailyMetric, IliMetric};
use crate::core::{Cell, DateIndex, Table};
use crate::pipeline::streaks::{CriterionId, IliCriterionId};
use crate::pipeline::{DailyGatingFrame, WeeklyIliFrame};

/// Columns of the per-state criteria-1 workbook summary.
pub const CRITERIA_1_SUMMARY: &[DailyMetric] = &[
    DailyMetric::TotalCases,
    DailyMetric::TotalCases3dcs,
    DailyMetric::NewCases3dcs,
    DailyMetric::MaxDecreasingRunInWindow,
    DailyMetric::Criterion(CriterionId::Criteria1A),
    DailyMetric::MaxIncreasingRunInWindow,
    DailyMetric::Criterion(CriterionId::Criteria1B),
    DailyMetric::NewCasesComparedToWindowAgo3dcs,
    DailyMetric::Criterion(CriterionId::Criteria1C),
    DailyMetric::NewCasesInWindowPer100k,
    DailyMetric::Criterion(CriterionId::Criteria1D),
    DailyMetric::Criterion(CriterionId::Criteria1Combined),
    DailyMetric::StreakMet(CriterionId::Criteria1Combined),
    DailyMetric::StreakFailed(CriterionId::Criteria1Combined),
    DailyMetric::Rebound,
];

/// Columns of the per-state criteria-2 workbook summary.
pub const CRITERIA_2_SUMMARY: &[DailyMetric] = &[
    DailyMetric::NewTestsTotal,
    DailyMetric::NewTestsTotal3dcs,
    DailyMetric::MaxDecreasingPercentPositiveRun,
    DailyMetric::Criterion(CriterionId::Criteria2A),
    DailyMetric::NewTestsComparedToWindowAgo3dcs,
    DailyMetric::Criterion(CriterionId::Criteria2B),
    DailyMetric::PercentPositive3dcs,
    DailyMetric::PercentPositiveComparedToWindowAgo3dcs,
    DailyMetric::Criterion(CriterionId::Criteria2C),
    DailyMetric::Criterion(CriterionId::Criteria2D),
    DailyMetric::Criterion(CriterionId::Criteria2Combined),
    DailyMetric::StreakMet(CriterionId::Criteria2Combined),
    DailyMetric::StreakFailed(CriterionId::Criteria2Combined),
];

/// Columns of the per-state criteria-6 workbook summary.
pub const CRITERIA_6_SUMMARY: &[DailyMetric] = &[
    DailyMetric::PercentPositive3dcs,
    DailyMetric::MaxPercentPositiveInWindow,
    DailyMetric::Criterion(CriterionId::Criteria6),
    DailyMetric::StreakMet(CriterionId::Criteria6),
    DailyMetric::StreakFailed(CriterionId::Criteria6),
];

/// Columns of the cross-category state summary tab.
pub const STATE_SUMMARY: &[DailyMetric] = &[
    DailyMetric::TotalCases,
    DailyMetric::TotalCases3dcs,
    DailyMetric::NewCases3dcs,
    DailyMetric::MaxDecreasingRunInWindow,
    DailyMetric::Criterion(CriterionId::Criteria1A),
    DailyMetric::MaxIncreasingRunInWindow,
    DailyMetric::Criterion(CriterionId::Criteria1B),
    DailyMetric::NewCasesComparedToWindowAgo3dcs,
    DailyMetric::Criterion(CriterionId::Criteria1C),
    DailyMetric::Criterion(CriterionId::Criteria1D),
    DailyMetric::Criterion(CriterionId::Criteria1Combined),
    DailyMetric::Criterion(CriterionId::Criteria2A),
    DailyMetric::Criterion(CriterionId::Criteria2B),
    DailyMetric::Criterion(CriterionId::Criteria2C),
    DailyMetric::Criterion(CriterionId::Criteria2D),
    DailyMetric::Criterion(CriterionId::Criteria2Combined),
    DailyMetric::Criterion(CriterionId::CriteriaAllCombined),
    DailyMetric::Criterion(CriterionId::CriteriaAllCombinedOr),
    DailyMetric::Rebound,
];

/// Columns of the per-region criteria-5 workbook summary.
pub const CRITERIA_5_SUMMARY: &[IliMetric] = &[
    IliMetric::Year,
    IliMetric::Week,
    IliMetric::TotalIli,
    IliMetric::TotalIliSmoothed,
    IliMetric::MaxDecreasingTotalIliRun,
    IliMetric::Criterion(IliCriterionId::Criteria5A),
    IliMetric::TotalIliComparedToWindowAgo,
    IliMetric::Criterion(IliCriterionId::Criteria5B),
    IliMetric::PercentIli,
    IliMetric::PercentIliSmoothed,
    IliMetric::MaxDecreasingPercentIliRun,
    IliMetric::Criterion(IliCriterionId::Criteria5C),
    IliMetric::PercentIliComparedToWindowAgo,
    IliMetric::Criterion(IliCriterionId::Criteria5D),
    IliMetric::Criterion(IliCriterionId::Criteria5Combined),
    IliMetric::StreakMet(IliCriterionId::Criteria5Combined),
    IliMetric::StreakFailed(IliCriterionId::Criteria5Combined),
];

fn header(metrics: &[DailyMetric]) -> Vec<String> {
    let mut columns = vec!["state".to_string(), "date".to_string()];
    columns.extend(metrics.iter().map(|m| m.column_name()));
    columns
}

/// Full-history table: one row per (state, date), every requested column.
pub fn daily_table(
    name: &str,
    frames: &[DailyGatingFrame],
    metrics: &[DailyMetric],
    excluded: &[String],
) -> Table {
    let mut table = Table::new(name, header(metrics));
    for frame in frames {
        if excluded.iter().any(|e| e == &frame.state) {
            continue;
        }
        for row in 0..frame.len() {
            let mut cells = vec![
                Cell::Text(frame.state.clone()),
                Cell::Date(frame.dates[row]),
            ];
            cells.extend(metrics.iter().map(|m| m.cell(frame, row)));
            table.push_row(cells);
        }
    }
    table
}

/// Latest-date summary: only the row matching the single latest date
/// present anywhere in the frame set, projected to the given columns.
///
/// States without a row on that date are dropped from the view; excluded
/// entities are dropped from the rows but still participate in the
/// latest-date selection.
pub fn state_summary(
    name: &str,
    frames: &[DailyGatingFrame],
    metrics: &[DailyMetric],
    excluded: &[String],
) -> Table {
    let mut table = Table::new(name, header(metrics));
    let Some(latest) = latest_date(frames) else {
        return table;
    };
    for frame in frames {
        if excluded.iter().any(|e| e == &frame.state) {
            continue;
        }
        let Some(row) = DateIndex::new(&frame.dates).and_then(|idx| idx.row(latest)) else {
            continue;
        };
        let mut cells = vec![Cell::Text(frame.state.clone()), Cell::Date(latest)];
        cells.extend(metrics.iter().map(|m| m.cell(frame, row)));
        table.push_row(cells);
    }
    table
}

/// Latest week present anywhere in the weekly frame set.
pub fn latest_week(frames: &[WeeklyIliFrame]) -> Option<NaiveDate> {
    frames
        .iter()
        .filter_map(|f| f.week_ending.last())
        .copied()
        .max()
}

fn ili_header(metrics: &[IliMetric]) -> Vec<String> {
    let mut columns = vec!["region".to_string(), "week_ending".to_string()];
    columns.extend(metrics.iter().map(|m| m.column_name()));
    columns
}

/// Full-history weekly table: one row per (region, week).
pub fn ili_table(
    name: &str,
    frames: &[WeeklyIliFrame],
    metrics: &[IliMetric],
    excluded: &[String],
) -> Table {
    let mut table = Table::new(name, ili_header(metrics));
    for frame in frames {
        if excluded.iter().any(|e| e == &frame.region) {
            continue;
        }
        for row in 0..frame.len() {
            let mut cells = vec![
                Cell::Text(frame.region.clone()),
                Cell::Date(frame.week_ending[row]),
            ];
            cells.extend(metrics.iter().map(|m| m.cell(frame, row)));
            table.push_row(cells);
        }
    }
    table
}

/// Latest-week summary of the ILI frames.
pub fn ili_summary(
    name: &str,
    frames: &[WeeklyIliFrame],
    metrics: &[IliMetric],
    excluded: &[String],
) -> Table {
    let mut table = Table::new(name, ili_header(metrics));
    let Some(latest) = latest_week(frames) else {
        return table;
    };
    for frame in frames {
        if excluded.iter().any(|e| e == &frame.region) {
            continue;
        }
        let Some(row) = frame.week_ending.iter().position(|&w| w == latest) else {
            continue;
        };
        let mut cells = vec![Cell::Text(frame.region.clone()), Cell::Date(latest)];
        cells.extend(metrics.iter().map(|m| m.cell(frame, row)));
        table.push_row(cells);
    }
    table
}

/// Cross-category summary: inner join of the daily and weekly views on the
/// entity key, so entities reported separately in some sources (e.g.
/// territories absent from ILI surveillance) drop out.
pub fn combined_summary(
    name: &str,
    daily: &[DailyGatingFrame],
    weekly: &[WeeklyIliFrame],
    excluded: &[String],
) -> Table {
    let columns = vec![
        "state".to_string(),
        "date".to_string(),
        DailyMetric::Criterion(CriterionId::Criteria1Combined).column_name(),
        DailyMetric::Criterion(CriterionId::Criteria2Combined).column_name(),
        DailyMetric::Criterion(CriterionId::Criteria6).column_name(),
        "week_ending".to_string(),
        IliMetric::Criterion(IliCriterionId::Criteria5Combined).column_name(),
        DailyMetric::Criterion(CriterionId::CriteriaAllCombined).column_name(),
        DailyMetric::Criterion(CriterionId::CriteriaAllCombinedOr).column_name(),
        DailyMetric::Rebound.column_name(),
    ];
    let mut table = Table::new(name, columns);
    let (Some(latest_day), Some(latest_wk)) = (latest_date(daily), latest_week(weekly)) else {
        return table;
    };

    for frame in daily {
        if excluded.iter().any(|e| e == &frame.state) {
            continue;
        }
        let Some(day_row) = DateIndex::new(&frame.dates).and_then(|idx| idx.row(latest_day))
        else {
            continue;
        };
        let Some((ili, week_row)) = weekly.iter().find_map(|w| {
            (w.region == frame.state)
                .then(|| w.week_ending.iter().position(|&d| d == latest_wk).map(|r| (w, r)))
                .flatten()
        }) else {
            continue;
        };

        table.push_row(vec![
            Cell::Text(frame.state.clone()),
            Cell::Date(latest_day),
            DailyMetric::Criterion(CriterionId::Criteria1Combined).cell(frame, day_row),
            DailyMetric::Criterion(CriterionId::Criteria2Combined).cell(frame, day_row),
            DailyMetric::Criterion(CriterionId::Criteria6).cell(frame, day_row),
            Cell::Date(latest_wk),
            IliMetric::Criterion(IliCriterionId::Criteria5Combined).cell(ili, week_row),
            DailyMetric::Criterion(CriterionId::CriteriaAllCombined).cell(frame, day_row),
            DailyMetric::Criterion(CriterionId::CriteriaAllCombinedOr).cell(frame, day_row),
            DailyMetric::Rebound.cell(frame, day_row),
        ]);
    }
    table
}
