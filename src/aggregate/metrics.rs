//! Typed column identifiers for published tables.
//!
//! Consumers address columns as `(metric, lag)` pairs, never as formatted
//! strings: the string column name is derived in exactly one place, when a
//! table is rendered.

use crate::core::Cell;
use crate::pipeline::streaks::{failed_column, met_column, CriterionId, IliCriterionId};
use crate::pipeline::{DailyGatingFrame, WeeklyIliFrame};

/// A column of the daily gating frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DailyMetric {
    TotalCases,
    PositiveIncrease,
    NegativeIncrease,
    LastModified,
    NewCases,
    NewCasesDiff,
    TotalCases3DayAverage,
    TotalCases3dcs,
    NewCases3DayAverage,
    NewCases3dcs,
    NewCases3dcsDiff,
    ConsecutiveIncreaseNewCases3dcs,
    ConsecutiveDecreaseNewCases3dcs,
    MaxIncreasingRunInWindow,
    MaxDecreasingRunInWindow,
    NewCasesInWindowTotal,
    NewCasesInWindowPer100k,
    BelowIncidenceThreshold,
    PreviouslyElevated,
    NewCasesComparedToWindowAgo3dcs,
    NewTestsTotal,
    NewTestsTotal3DayAverage,
    NewTestsTotal3dcs,
    PositiveTests3DayAverage,
    PositiveTests3dcs,
    PercentPositive,
    PercentPositive3dcs,
    PercentPositiveDiff3dcs,
    NewTestsTotalDiff3dcs,
    MaxDecreasingPercentPositiveRun,
    MaxIncreasingPercentPositiveRun,
    NewTestsComparedToWindowAgo3dcs,
    PercentPositiveComparedToWindowAgo3dcs,
    MaxPercentPositiveInWindow,
    Rebound,
    Criterion(CriterionId),
    StreakMet(CriterionId),
    StreakFailed(CriterionId),
}

impl DailyMetric {
    /// Published column name.
    pub fn column_name(self) -> String {
        match self {
            DailyMetric::TotalCases => "total_cases".to_string(),
            DailyMetric::PositiveIncrease => "positive_increase".to_string(),
            DailyMetric::NegativeIncrease => "negative_increase".to_string(),
            DailyMetric::LastModified => "last_updated".to_string(),
            DailyMetric::NewCases => "new_cases".to_string(),
            DailyMetric::NewCasesDiff => "new_cases_compared_to_yesterday".to_string(),
            DailyMetric::TotalCases3DayAverage => "total_cases_3_day_average".to_string(),
            DailyMetric::TotalCases3dcs => "total_cases_3_day_average_cubic_spline".to_string(),
            DailyMetric::NewCases3DayAverage => "new_cases_3_day_average".to_string(),
            DailyMetric::NewCases3dcs => "new_cases_3_day_average_cubic_spline".to_string(),
            DailyMetric::NewCases3dcsDiff => "new_cases_compared_to_yesterday_3dcs".to_string(),
            DailyMetric::ConsecutiveIncreaseNewCases3dcs => {
                "consecutive_increase_in_new_cases_3dcs".to_string()
            }
            DailyMetric::ConsecutiveDecreaseNewCases3dcs => {
                "consecutive_decrease_in_new_cases_3dcs".to_string()
            }
            DailyMetric::MaxIncreasingRunInWindow => {
                "max_run_of_increasing_new_cases_in_14_day_window_3dcs".to_string()
            }
            DailyMetric::MaxDecreasingRunInWindow => {
                "max_run_of_decreasing_new_cases_in_14_day_window_3dcs".to_string()
            }
            DailyMetric::NewCasesInWindowTotal => "total_new_cases_in_14_day_window".to_string(),
            DailyMetric::NewCasesInWindowPer100k => {
                "total_new_cases_in_14_day_window_per_100k_population".to_string()
            }
            DailyMetric::BelowIncidenceThreshold => {
                "total_new_cases_in_14_day_window_per_100k_population_lower_than_threshold"
                    .to_string()
            }
            DailyMetric::PreviouslyElevated => {
                "total_new_cases_in_14_day_window_per_100k_population_previously_elevated"
                    .to_string()
            }
            DailyMetric::NewCasesComparedToWindowAgo3dcs => {
                "new_cases_compared_to_14_days_ago_3dcs".to_string()
            }
            DailyMetric::NewTestsTotal => "new_tests_total".to_string(),
            DailyMetric::NewTestsTotal3DayAverage => "new_tests_total_3_day_average".to_string(),
            DailyMetric::NewTestsTotal3dcs => "new_tests_total_3dcs".to_string(),
            DailyMetric::PositiveTests3DayAverage => "positive_tests_3_day_average".to_string(),
            DailyMetric::PositiveTests3dcs => "positive_tests_3dcs".to_string(),
            DailyMetric::PercentPositive => "percent_positive_new_tests".to_string(),
            DailyMetric::PercentPositive3dcs => "percent_positive_new_tests_3dcs".to_string(),
            DailyMetric::PercentPositiveDiff3dcs => {
                "percent_positive_new_tests_compared_to_yesterday_3dcs".to_string()
            }
            DailyMetric::NewTestsTotalDiff3dcs => {
                "new_tests_total_compared_to_yesterday_3dcs".to_string()
            }
            DailyMetric::MaxDecreasingPercentPositiveRun => {
                "max_run_of_decreasing_percent_positive_tests_3dcs".to_string()
            }
            DailyMetric::MaxIncreasingPercentPositiveRun => {
                "max_run_of_increasing_percent_positive_tests_3dcs".to_string()
            }
            DailyMetric::NewTestsComparedToWindowAgo3dcs => {
                "new_tests_total_compared_to_14_days_ago_3dcs".to_string()
            }
            DailyMetric::PercentPositiveComparedToWindowAgo3dcs => {
                "percent_positive_compared_to_14_days_ago_3dcs".to_string()
            }
            DailyMetric::MaxPercentPositiveInWindow => {
                "max_percent_positive_in_14_day_window_3dcs".to_string()
            }
            DailyMetric::Rebound => "rebound_indicator".to_string(),
            DailyMetric::Criterion(id) => id.label().to_string(),
            DailyMetric::StreakMet(id) => met_column(id.label()),
            DailyMetric::StreakFailed(id) => failed_column(id.label()),
        }
    }

    /// Cell value at one row of a frame.
    pub fn cell(self, frame: &DailyGatingFrame, row: usize) -> Cell {
        match self {
            DailyMetric::TotalCases => Cell::from_value(frame.total_cases[row]),
            DailyMetric::PositiveIncrease => Cell::from_value(frame.positive_increase[row]),
            DailyMetric::NegativeIncrease => Cell::from_value(frame.negative_increase[row]),
            DailyMetric::LastModified => frame.last_modified[row]
                .map(Cell::Date)
                .unwrap_or(Cell::Missing),
            DailyMetric::NewCases => Cell::from_value(frame.new_cases[row]),
            DailyMetric::NewCasesDiff => Cell::from_value(frame.new_cases_diff[row]),
            DailyMetric::TotalCases3DayAverage => {
                Cell::from_value(frame.total_cases_3_day_average[row])
            }
            DailyMetric::TotalCases3dcs => Cell::from_value(frame.total_cases_3dcs[row]),
            DailyMetric::NewCases3DayAverage => {
                Cell::from_value(frame.new_cases_3_day_average[row])
            }
            DailyMetric::NewCases3dcs => Cell::from_value(frame.new_cases_3dcs[row]),
            DailyMetric::NewCases3dcsDiff => Cell::from_value(frame.new_cases_3dcs_diff[row]),
            DailyMetric::ConsecutiveIncreaseNewCases3dcs => {
                Cell::from(frame.consecutive_increase_new_cases_3dcs[row])
            }
            DailyMetric::ConsecutiveDecreaseNewCases3dcs => {
                Cell::from(frame.consecutive_decrease_new_cases_3dcs[row])
            }
            DailyMetric::MaxIncreasingRunInWindow => {
                Cell::from_count(frame.max_increasing_run_in_window[row])
            }
            DailyMetric::MaxDecreasingRunInWindow => {
                Cell::from_count(frame.max_decreasing_run_in_window[row])
            }
            DailyMetric::NewCasesInWindowTotal => {
                Cell::from_value(frame.new_cases_in_window_total[row])
            }
            DailyMetric::NewCasesInWindowPer100k => {
                Cell::from_value(frame.new_cases_in_window_per_100k[row])
            }
            DailyMetric::BelowIncidenceThreshold => {
                Cell::from(frame.below_incidence_threshold[row])
            }
            DailyMetric::PreviouslyElevated => Cell::from(frame.previously_elevated[row]),
            DailyMetric::NewCasesComparedToWindowAgo3dcs => {
                Cell::from_value(frame.new_cases_compared_to_window_ago_3dcs[row])
            }
            DailyMetric::NewTestsTotal => Cell::from_value(frame.new_tests_total[row]),
            DailyMetric::NewTestsTotal3DayAverage => {
                Cell::from_value(frame.new_tests_total_3_day_average[row])
            }
            DailyMetric::NewTestsTotal3dcs => Cell::from_value(frame.new_tests_total_3dcs[row]),
            DailyMetric::PositiveTests3DayAverage => {
                Cell::from_value(frame.positive_tests_3_day_average[row])
            }
            DailyMetric::PositiveTests3dcs => Cell::from_value(frame.positive_tests_3dcs[row]),
            DailyMetric::PercentPositive => Cell::from_value(frame.percent_positive[row]),
            DailyMetric::PercentPositive3dcs => {
                Cell::from_value(frame.percent_positive_3dcs[row])
            }
            DailyMetric::PercentPositiveDiff3dcs => {
                Cell::from_value(frame.percent_positive_diff_3dcs[row])
            }
            DailyMetric::NewTestsTotalDiff3dcs => {
                Cell::from_value(frame.new_tests_total_diff_3dcs[row])
            }
            DailyMetric::MaxDecreasingPercentPositiveRun => {
                Cell::from_count(frame.max_decreasing_percent_positive_run[row])
            }
            DailyMetric::MaxIncreasingPercentPositiveRun => {
                Cell::from_count(frame.max_increasing_percent_positive_run[row])
            }
            DailyMetric::NewTestsComparedToWindowAgo3dcs => {
                Cell::from_value(frame.new_tests_compared_to_window_ago_3dcs[row])
            }
            DailyMetric::PercentPositiveComparedToWindowAgo3dcs => {
                Cell::from_value(frame.percent_positive_compared_to_window_ago_3dcs[row])
            }
            DailyMetric::MaxPercentPositiveInWindow => {
                Cell::from_value(frame.max_percent_positive_in_window[row])
            }
            DailyMetric::Rebound => frame.rebound[row]
                .map(|status| Cell::Text(status.label().to_string()))
                .unwrap_or(Cell::Missing),
            DailyMetric::Criterion(id) => Cell::from(frame.criterion(id)[row]),
            DailyMetric::StreakMet(id) => Cell::from(frame.criterion_streaks(id).met[row]),
            DailyMetric::StreakFailed(id) => Cell::from(frame.criterion_streaks(id).failed[row]),
        }
    }

    /// Every daily column, in publish order for the all-state-data table.
    pub fn all() -> Vec<DailyMetric> {
        let mut metrics = vec![
            DailyMetric::TotalCases,
            DailyMetric::PositiveIncrease,
            DailyMetric::NegativeIncrease,
            DailyMetric::NewCases,
            DailyMetric::NewCasesDiff,
            DailyMetric::TotalCases3DayAverage,
            DailyMetric::TotalCases3dcs,
            DailyMetric::NewCases3DayAverage,
            DailyMetric::NewCases3dcs,
            DailyMetric::NewCases3dcsDiff,
            DailyMetric::ConsecutiveIncreaseNewCases3dcs,
            DailyMetric::ConsecutiveDecreaseNewCases3dcs,
            DailyMetric::MaxIncreasingRunInWindow,
            DailyMetric::MaxDecreasingRunInWindow,
            DailyMetric::NewCasesInWindowTotal,
            DailyMetric::NewCasesInWindowPer100k,
            DailyMetric::BelowIncidenceThreshold,
            DailyMetric::PreviouslyElevated,
            DailyMetric::NewCasesComparedToWindowAgo3dcs,
            DailyMetric::NewTestsTotal,
            DailyMetric::NewTestsTotal3DayAverage,
            DailyMetric::NewTestsTotal3dcs,
            DailyMetric::PositiveTests3DayAverage,
            DailyMetric::PositiveTests3dcs,
            DailyMetric::PercentPositive,
            DailyMetric::PercentPositive3dcs,
            DailyMetric::PercentPositiveDiff3dcs,
            DailyMetric::NewTestsTotalDiff3dcs,
            DailyMetric::MaxDecreasingPercentPositiveRun,
            DailyMetric::MaxIncreasingPercentPositiveRun,
            DailyMetric::NewTestsComparedToWindowAgo3dcs,
            DailyMetric::PercentPositiveComparedToWindowAgo3dcs,
            DailyMetric::MaxPercentPositiveInWindow,
            DailyMetric::Rebound,
            DailyMetric::LastModified,
        ];
        for id in CriterionId::ALL {
            metrics.push(DailyMetric::Criterion(id));
        }
        for id in CriterionId::ALL {
            metrics.push(DailyMetric::StreakMet(id));
            metrics.push(DailyMetric::StreakFailed(id));
        }
        metrics
    }
}

/// A column of the weekly ILI frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IliMetric {
    Year,
    Week,
    PercentIli,
    TotalIli,
    PercentIliSmoothed,
    PercentIliSmoothedDiff,
    TotalIliSmoothed,
    TotalIliSmoothedDiff,
    ConsecutiveDecreaseTotalIli,
    ConsecutiveDecreasePercentIli,
    MaxDecreasingTotalIliRun,
    MaxDecreasingPercentIliRun,
    TotalIliComparedToWindowAgo,
    PercentIliComparedToWindowAgo,
    Criterion(IliCriterionId),
    StreakMet(IliCriterionId),
    StreakFailed(IliCriterionId),
}

impl IliMetric {
    /// Published column name.
    pub fn column_name(self) -> String {
        match self {
            IliMetric::Year => "year".to_string(),
            IliMetric::Week => "week".to_string(),
            IliMetric::PercentIli => "percent_ili".to_string(),
            IliMetric::TotalIli => "total_ili".to_string(),
            IliMetric::PercentIliSmoothed => "percent_ili_cubic_spline".to_string(),
            IliMetric::PercentIliSmoothedDiff => {
                "percent_ili_compared_to_last_week_cs".to_string()
            }
            IliMetric::TotalIliSmoothed => "total_ili_cubic_spline".to_string(),
            IliMetric::TotalIliSmoothedDiff => "total_ili_compared_to_last_week_cs".to_string(),
            IliMetric::ConsecutiveDecreaseTotalIli => {
                "consecutive_decrease_in_total_ili_cs".to_string()
            }
            IliMetric::ConsecutiveDecreasePercentIli => {
                "consecutive_decrease_in_percent_ili_cs".to_string()
            }
            IliMetric::MaxDecreasingTotalIliRun => {
                "max_run_of_decreasing_total_ili_in_2_week_window_cs".to_string()
            }
            IliMetric::MaxDecreasingPercentIliRun => {
                "max_run_of_decreasing_percent_ili_in_2_week_window_cs".to_string()
            }
            IliMetric::TotalIliComparedToWindowAgo => {
                "total_ili_compared_to_2_weeks_ago".to_string()
            }
            IliMetric::PercentIliComparedToWindowAgo => {
                "percent_ili_compared_to_2_weeks_ago".to_string()
            }
            IliMetric::Criterion(id) => id.label().to_string(),
            IliMetric::StreakMet(id) => met_column(id.label()),
            IliMetric::StreakFailed(id) => failed_column(id.label()),
        }
    }

    /// Cell value at one row of a frame.
    pub fn cell(self, frame: &WeeklyIliFrame, row: usize) -> Cell {
        match self {
            IliMetric::Year => Cell::Int(i64::from(frame.year[row])),
            IliMetric::Week => Cell::Int(i64::from(frame.week[row])),
            IliMetric::PercentIli => Cell::from_value(frame.percent_ili[row]),
            IliMetric::TotalIli => Cell::from_value(frame.total_ili[row]),
            IliMetric::PercentIliSmoothed => Cell::from_value(frame.percent_ili_smoothed[row]),
            IliMetric::PercentIliSmoothedDiff => {
                Cell::from_value(frame.percent_ili_smoothed_diff[row])
            }
            IliMetric::TotalIliSmoothed => Cell::from_value(frame.total_ili_smoothed[row]),
            IliMetric::TotalIliSmoothedDiff => {
                Cell::from_value(frame.total_ili_smoothed_diff[row])
            }
            IliMetric::ConsecutiveDecreaseTotalIli => {
                Cell::from(frame.consecutive_decrease_total_ili[row])
            }
            IliMetric::ConsecutiveDecreasePercentIli => {
                Cell::from(frame.consecutive_decrease_percent_ili[row])
            }
            IliMetric::MaxDecreasingTotalIliRun => {
                Cell::from_count(frame.max_decreasing_total_ili_run[row])
            }
            IliMetric::MaxDecreasingPercentIliRun => {
                Cell::from_count(frame.max_decreasing_percent_ili_run[row])
            }
            IliMetric::TotalIliComparedToWindowAgo => {
                Cell::from_value(frame.total_ili_compared_to_window_ago[row])
            }
            IliMetric::PercentIliComparedToWindowAgo => {
                Cell::from_value(frame.percent_ili_compared_to_window_ago[row])
            }
            IliMetric::Criterion(id) => Cell::from(frame.criterion(id)[row]),
            IliMetric::StreakMet(id) => Cell::from(frame.criterion_streaks(id).met[row]),
            IliMetric::StreakFailed(id) => Cell::from(frame.criterion_streaks(id).failed[row]),
        }
    }

    /// Every weekly column, in publish order for the all-region table.
    pub fn all() -> Vec<IliMetric> {
        let mut metrics = vec![
            IliMetric::Year,
            IliMetric::Week,
            IliMetric::PercentIli,
            IliMetric::TotalIli,
            IliMetric::PercentIliSmoothed,
            IliMetric::PercentIliSmoothedDiff,
            IliMetric::TotalIliSmoothed,
            IliMetric::TotalIliSmoothedDiff,
            IliMetric::ConsecutiveDecreaseTotalIli,
            IliMetric::ConsecutiveDecreasePercentIli,
            IliMetric::MaxDecreasingTotalIliRun,
            IliMetric::MaxDecreasingPercentIliRun,
            IliMetric::TotalIliComparedToWindowAgo,
            IliMetric::PercentIliComparedToWindowAgo,
        ];
        for id in IliCriterionId::ALL {
            metrics.push(IliMetric::Criterion(id));
        }
        for id in IliCriterionId::ALL {
            metrics.push(IliMetric::StreakMet(id));
            metrics.push(IliMetric::StreakFailed(id));
        }
        metrics
    }
}
