//! Per-state daily gating pipeline.
//!
//! Turns one state's chronologically sorted daily records into the derived
//! case and testing columns, the published criteria flags, streak
//! counters, and the textual rebound indicator. Later steps consume
//! earlier derived columns; every stage produces a new series and never
//! mutates its inputs.

use chrono::NaiveDate;
use tracing::debug;

use crate::core::{StateDailyRecord, TimeSeries};
use crate::error::{GatingError, Result};
use crate::pipeline::streaks::{flag_streaks, CriterionId, Streaks};
use crate::smoothing::Smoother;
use crate::transform::{
    consecutive_run, cumulative_any, diff, max_run_in_window, trailing_max, trailing_mean,
    trailing_sum, zero_filled, RunDirection,
};

/// Window, in days, over which the published case and testing criteria are
/// evaluated.
pub const CRITERIA_WINDOW_DAYS: usize = 14;
/// Rolling average span applied before spline smoothing.
pub const SHORT_AVERAGE_DAYS: usize = 3;
/// Criterion 1A: required length of the windowed decreasing run.
pub const SUSTAINED_DECLINE_RUN_DAYS: u32 = 10;
/// Criterion 1B: windowed increasing runs at or above this length are a
/// rebound.
pub const REBOUND_RUN_DAYS: u32 = 5;
/// Criterion 1D: 14-day case total per 100k population at or below this is
/// near-zero incidence.
pub const INCIDENCE_PER_100K_THRESHOLD: f64 = 10.0;
/// Criterion 2A: required length of the windowed percent-positive
/// decreasing run. One more than 1A's; a distinct published rule, not a
/// typo.
pub const PERCENT_POSITIVE_DECLINE_RUN_DAYS: u32 = 11;
/// Criterion 2D: smoothed percent positive (percent scale) at or below
/// this is near-zero positivity.
pub const NEAR_ZERO_PERCENT_POSITIVE: f64 = 1.0;
/// Criterion 6: windowed max smoothed percent positive below this passes.
pub const MAX_PERCENT_POSITIVE_THRESHOLD: f64 = 20.0;
/// Rebound indicator: windowed increasing runs at or above this are
/// "Caution".
pub const CAUTION_RUN_DAYS: u32 = 3;

/// Textual rebound indicator derived from criterion 1D and the 14-day
/// increasing-run count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum ReboundStatus {
    LowCaseCount,
    Clear,
    Caution,
    Rebound,
}

impl ReboundStatus {
    /// Display label used in published tables.
    pub fn label(self) -> &'static str {
        match self {
            ReboundStatus::LowCaseCount => "Low Case Count",
            ReboundStatus::Clear => "Clear",
            ReboundStatus::Caution => "Caution",
            ReboundStatus::Rebound => "Rebound",
        }
    }
}

/// Classify one date's rebound posture.
///
/// Thresholds are evaluated in ascending order and the last matching one
/// wins; a true 1D overrides them all. An undefined run count (no full
/// window yet) yields no classification.
pub fn rebound_status(near_zero_incidence: bool, increasing_run: Option<u32>) -> Option<ReboundStatus> {
    if near_zero_incidence {
        return Some(ReboundStatus::LowCaseCount);
    }
    let run = increasing_run?;
    let mut status = ReboundStatus::Clear;
    for (threshold, candidate) in [
        (CAUTION_RUN_DAYS, ReboundStatus::Caution),
        (REBOUND_RUN_DAYS, ReboundStatus::Rebound),
    ] {
        if run >= threshold {
            status = candidate;
        }
    }
    Some(status)
}

/// Every derived column for one state, aligned index-for-index with
/// `dates`. Computed once per run and never mutated afterward.
#[derive(Debug, Clone)]
pub struct DailyGatingFrame {
    pub state: String,
    pub dates: Vec<NaiveDate>,

    // Raw source columns, carried through for reporting.
    pub total_cases: Vec<f64>,
    pub positive_increase: Vec<f64>,
    pub negative_increase: Vec<f64>,
    pub last_modified: Vec<Option<NaiveDate>>,

    // Criteria category 1: case trajectory.
    pub new_cases: Vec<f64>,
    pub new_cases_diff: Vec<f64>,
    pub total_cases_3_day_average: Vec<f64>,
    pub total_cases_3dcs: Vec<f64>,
    pub new_cases_3_day_average: Vec<f64>,
    pub new_cases_3dcs: Vec<f64>,
    pub new_cases_3dcs_diff: Vec<f64>,
    pub consecutive_increase_new_cases_3dcs: Vec<u32>,
    pub consecutive_decrease_new_cases_3dcs: Vec<u32>,
    pub max_increasing_run_in_window: Vec<Option<u32>>,
    pub max_decreasing_run_in_window: Vec<Option<u32>>,
    pub new_cases_in_window_total: Vec<f64>,
    pub new_cases_in_window_per_100k: Vec<f64>,
    pub below_incidence_threshold: Vec<bool>,
    pub previously_elevated: Vec<bool>,
    pub new_cases_compared_to_window_ago_3dcs: Vec<f64>,
    pub criteria_1a: Vec<bool>,
    pub criteria_1b: Vec<bool>,
    pub criteria_1c: Vec<bool>,
    pub criteria_1d: Vec<bool>,
    pub criteria_1_combined: Vec<bool>,

    // Criteria category 2: testing trajectory.
    pub new_tests_total: Vec<f64>,
    pub new_tests_total_3_day_average: Vec<f64>,
    pub new_tests_total_3dcs: Vec<f64>,
    pub positive_tests_3_day_average: Vec<f64>,
    pub positive_tests_3dcs: Vec<f64>,
    pub percent_positive: Vec<f64>,
    pub percent_positive_3dcs: Vec<f64>,
    pub percent_positive_diff_3dcs: Vec<f64>,
    pub new_tests_total_diff_3dcs: Vec<f64>,
    pub max_decreasing_percent_positive_run: Vec<Option<u32>>,
    pub max_increasing_percent_positive_run: Vec<Option<u32>>,
    pub new_tests_compared_to_window_ago_3dcs: Vec<f64>,
    pub percent_positive_compared_to_window_ago_3dcs: Vec<f64>,
    pub criteria_2a: Vec<bool>,
    pub criteria_2b: Vec<bool>,
    pub criteria_2c: Vec<bool>,
    pub criteria_2d: Vec<bool>,
    pub criteria_2_combined: Vec<bool>,

    // Criterion 6 and overall combinations.
    pub max_percent_positive_in_window: Vec<f64>,
    pub criteria_6: Vec<bool>,
    pub criteria_all_combined: Vec<bool>,
    pub criteria_all_combined_or: Vec<bool>,

    pub rebound: Vec<Option<ReboundStatus>>,
    pub streaks: Vec<(CriterionId, Streaks)>,
}

impl DailyGatingFrame {
    /// Number of dates in the frame.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Flag series for a named criterion.
    pub fn criterion(&self, id: CriterionId) -> &[bool] {
        match id {
            CriterionId::Criteria1A => &self.criteria_1a,
            CriterionId::Criteria1B => &self.criteria_1b,
            CriterionId::Criteria1C => &self.criteria_1c,
            CriterionId::Criteria1D => &self.criteria_1d,
            CriterionId::Criteria1Combined => &self.criteria_1_combined,
            CriterionId::Criteria2A => &self.criteria_2a,
            CriterionId::Criteria2B => &self.criteria_2b,
            CriterionId::Criteria2C => &self.criteria_2c,
            CriterionId::Criteria2D => &self.criteria_2d,
            CriterionId::Criteria2Combined => &self.criteria_2_combined,
            CriterionId::Criteria6 => &self.criteria_6,
            CriterionId::CriteriaAllCombined => &self.criteria_all_combined,
            CriterionId::CriteriaAllCombinedOr => &self.criteria_all_combined_or,
        }
    }

    /// Streak counters for a named criterion.
    pub fn criterion_streaks(&self, id: CriterionId) -> &Streaks {
        self.streaks
            .iter()
            .find(|(c, _)| *c == id)
            .map(|(_, s)| s)
            .expect("streaks computed for every criterion")
    }
}

/// Percent-scale ratio with explicit division-anomaly semantics: a zero,
/// negative, or missing denominator yields missing, never a crash and
/// never zero.
fn percent_ratio(numerator: &[f64], denominator: &[f64]) -> Vec<f64> {
    numerator
        .iter()
        .zip(denominator)
        .map(|(&n, &d)| {
            if n.is_nan() || d.is_nan() || d <= 0.0 {
                f64::NAN
            } else {
                100.0 * n / d
            }
        })
        .collect()
}

fn compare<F>(series: &[f64], predicate: F) -> Vec<bool>
where
    F: Fn(f64) -> bool,
{
    // NaN fails every comparison, so missing values never satisfy a rule.
    series.iter().map(|&v| !v.is_nan() && predicate(v)).collect()
}

/// Run the full daily pipeline for one state.
///
/// `records` must all belong to the same state and be sorted by date;
/// a non-monotonic or duplicated date aborts this state's pipeline.
/// `smoothing_parameter` follows the [`Smoother`] contract (the
/// system-wide convention for case and testing series is 0.5).
pub fn transform_state_daily(
    records: &[StateDailyRecord],
    population: u64,
    smoother: &dyn Smoother,
    smoothing_parameter: Option<f64>,
) -> Result<DailyGatingFrame> {
    let first = records.first().ok_or(GatingError::EmptyData)?;
    let state = first.state.clone();
    if let Some(stray) = records.iter().find(|r| r.state != state) {
        return Err(GatingError::InvalidParameter(format!(
            "records for state {} mixed into {state}'s series",
            stray.state
        )));
    }
    if population == 0 {
        return Err(GatingError::InvalidParameter(format!(
            "population for state {state} must be positive"
        )));
    }

    let dates: Vec<NaiveDate> = records.iter().map(|r| r.date).collect();
    let opt = |f: fn(&StateDailyRecord) -> Option<f64>| -> Vec<f64> {
        records.iter().map(|r| f(r).unwrap_or(f64::NAN)).collect()
    };
    let total_cases = opt(|r| r.total_cases);
    let positive_increase = opt(|r| r.positive_increase);
    let negative_increase = opt(|r| r.negative_increase);
    let last_modified: Vec<Option<NaiveDate>> = records.iter().map(|r| r.last_modified).collect();

    // Validates the date index once; every derived column shares it.
    let index = TimeSeries::new(dates.clone(), total_cases.clone())?;
    let dates = index.dates().to_vec();
    let n = dates.len();

    let smooth = |values: &[f64]| -> Result<Vec<f64>> {
        let series = TimeSeries::new(dates.clone(), values.to_vec())?;
        Ok(smoother.smooth(&series, smoothing_parameter)?.into_values())
    };

    debug!(state = %state, days = n, "transforming daily series");

    // Case trajectory.
    let new_cases = diff(&total_cases, 1);
    let new_cases_diff = diff(&new_cases, 1);

    let total_cases_3_day_average = trailing_mean(&total_cases, SHORT_AVERAGE_DAYS, 1);
    let total_cases_3dcs = smooth(&total_cases_3_day_average)?;

    // The spline cannot fit through holes, so the averaged new-case series
    // is zero-filled before fitting.
    let new_cases_3_day_average = zero_filled(&trailing_mean(&new_cases, SHORT_AVERAGE_DAYS, 1));
    let new_cases_3dcs = smooth(&new_cases_3_day_average)?;

    let new_cases_3dcs_diff = diff(&new_cases_3dcs, 1);
    let consecutive_increase_new_cases_3dcs =
        consecutive_run(&new_cases_3dcs_diff, RunDirection::Positive);
    let consecutive_decrease_new_cases_3dcs =
        consecutive_run(&new_cases_3dcs_diff, RunDirection::Negative);

    let max_decreasing_run_in_window = max_run_in_window(
        &new_cases_3dcs_diff,
        RunDirection::Negative,
        CRITERIA_WINDOW_DAYS,
    );
    let max_increasing_run_in_window = max_run_in_window(
        &new_cases_3dcs_diff,
        RunDirection::Positive,
        CRITERIA_WINDOW_DAYS,
    );

    let criteria_1a: Vec<bool> = max_decreasing_run_in_window
        .iter()
        .map(|r| r.is_some_and(|run| run >= SUSTAINED_DECLINE_RUN_DAYS))
        .collect();
    let criteria_1b: Vec<bool> = max_increasing_run_in_window
        .iter()
        .map(|r| r.is_some_and(|run| run < REBOUND_RUN_DAYS))
        .collect();

    let new_cases_compared_to_window_ago_3dcs = diff(&new_cases_3dcs, CRITERIA_WINDOW_DAYS);
    let criteria_1c = compare(&new_cases_compared_to_window_ago_3dcs, |v| v < 0.0);

    let new_cases_in_window_total =
        trailing_sum(&zero_filled(&new_cases), CRITERIA_WINDOW_DAYS, 1);
    let new_cases_in_window_per_100k: Vec<f64> = new_cases_in_window_total
        .iter()
        .map(|&total| 100_000.0 * total / population as f64)
        .collect();
    let below_incidence_threshold = compare(&new_cases_in_window_per_100k, |v| {
        v <= INCIDENCE_PER_100K_THRESHOLD
    });
    let elevated: Vec<bool> = below_incidence_threshold.iter().map(|&b| !b).collect();
    let previously_elevated = cumulative_any(&elevated);
    // A state that has always been low never triggers 1D; only states that
    // improved into the low regime do.
    let criteria_1d: Vec<bool> = below_incidence_threshold
        .iter()
        .zip(&previously_elevated)
        .map(|(&below, &prior)| below && prior)
        .collect();

    let criteria_1_combined: Vec<bool> = (0..n)
        .map(|i| (criteria_1a[i] && criteria_1b[i] && criteria_1c[i]) || criteria_1d[i])
        .collect();

    // Testing trajectory. Inconclusive results are discarded upstream, so
    // the day's total is positives plus negatives; a negative total is a
    // data artifact and flows missing.
    let new_tests_total: Vec<f64> = positive_increase
        .iter()
        .zip(&negative_increase)
        .map(|(&p, &neg)| {
            let total = p + neg;
            if total < 0.0 {
                f64::NAN
            } else {
                total
            }
        })
        .collect();

    let new_tests_total_3_day_average = trailing_mean(&new_tests_total, SHORT_AVERAGE_DAYS, 1);
    let new_tests_total_3dcs = smooth(&new_tests_total_3_day_average)?;
    let positive_tests_3_day_average = trailing_mean(&positive_increase, SHORT_AVERAGE_DAYS, 1);
    let positive_tests_3dcs = smooth(&positive_tests_3_day_average)?;

    let percent_positive = percent_ratio(&positive_increase, &new_tests_total);
    let percent_positive_3dcs = percent_ratio(&positive_tests_3dcs, &new_tests_total_3dcs);
    let percent_positive_diff_3dcs = diff(&percent_positive_3dcs, 1);
    let new_tests_total_diff_3dcs = diff(&new_tests_total_3dcs, 1);

    let max_decreasing_percent_positive_run = max_run_in_window(
        &percent_positive_diff_3dcs,
        RunDirection::Negative,
        CRITERIA_WINDOW_DAYS,
    );
    let max_increasing_percent_positive_run = max_run_in_window(
        &percent_positive_diff_3dcs,
        RunDirection::Positive,
        CRITERIA_WINDOW_DAYS,
    );

    let criteria_2a: Vec<bool> = max_decreasing_percent_positive_run
        .iter()
        .map(|r| r.is_some_and(|run| run >= PERCENT_POSITIVE_DECLINE_RUN_DAYS))
        .collect();

    let new_tests_compared_to_window_ago_3dcs = diff(&new_tests_total_3dcs, CRITERIA_WINDOW_DAYS);
    let criteria_2b = compare(&new_tests_compared_to_window_ago_3dcs, |v| v >= 0.0);

    let percent_positive_compared_to_window_ago_3dcs =
        diff(&percent_positive_3dcs, CRITERIA_WINDOW_DAYS);
    let criteria_2c = compare(&percent_positive_compared_to_window_ago_3dcs, |v| v < 0.0);

    let criteria_2d = compare(&percent_positive_3dcs, |v| v <= NEAR_ZERO_PERCENT_POSITIVE);

    let criteria_2_combined: Vec<bool> = (0..n)
        .map(|i| (criteria_2a[i] && criteria_2b[i] && criteria_2c[i]) || criteria_2d[i])
        .collect();

    // Criterion 6: the worst positivity seen in the window stays low.
    let max_percent_positive_in_window =
        trailing_max(&percent_positive_3dcs, CRITERIA_WINDOW_DAYS, 1);
    let criteria_6 = compare(&max_percent_positive_in_window, |v| {
        v < MAX_PERCENT_POSITIVE_THRESHOLD
    });

    let criteria_all_combined: Vec<bool> = (0..n)
        .map(|i| criteria_1_combined[i] && criteria_2_combined[i])
        .collect();
    let criteria_all_combined_or: Vec<bool> = (0..n)
        .map(|i| criteria_1_combined[i] || criteria_2_combined[i])
        .collect();

    let rebound: Vec<Option<ReboundStatus>> = (0..n)
        .map(|i| rebound_status(criteria_1d[i], max_increasing_run_in_window[i]))
        .collect();

    let mut frame = DailyGatingFrame {
        state,
        dates,
        total_cases,
        positive_increase,
        negative_increase,
        last_modified,
        new_cases,
        new_cases_diff,
        total_cases_3_day_average,
        total_cases_3dcs,
        new_cases_3_day_average,
        new_cases_3dcs,
        new_cases_3dcs_diff,
        consecutive_increase_new_cases_3dcs,
        consecutive_decrease_new_cases_3dcs,
        max_increasing_run_in_window,
        max_decreasing_run_in_window,
        new_cases_in_window_total,
        new_cases_in_window_per_100k,
        below_incidence_threshold,
        previously_elevated,
        new_cases_compared_to_window_ago_3dcs,
        criteria_1a,
        criteria_1b,
        criteria_1c,
        criteria_1d,
        criteria_1_combined,
        new_tests_total,
        new_tests_total_3_day_average,
        new_tests_total_3dcs,
        positive_tests_3_day_average,
        positive_tests_3dcs,
        percent_positive,
        percent_positive_3dcs,
        percent_positive_diff_3dcs,
        new_tests_total_diff_3dcs,
        max_decreasing_percent_positive_run,
        max_increasing_percent_positive_run,
        new_tests_compared_to_window_ago_3dcs,
        percent_positive_compared_to_window_ago_3dcs,
        criteria_2a,
        criteria_2b,
        criteria_2c,
        criteria_2d,
        criteria_2_combined,
        max_percent_positive_in_window,
        criteria_6,
        criteria_all_combined,
        criteria_all_combined_or,
        rebound,
        streaks: Vec::new(),
    };

    frame.streaks = CriterionId::ALL
        .iter()
        .map(|&id| (id, flag_streaks(frame.criterion(id))))
        .collect();

    Ok(frame)
}
