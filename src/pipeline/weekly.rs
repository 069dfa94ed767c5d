//! Weekly influenza-like-illness pipeline.
//!
//! Structural analogue of the daily case pipeline at weekly granularity:
//! two metrics (percent ILI, total ILI) smoothed and differenced
//! independently, with 2-week windows in place of 14-day ones.

use chrono::{Datelike, Duration, NaiveDate};
use tracing::debug;

use crate::core::{RegionWeeklyRecord, TimeSeries};
use crate::error::{GatingError, Result};
use crate::pipeline::streaks::{flag_streaks, IliCriterionId, Streaks};
use crate::smoothing::Smoother;
use crate::transform::{consecutive_run, diff, max_run_in_window, RunDirection};

/// Window, in weeks, over which the ILI criteria are evaluated.
pub const ILI_WINDOW_WEEKS: usize = 2;
/// Criteria 5A/5C: required consecutive weeks of decline in the window.
pub const ILI_DECLINE_RUN_WEEKS: u32 = 2;

/// Saturday ending a surveillance week.
///
/// Weeks are numbered with week 1 as ordinal week 0: Monday-start weeks
/// where all days before the year's first Monday form week 0. Week 1's
/// Saturday anchors the year (landing in the previous December for years
/// opening on a Sunday) and later weeks advance by exactly seven days, so
/// consecutive weeks always map to distinct dates. This must match the
/// published source's week-to-date mapping for joins against daily data.
pub fn week_ending_saturday(year: i32, week: u32) -> Result<NaiveDate> {
    if !(1..=53).contains(&week) {
        return Err(GatingError::InvalidWeek { year, week });
    }
    let jan1 =
        NaiveDate::from_ymd_opt(year, 1, 1).ok_or(GatingError::InvalidWeek { year, week })?;
    let first_weekday = i64::from(jan1.weekday().num_days_from_monday());
    const SATURDAY: i64 = 5; // days from Monday
    let anchor = jan1 + Duration::days(SATURDAY - first_weekday);
    Ok(anchor + Duration::days(7 * (i64::from(week) - 1)))
}

/// Every derived weekly column for one region, aligned index-for-index
/// with `week_ending`.
#[derive(Debug, Clone)]
pub struct WeeklyIliFrame {
    pub region: String,
    pub region_type: String,
    pub week_ending: Vec<NaiveDate>,
    pub year: Vec<i32>,
    pub week: Vec<u32>,

    pub percent_ili: Vec<f64>,
    pub total_ili: Vec<f64>,
    pub percent_ili_smoothed: Vec<f64>,
    pub percent_ili_smoothed_diff: Vec<f64>,
    pub total_ili_smoothed: Vec<f64>,
    pub total_ili_smoothed_diff: Vec<f64>,
    pub consecutive_decrease_total_ili: Vec<u32>,
    pub consecutive_decrease_percent_ili: Vec<u32>,
    pub max_decreasing_total_ili_run: Vec<Option<u32>>,
    pub max_decreasing_percent_ili_run: Vec<Option<u32>>,
    pub total_ili_compared_to_window_ago: Vec<f64>,
    pub percent_ili_compared_to_window_ago: Vec<f64>,

    pub criteria_5a: Vec<bool>,
    pub criteria_5b: Vec<bool>,
    pub criteria_5c: Vec<bool>,
    pub criteria_5d: Vec<bool>,
    pub criteria_5_combined: Vec<bool>,

    pub streaks: Vec<(IliCriterionId, Streaks)>,
}

impl WeeklyIliFrame {
    /// Number of weeks in the frame.
    pub fn len(&self) -> usize {
        self.week_ending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.week_ending.is_empty()
    }

    /// Flag series for a named criterion.
    pub fn criterion(&self, id: IliCriterionId) -> &[bool] {
        match id {
            IliCriterionId::Criteria5A => &self.criteria_5a,
            IliCriterionId::Criteria5B => &self.criteria_5b,
            IliCriterionId::Criteria5C => &self.criteria_5c,
            IliCriterionId::Criteria5D => &self.criteria_5d,
            IliCriterionId::Criteria5Combined => &self.criteria_5_combined,
        }
    }

    /// Streak counters for a named criterion.
    pub fn criterion_streaks(&self, id: IliCriterionId) -> &Streaks {
        self.streaks
            .iter()
            .find(|(c, _)| *c == id)
            .map(|(_, s)| s)
            .expect("streaks computed for every criterion")
    }
}

/// Run the weekly ILI pipeline for one region.
///
/// `records` must all belong to the same region and be sorted by
/// (year, week); the derived week-ending dates are validated like any
/// other series index, so a repeated or out-of-order week aborts the
/// region. ILI series use automatic smoothing-parameter selection.
pub fn transform_region_weekly(
    records: &[RegionWeeklyRecord],
    smoother: &dyn Smoother,
) -> Result<WeeklyIliFrame> {
    let first = records.first().ok_or(GatingError::EmptyData)?;
    let region = first.region.clone();
    let region_type = first.region_type.clone();
    if let Some(stray) = records.iter().find(|r| r.region != region) {
        return Err(GatingError::InvalidParameter(format!(
            "records for region {} mixed into {region}'s series",
            stray.region
        )));
    }

    let week_ending = records
        .iter()
        .map(|r| week_ending_saturday(r.year, r.week))
        .collect::<Result<Vec<NaiveDate>>>()?;
    let year: Vec<i32> = records.iter().map(|r| r.year).collect();
    let week: Vec<u32> = records.iter().map(|r| r.week).collect();
    let percent_ili: Vec<f64> = records
        .iter()
        .map(|r| r.percent_ili.unwrap_or(f64::NAN))
        .collect();
    let total_ili: Vec<f64> = records
        .iter()
        .map(|r| r.total_ili.unwrap_or(f64::NAN))
        .collect();

    // Validates the derived date index once; both metrics share it.
    let index = TimeSeries::new(week_ending.clone(), total_ili.clone())?;
    let week_ending = index.dates().to_vec();
    let n = week_ending.len();

    let smooth = |values: &[f64]| -> Result<Vec<f64>> {
        let series = TimeSeries::new(week_ending.clone(), values.to_vec())?;
        Ok(smoother.smooth(&series, None)?.into_values())
    };

    debug!(region = %region, weeks = n, "transforming weekly ILI series");

    let total_ili_smoothed = smooth(&total_ili)?;
    let total_ili_smoothed_diff = diff(&total_ili_smoothed, 1);
    let percent_ili_smoothed = smooth(&percent_ili)?;
    let percent_ili_smoothed_diff = diff(&percent_ili_smoothed, 1);

    let consecutive_decrease_total_ili =
        consecutive_run(&total_ili_smoothed_diff, RunDirection::Negative);
    let consecutive_decrease_percent_ili =
        consecutive_run(&percent_ili_smoothed_diff, RunDirection::Negative);

    let max_decreasing_total_ili_run = max_run_in_window(
        &total_ili_smoothed_diff,
        RunDirection::Negative,
        ILI_WINDOW_WEEKS,
    );
    let max_decreasing_percent_ili_run = max_run_in_window(
        &percent_ili_smoothed_diff,
        RunDirection::Negative,
        ILI_WINDOW_WEEKS,
    );

    let criteria_5a: Vec<bool> = max_decreasing_total_ili_run
        .iter()
        .map(|r| r.is_some_and(|run| run >= ILI_DECLINE_RUN_WEEKS))
        .collect();
    let criteria_5c: Vec<bool> = max_decreasing_percent_ili_run
        .iter()
        .map(|r| r.is_some_and(|run| run >= ILI_DECLINE_RUN_WEEKS))
        .collect();

    // 5B/5D compare the raw, unsmoothed values against two weeks prior.
    let total_ili_compared_to_window_ago = diff(&total_ili, ILI_WINDOW_WEEKS);
    let criteria_5b: Vec<bool> = total_ili_compared_to_window_ago
        .iter()
        .map(|&v| !v.is_nan() && v < 0.0)
        .collect();
    let percent_ili_compared_to_window_ago = diff(&percent_ili, ILI_WINDOW_WEEKS);
    let criteria_5d: Vec<bool> = percent_ili_compared_to_window_ago
        .iter()
        .map(|&v| !v.is_nan() && v < 0.0)
        .collect();

    let criteria_5_combined: Vec<bool> = (0..n)
        .map(|i| criteria_5a[i] && criteria_5b[i] && criteria_5c[i] && criteria_5d[i])
        .collect();

    let mut frame = WeeklyIliFrame {
        region,
        region_type,
        week_ending,
        year,
        week,
        percent_ili,
        total_ili,
        percent_ili_smoothed,
        percent_ili_smoothed_diff,
        total_ili_smoothed,
        total_ili_smoothed_diff,
        consecutive_decrease_total_ili,
        consecutive_decrease_percent_ili,
        max_decreasing_total_ili_run,
        max_decreasing_percent_ili_run,
        total_ili_compared_to_window_ago,
        percent_ili_compared_to_window_ago,
        criteria_5a,
        criteria_5b,
        criteria_5c,
        criteria_5d,
        criteria_5_combined,
        streaks: Vec::new(),
    };

    frame.streaks = IliCriterionId::ALL
        .iter()
        .map(|&id| (id, flag_streaks(frame.criterion(id))))
        .collect();

    Ok(frame)
}
