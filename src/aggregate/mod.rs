//! Cross-state aggregation: parallel per-entity fan-out, lag tables, and
//! summary views.
//!
//! Per-entity pipelines share no mutable state, so they run concurrently
//! under rayon and their independent, immutable frames are merged here at
//! the end. A failed entity is logged and reported alongside the
//! successes; it never publishes a partial row.

pub mod lags;
pub mod metrics;
pub mod summary;

use rayon::prelude::*;
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::core::{PopulationTable, RegionWeeklyRecord, StateDailyRecord};
use crate::error::{GatingError, Result};
use crate::pipeline::{
    transform_region_weekly, transform_state_daily, DailyGatingFrame, WeeklyIliFrame,
};
use crate::smoothing::Smoother;

pub use lags::{lag_table, latest_date};
pub use metrics::{DailyMetric, IliMetric};
pub use summary::{
    combined_summary, daily_table, ili_summary, ili_table, latest_week, state_summary,
    CRITERIA_1_SUMMARY, CRITERIA_2_SUMMARY, CRITERIA_5_SUMMARY, CRITERIA_6_SUMMARY, STATE_SUMMARY,
};

/// One entity whose pipeline aborted, and why.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityFailure {
    pub entity: String,
    pub error: GatingError,
}

/// Result of fanning the daily pipeline out over every state.
#[derive(Debug, Clone)]
pub struct DailyOutcome {
    pub frames: Vec<DailyGatingFrame>,
    pub failures: Vec<EntityFailure>,
}

/// Result of fanning the weekly pipeline out over every region.
#[derive(Debug, Clone)]
pub struct WeeklyOutcome {
    pub frames: Vec<WeeklyIliFrame>,
    pub failures: Vec<EntityFailure>,
}

/// Group rows by entity key, preserving first-appearance order and the
/// source row order within each group. The group order is what the
/// published tables follow.
fn group_rows<T: Clone>(rows: &[T], key: impl Fn(&T) -> &str) -> Vec<(String, Vec<T>)> {
    let mut groups: Vec<(String, Vec<T>)> = Vec::new();
    for row in rows {
        let k = key(row);
        match groups.iter_mut().find(|(name, _)| name == k) {
            Some((_, members)) => members.push(row.clone()),
            None => groups.push((k.to_string(), vec![row.clone()])),
        }
    }
    groups
}

fn split<F>(results: Vec<(String, Result<F>)>) -> (Vec<F>, Vec<EntityFailure>) {
    let mut frames = Vec::new();
    let mut failures = Vec::new();
    for (entity, result) in results {
        match result {
            Ok(frame) => frames.push(frame),
            Err(error) => {
                warn!(entity = %entity, error = %error, "entity pipeline aborted");
                failures.push(EntityFailure { entity, error });
            }
        }
    }
    (frames, failures)
}

/// Apply the daily pipeline independently to every state in the table.
///
/// States run in parallel; each failure aborts only its own state, and the
/// caller decides whether a non-empty failure list should halt the run.
pub fn transform_states(
    records: &[StateDailyRecord],
    populations: &PopulationTable,
    config: &EngineConfig,
    smoother: &dyn Smoother,
) -> DailyOutcome {
    let groups = group_rows(records, |r| &r.state);
    info!(states = groups.len(), rows = records.len(), "transforming daily table");

    let results: Vec<(String, Result<DailyGatingFrame>)> = groups
        .par_iter()
        .map(|(state, rows)| {
            let result = populations
                .get(state)
                .ok_or_else(|| GatingError::MissingPopulation {
                    state: state.clone(),
                })
                .and_then(|population| {
                    transform_state_daily(rows, population, smoother, config.smoothing_parameter)
                });
            (state.clone(), result)
        })
        .collect();

    let (frames, failures) = split(results);
    DailyOutcome { frames, failures }
}

/// Apply the weekly ILI pipeline independently to every region.
pub fn transform_regions(records: &[RegionWeeklyRecord], smoother: &dyn Smoother) -> WeeklyOutcome {
    let groups = group_rows(records, |r| &r.region);
    info!(regions = groups.len(), rows = records.len(), "transforming weekly ILI table");

    let results: Vec<(String, Result<WeeklyIliFrame>)> = groups
        .par_iter()
        .map(|(region, rows)| (region.clone(), transform_region_weekly(rows, smoother)))
        .collect();

    let (frames, failures) = split(results);
    WeeklyOutcome { frames, failures }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TimeSeries;
    use chrono::{Duration, NaiveDate};

    struct Passthrough;

    impl Smoother for Passthrough {
        fn smooth(&self, series: &TimeSeries, _parameter: Option<f64>) -> Result<TimeSeries> {
            TimeSeries::new(
                series.dates().to_vec(),
                crate::transform::zero_filled(series.values()),
            )
        }
    }

    fn day(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 5, 1).unwrap() + Duration::days(offset)
    }

    fn record(state: &str, offset: i64, cumulative: f64) -> StateDailyRecord {
        StateDailyRecord {
            state: state.to_string(),
            date: day(offset),
            total_cases: Some(cumulative),
            positive_increase: Some(2.0),
            negative_increase: Some(8.0),
            last_modified: None,
        }
    }

    fn populations() -> PopulationTable {
        vec![
            ("WY".to_string(), 578_759),
            ("MT".to_string(), 1_068_778),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn states_transform_independently_from_interleaved_rows() {
        // Rows interleaved by date, the usual shape of a daily API dump.
        let records = vec![
            record("WY", 0, 10.0),
            record("MT", 0, 20.0),
            record("WY", 1, 12.0),
            record("MT", 1, 25.0),
            record("WY", 2, 15.0),
            record("MT", 2, 31.0),
        ];
        let outcome = transform_states(
            &records,
            &populations(),
            &EngineConfig::default(),
            &Passthrough,
        );
        assert!(outcome.failures.is_empty());
        assert_eq!(outcome.frames.len(), 2);
        // First-appearance order is preserved.
        assert_eq!(outcome.frames[0].state, "WY");
        assert_eq!(outcome.frames[1].state, "MT");
        assert_eq!(outcome.frames[0].new_cases[1], 2.0);
        assert_eq!(outcome.frames[1].new_cases[2], 6.0);
    }

    #[test]
    fn a_bad_state_fails_alone() {
        let records = vec![
            record("WY", 0, 10.0),
            record("WY", 1, 12.0),
            // MT's dates arrive out of order: precondition violation.
            record("MT", 5, 20.0),
            record("MT", 3, 25.0),
        ];
        let outcome = transform_states(
            &records,
            &populations(),
            &EngineConfig::default(),
            &Passthrough,
        );
        assert_eq!(outcome.frames.len(), 1);
        assert_eq!(outcome.frames[0].state, "WY");
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].entity, "MT");
        assert_eq!(
            outcome.failures[0].error,
            GatingError::NonMonotonicDates { position: 1 }
        );
    }

    #[test]
    fn duplicated_dates_are_an_ambiguous_join() {
        let records = vec![
            record("WY", 0, 10.0),
            record("WY", 1, 12.0),
            record("WY", 1, 13.0),
        ];
        let outcome = transform_states(
            &records,
            &populations(),
            &EngineConfig::default(),
            &Passthrough,
        );
        assert!(outcome.frames.is_empty());
        assert_eq!(
            outcome.failures[0].error,
            GatingError::DuplicateDate { date: day(1) }
        );
    }

    #[test]
    fn missing_population_aborts_only_that_state() {
        let records = vec![record("WY", 0, 10.0), record("GU", 0, 5.0)];
        let outcome = transform_states(
            &records,
            &populations(),
            &EngineConfig::default(),
            &Passthrough,
        );
        assert_eq!(outcome.frames.len(), 1);
        assert_eq!(
            outcome.failures,
            vec![EntityFailure {
                entity: "GU".to_string(),
                error: GatingError::MissingPopulation {
                    state: "GU".to_string()
                },
            }]
        );
    }

    #[test]
    fn regions_fan_out_like_states() {
        let mut records = Vec::new();
        for (region, base) in [("WY", 100.0), ("MT", 300.0)] {
            for i in 0..5u32 {
                records.push(RegionWeeklyRecord {
                    region: region.to_string(),
                    year: 2020,
                    week: 10 + i,
                    percent_ili: Some(3.0 - 0.2 * f64::from(i)),
                    total_ili: Some(base - 10.0 * f64::from(i)),
                    region_type: "States".to_string(),
                });
            }
        }
        let outcome = transform_regions(&records, &Passthrough);
        assert!(outcome.failures.is_empty());
        assert_eq!(outcome.frames.len(), 2);
        assert!(outcome.frames[0].criteria_5_combined[4]);
    }
}
