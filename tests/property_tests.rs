//! Property-based tests for the transform primitives.
//!
//! These verify invariants that should hold for all valid inputs, using
//! randomly generated series.

use covid_gating::core::TimeSeries;
use covid_gating::smoothing::{Smoother, SplineSmoother};
use covid_gating::transform::{consecutive_run, max_run_in_window, RunDirection};
use chrono::{Duration, NaiveDate};
use proptest::prelude::*;

/// Values including sign changes, zeros, and missing observations.
fn signed_values_strategy(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(
        prop_oneof![
            4 => -100.0..100.0f64,
            1 => Just(0.0),
            1 => Just(f64::NAN),
        ],
        0..max_len,
    )
}

fn make_series(values: &[f64]) -> TimeSeries {
    let base = NaiveDate::from_ymd_opt(2020, 3, 1).unwrap();
    let dates: Vec<NaiveDate> = (0..values.len())
        .map(|i| base + Duration::days(i as i64))
        .collect();
    TimeSeries::new(dates, values.to_vec()).unwrap()
}

proptest! {
    // ==================== consecutive_run ====================

    #[test]
    fn run_output_length_matches_input(values in signed_values_strategy(80)) {
        for direction in [RunDirection::Positive, RunDirection::Negative] {
            prop_assert_eq!(consecutive_run(&values, direction).len(), values.len());
        }
    }

    #[test]
    fn run_is_zero_iff_criterion_not_met(values in signed_values_strategy(80)) {
        let runs = consecutive_run(&values, RunDirection::Positive);
        for (v, r) in values.iter().zip(&runs) {
            prop_assert_eq!(*r == 0, !(*v > 0.0));
        }
    }

    #[test]
    fn runs_increment_by_exactly_one_until_broken(values in signed_values_strategy(80)) {
        let runs = consecutive_run(&values, RunDirection::Negative);
        for i in 0..runs.len() {
            if runs[i] > 0 {
                let prev = if i == 0 { 0 } else { runs[i - 1] };
                prop_assert_eq!(runs[i], prev + 1);
            }
        }
    }

    // ==================== max_run_in_window ====================

    #[test]
    fn windowed_max_matches_fresh_recomputation(
        values in signed_values_strategy(60),
        window in 1usize..20,
    ) {
        let result = max_run_in_window(&values, RunDirection::Positive, window);
        prop_assert_eq!(result.len(), values.len());
        for i in 0..values.len() {
            if i + 1 < window || window > values.len() {
                prop_assert_eq!(result[i], None);
            } else {
                // Oracle: recompute over exactly the trailing window.
                let slice = &values[i + 1 - window..=i];
                let expected = consecutive_run(slice, RunDirection::Positive)
                    .into_iter()
                    .max()
                    .unwrap_or(0);
                prop_assert_eq!(result[i], Some(expected));
            }
        }
    }

    #[test]
    fn windowed_max_never_exceeds_window(
        values in signed_values_strategy(60),
        window in 1usize..15,
    ) {
        let result = max_run_in_window(&values, RunDirection::Negative, window);
        for r in result.into_iter().flatten() {
            prop_assert!(r as usize <= window);
        }
    }

    // ==================== smoothing ====================

    #[test]
    fn smoothing_preserves_index(
        values in prop::collection::vec(-1000.0..1000.0f64, 3..60),
        spar in 0.0..1.2f64,
    ) {
        let series = make_series(&values);
        let smoothed = SplineSmoother::new().smooth(&series, Some(spar)).unwrap();
        prop_assert_eq!(smoothed.len(), series.len());
        prop_assert_eq!(smoothed.dates(), series.dates());
    }

    #[test]
    fn smoothing_is_deterministic(
        values in prop::collection::vec(-1000.0..1000.0f64, 3..40),
    ) {
        let series = make_series(&values);
        let smoother = SplineSmoother::new();
        let a = smoother.smooth(&series, Some(0.5)).unwrap();
        let b = smoother.smooth(&series, Some(0.5)).unwrap();
        prop_assert_eq!(a.values(), b.values());
    }
}

// ==================== criterion combination laws ====================

/// Identity smoother, so pipeline laws are checked independently of the
/// spline numerics.
struct Passthrough;

impl Smoother for Passthrough {
    fn smooth(
        &self,
        series: &TimeSeries,
        _parameter: Option<f64>,
    ) -> covid_gating::Result<TimeSeries> {
        let filled = covid_gating::transform::zero_filled(series.values());
        TimeSeries::new(series.dates().to_vec(), filled)
    }
}

/// Random daily records: cumulative cases wander upward, increments are
/// occasionally missing or glitched negative.
fn records_strategy() -> impl Strategy<Value = Vec<covid_gating::core::StateDailyRecord>> {
    prop::collection::vec(
        (
            0.0..500.0f64,
            prop::option::weighted(0.9, 0.0..200.0f64),
            prop::option::weighted(0.9, -50.0..2000.0f64),
        ),
        16..70,
    )
    .prop_map(|rows| {
        let base = NaiveDate::from_ymd_opt(2020, 3, 1).unwrap();
        let mut cumulative = 0.0;
        rows.into_iter()
            .enumerate()
            .map(|(i, (new_cases, positive, negative))| {
                cumulative += new_cases;
                covid_gating::core::StateDailyRecord {
                    state: "WY".to_string(),
                    date: base + Duration::days(i as i64),
                    total_cases: Some(cumulative),
                    positive_increase: positive,
                    negative_increase: negative,
                    last_modified: None,
                }
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn combined_criteria_obey_their_laws(records in records_strategy()) {
        let frame = covid_gating::pipeline::transform_state_daily(
            &records,
            1_000_000,
            &Passthrough,
            None,
        )
        .unwrap();

        for i in 0..frame.len() {
            // Category combinators, checked against the component flags
            // rather than how those flags were derived.
            prop_assert_eq!(
                frame.criteria_1_combined[i],
                (frame.criteria_1a[i] && frame.criteria_1b[i] && frame.criteria_1c[i])
                    || frame.criteria_1d[i]
            );
            prop_assert_eq!(
                frame.criteria_2_combined[i],
                (frame.criteria_2a[i] && frame.criteria_2b[i] && frame.criteria_2c[i])
                    || frame.criteria_2d[i]
            );
            prop_assert_eq!(
                frame.criteria_all_combined[i],
                frame.criteria_1_combined[i] && frame.criteria_2_combined[i]
            );
            prop_assert_eq!(
                frame.criteria_all_combined_or[i],
                frame.criteria_1_combined[i] || frame.criteria_2_combined[i]
            );
        }

        // Before any full window exists, windowed criteria cannot hold.
        let warmup = frame.len().min(13);
        for i in 0..warmup {
            prop_assert!(!frame.criteria_1a[i]);
            prop_assert!(!frame.criteria_1b[i]);
            prop_assert!(!frame.criteria_2a[i]);
        }
    }
}
