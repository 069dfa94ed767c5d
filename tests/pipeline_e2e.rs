//! End-to-end scenarios through the real spline smoother: multi-state
//! daily fan-out, weekly ILI, summaries, and lag tables.

use chrono::{Duration, NaiveDate};
use covid_gating::aggregate::{
    combined_summary, daily_table, lag_table, state_summary, transform_regions, transform_states,
    DailyMetric, STATE_SUMMARY,
};
use covid_gating::core::{Cell, PopulationTable, RegionWeeklyRecord, StateDailyRecord};
use covid_gating::pipeline::ReboundStatus;
use covid_gating::smoothing::SplineSmoother;
use covid_gating::{EngineConfig, GatingError};

const DAYS: usize = 40;

fn day(offset: i64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 4, 1).unwrap() + Duration::days(offset)
}

/// Flat new cases for 10 days, then a clean monotonic decline to zero.
/// Testing volume held constant at 10% positive.
fn declining_state(state: &str) -> Vec<StateDailyRecord> {
    let mut cumulative = 1000.0;
    (0..DAYS)
        .map(|i| {
            let new = if i == 0 {
                0.0
            } else if i <= 9 {
                50.0
            } else {
                (50.0 - 2.0 * (i as f64 - 9.0)).max(0.0)
            };
            cumulative += new;
            StateDailyRecord {
                state: state.to_string(),
                date: day(i as i64),
                total_cases: Some(cumulative),
                positive_increase: Some(10.0),
                negative_increase: Some(90.0),
                last_modified: Some(day(i as i64)),
            }
        })
        .collect()
}

/// New cases rising linearly; testing volume rising with positivity
/// falling from 30% toward 14%.
fn rising_state(state: &str) -> Vec<StateDailyRecord> {
    let mut cumulative = 5000.0;
    (0..DAYS)
        .map(|i| {
            cumulative += 100.0 + 5.0 * i as f64;
            StateDailyRecord {
                state: state.to_string(),
                date: day(i as i64),
                total_cases: Some(cumulative),
                positive_increase: Some(30.0 + i as f64),
                negative_increase: Some(70.0 + 9.0 * i as f64),
                last_modified: Some(day(i as i64)),
            }
        })
        .collect()
}

fn populations() -> PopulationTable {
    vec![
        ("WY".to_string(), 10_000_000u64),
        ("NY".to_string(), 1_000_000u64),
        ("AS".to_string(), 55_000u64),
        ("TX".to_string(), 29_000_000u64),
    ]
    .into_iter()
    .collect()
}

fn declining_ili(region: &str) -> Vec<RegionWeeklyRecord> {
    (0..10u32)
        .map(|i| RegionWeeklyRecord {
            region: region.to_string(),
            year: 2020,
            week: 10 + i,
            percent_ili: Some(8.0 - 0.5 * f64::from(i)),
            total_ili: Some(800.0 - 50.0 * f64::from(i)),
            region_type: "States".to_string(),
        })
        .collect()
}

#[test]
fn full_run_over_three_states() {
    let mut records = declining_state("WY");
    records.extend(rising_state("NY"));
    records.extend(declining_state("AS"));

    let smoother = SplineSmoother::new();
    let config = EngineConfig::default();
    let outcome = transform_states(&records, &populations(), &config, &smoother);
    assert!(outcome.failures.is_empty());
    assert_eq!(outcome.frames.len(), 3);

    let wy = &outcome.frames[0];
    let ny = &outcome.frames[1];
    assert_eq!(wy.state, "WY");
    assert_eq!(ny.state, "NY");
    assert_eq!(wy.len(), DAYS);
    assert_eq!(wy.dates.first().copied(), Some(day(0)));

    let last = DAYS - 1;

    // WY's sustained decline: once a 14-day window fits inside the
    // decline, criterion 1A holds and stays held.
    assert!(wy.criteria_1a[last]);
    let first_true = wy.criteria_1a.iter().position(|&f| f).unwrap();
    // Cannot hold before the first full 14-day window exists, and holds
    // stably once it does.
    assert!(first_true >= 13);
    assert!(wy.criteria_1a[first_true..].iter().all(|&f| f));
    assert!(wy.criteria_1b[last]);
    assert!(wy.criteria_1c[last]);
    // WY never ran hot relative to its large population, so the
    // near-zero-incidence escape clause never fires.
    assert!(wy.criteria_1d.iter().all(|&f| !f));
    assert!(wy.criteria_1_combined[last]);

    // Constant testing: volume is exactly stable (2B), but positivity
    // never declines (2A/2C) nor reaches near zero (2D).
    assert!(wy.criteria_2b[last]);
    assert!(!wy.criteria_2_combined[last]);
    // Positivity holds at ~10%, comfortably under the 20% ceiling.
    assert!(wy.criteria_6[last]);
    assert_eq!(wy.rebound[last], Some(ReboundStatus::Clear));

    // NY is rising on every axis of category 1...
    assert!(!ny.criteria_1a[last]);
    assert!(!ny.criteria_1b[last]);
    assert!(!ny.criteria_1c[last]);
    assert!(!ny.criteria_1_combined[last]);
    assert_eq!(ny.rebound[last], Some(ReboundStatus::Rebound));
    // ...while its testing picture improves: volume up, positivity in a
    // sustained decline.
    assert!(ny.criteria_2a[last]);
    assert!(ny.criteria_2b[last]);
    assert!(ny.criteria_2c[last]);
    assert!(ny.criteria_2_combined[last]);

    // Combination laws hold under the real smoother too.
    for frame in &outcome.frames {
        for i in 0..frame.len() {
            assert_eq!(
                frame.criteria_1_combined[i],
                (frame.criteria_1a[i] && frame.criteria_1b[i] && frame.criteria_1c[i])
                    || frame.criteria_1d[i]
            );
            assert_eq!(
                frame.criteria_all_combined[i],
                frame.criteria_1_combined[i] && frame.criteria_2_combined[i]
            );
        }
    }

    // Summary view: latest date only, excluded territory dropped after
    // transformation.
    let summary = state_summary(
        "State Summary",
        &outcome.frames,
        STATE_SUMMARY,
        &config.excluded_entities,
    );
    let states: Vec<&Cell> = summary.rows.iter().map(|r| &r[0]).collect();
    assert_eq!(
        states,
        vec![&Cell::Text("WY".to_string()), &Cell::Text("NY".to_string())]
    );
    assert!(summary.rows.iter().all(|r| r[1] == Cell::Date(day(DAYS as i64 - 1))));
    assert_eq!(summary.columns.len(), 2 + STATE_SUMMARY.len());

    // Lag sparkline: oldest-first columns, one row per surviving state.
    let lags = lag_table(
        &outcome.frames,
        DailyMetric::NewCases3dcs,
        7,
        &config.excluded_entities,
    );
    assert_eq!(lags.rows.len(), 2);
    assert_eq!(lags.columns.len(), 2 + 8);
    assert!(lags.columns[2].ends_with("T-7"));
    assert!(lags.columns.last().unwrap().ends_with("T-0"));
    assert!(lags.rows[0].iter().skip(2).all(|c| !c.is_missing()));

    // The all-state-data table carries every date of every surviving
    // state, one fully typed row each.
    let all_data = daily_table(
        "All State Data",
        &outcome.frames,
        &DailyMetric::all(),
        &config.excluded_entities,
    );
    assert_eq!(all_data.rows.len(), 2 * DAYS);
    assert_eq!(all_data.columns.len(), 2 + DailyMetric::all().len());
}

#[test]
fn weekly_ili_joins_the_combined_summary() {
    let mut daily = declining_state("WY");
    daily.extend(rising_state("NY"));
    daily.extend(declining_state("AS"));

    let mut weekly = declining_ili("WY");
    weekly.extend(declining_ili("NY"));
    // AS reports no ILI surveillance at all.

    let smoother = SplineSmoother::new();
    let config = EngineConfig::default();
    let daily_outcome = transform_states(&daily, &populations(), &config, &smoother);
    let weekly_outcome = transform_regions(&weekly, &smoother);
    assert!(weekly_outcome.failures.is_empty());

    let wy_ili = &weekly_outcome.frames[0];
    // Week 10 of 2020 ends Saturday March 7; weeks advance by 7 days.
    assert_eq!(
        wy_ili.week_ending.first().copied(),
        Some(NaiveDate::from_ymd_opt(2020, 3, 7).unwrap())
    );
    assert!(wy_ili
        .week_ending
        .windows(2)
        .all(|w| (w[1] - w[0]).num_days() == 7));
    // A clean ten-week decline satisfies the whole of criterion 5.
    let last_week = wy_ili.len() - 1;
    assert!(wy_ili.criteria_5_combined[last_week]);

    let combined = combined_summary(
        "Combined Summary",
        &daily_outcome.frames,
        &weekly_outcome.frames,
        &config.excluded_entities,
    );
    // Inner join on entity: AS has no ILI frame and is excluded anyway.
    assert_eq!(combined.rows.len(), 2);
    assert_eq!(combined.rows[0][0], Cell::Text("WY".to_string()));
    assert_eq!(combined.rows[1][0], Cell::Text("NY".to_string()));
    // WY: cases pass, testing fails; the OR view differs from the AND.
    assert_eq!(combined.rows[0][2], Cell::Bool(true));
    assert_eq!(combined.rows[0][7], Cell::Bool(false));
    assert_eq!(combined.rows[0][8], Cell::Bool(true));
}

#[test]
fn a_corrupt_state_aborts_alone_and_publishes_nothing() {
    let mut records = declining_state("WY");
    // TX arrives with its two most recent rows swapped.
    let mut tx = declining_state("TX");
    tx.swap(DAYS - 1, DAYS - 2);
    records.extend(tx);

    let smoother = SplineSmoother::new();
    let config = EngineConfig::default();
    let outcome = transform_states(&records, &populations(), &config, &smoother);

    assert_eq!(outcome.frames.len(), 1);
    assert_eq!(outcome.frames[0].state, "WY");
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].entity, "TX");
    assert!(matches!(
        outcome.failures[0].error,
        GatingError::NonMonotonicDates { .. }
    ));

    // Published tables carry no partial TX rows.
    let summary = state_summary("State Summary", &outcome.frames, STATE_SUMMARY, &[]);
    assert_eq!(summary.rows.len(), 1);
    assert_eq!(summary.rows[0][0], Cell::Text("WY".to_string()));
}
