//! Input row contracts supplied by the external extraction stage.
//!
//! The engine never performs HTTP or file I/O: it consumes tables that are
//! already deserialized into these row shapes, with state keys already
//! resolved against the population table's key space.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One row of the daily per-state tracking table.
///
/// `None` fields are missing data, not zero; the transform propagates them
/// as explicit missing markers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateDailyRecord {
    /// State key, shared with the population table.
    pub state: String,
    /// Reporting date.
    pub date: NaiveDate,
    /// Cumulative positive case count.
    pub total_cases: Option<f64>,
    /// Positive test increment for the day.
    pub positive_increase: Option<f64>,
    /// Negative test increment for the day.
    pub negative_increase: Option<f64>,
    /// When the source row was last modified upstream.
    pub last_modified: Option<NaiveDate>,
}

impl StateDailyRecord {
    /// A record with every observation missing, useful in tests.
    pub fn empty(state: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            state: state.into(),
            date,
            total_cases: None,
            positive_increase: None,
            negative_increase: None,
            last_modified: None,
        }
    }
}

/// One row of the weekly influenza-like-illness surveillance table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionWeeklyRecord {
    /// Region key (a state name for state-level surveillance).
    pub region: String,
    /// Surveillance year.
    pub year: i32,
    /// Surveillance week number, 1-based.
    pub week: u32,
    /// Percent of visits for influenza-like illness.
    pub percent_ili: Option<f64>,
    /// Total influenza-like-illness case count.
    pub total_ili: Option<f64>,
    /// Source region granularity (e.g. "States").
    pub region_type: String,
}

/// Static state-name-to-population lookup, loaded once per run.
///
/// Used only to normalize 14-day case totals to a per-100k rate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PopulationTable {
    entries: HashMap<String, u64>,
}

impl PopulationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace one state's population.
    pub fn insert(&mut self, state: impl Into<String>, population: u64) {
        self.entries.insert(state.into(), population);
    }

    /// Population for a state, if known.
    pub fn get(&self, state: &str) -> Option<u64> {
        self.entries.get(state).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, u64)> for PopulationTable {
    fn from_iter<T: IntoIterator<Item = (String, u64)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
