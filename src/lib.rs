//! # covid-gating
//!
//! Transform engine for CDC reopening gating criteria over per-state
//! COVID-19 surveillance series.
//!
//! Turns raw daily case/test counts and weekly influenza-like-illness
//! surveillance into boolean criteria flags and the derived metrics they
//! depend on: smoothed trajectories, run-length counters, windowed
//! compliance runs, streaks, and rebound indicators. Extraction of source
//! tables and publishing of result tables are external collaborators; the
//! engine is synchronous, CPU-bound, and free of I/O.

pub mod aggregate;
pub mod config;
pub mod core;
pub mod error;
pub mod pipeline;
pub mod smoothing;
pub mod transform;

pub use config::EngineConfig;
pub use error::{GatingError, Result};

pub mod prelude {
    pub use crate::aggregate::{transform_regions, transform_states, DailyOutcome, WeeklyOutcome};
    pub use crate::config::EngineConfig;
    pub use crate::core::{PopulationTable, RegionWeeklyRecord, StateDailyRecord, TimeSeries};
    pub use crate::error::{GatingError, Result};
    pub use crate::pipeline::{CriterionId, DailyGatingFrame, ReboundStatus, WeeklyIliFrame};
    pub use crate::smoothing::{Smoother, SplineSmoother};
}
