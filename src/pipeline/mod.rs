//! Per-entity transform pipelines for daily case/testing and weekly ILI
//! series.

pub mod daily;
pub mod streaks;
pub mod weekly;

pub use daily::{transform_state_daily, DailyGatingFrame, ReboundStatus};
pub use streaks::{flag_streaks, CriterionId, IliCriterionId, Streaks};
pub use weekly::{transform_region_weekly, week_ending_saturday, WeeklyIliFrame};
