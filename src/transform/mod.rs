//! Series transforms: trailing windows, differencing, run-length analysis.

pub mod runs;
pub mod window;

pub use runs::{boolean_runs, consecutive_run, max_run_in_window, BooleanRuns, RunDirection};
pub use window::{cumulative_any, diff, trailing_max, trailing_mean, trailing_sum, zero_filled};
