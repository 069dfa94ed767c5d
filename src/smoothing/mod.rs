//! Injected smoothing strategy for denoising observed series.
//!
//! The pipelines never call a spline routine directly: they hold a
//! `&dyn Smoother`, so an alternate fitting implementation can be swapped
//! in without touching pipeline code.

pub mod spline;

use crate::core::TimeSeries;
use crate::error::{GatingError, Result};

pub use spline::{fit_penalized, lambda_for_spar, select_spar, AUTO_SPAR_RANGE};

/// A smoothing strategy: fit a curve through a series and re-evaluate it
/// at the original dates.
///
/// Implementations fit over ordinal positions 0..n-1 (never raw dates) and
/// must return exactly one value per input date, in the same order — no
/// resampling, no extrapolation. The strictly-increasing-dates
/// precondition is enforced by [`TimeSeries`] construction, so a
/// non-monotonic input can never reach an implementation.
pub trait Smoother: Send + Sync {
    /// Smooth the series. `parameter` is implementation-defined; `None`
    /// asks the implementation to choose automatically.
    fn smooth(&self, series: &TimeSeries, parameter: Option<f64>) -> Result<TimeSeries>;
}

/// Production smoother: penalized natural cubic smoothing spline.
///
/// `parameter` is the R-style `spar`; the system-wide convention for
/// case and testing series is 0.5. `None` selects `spar` by generalized
/// cross-validation. Missing observations are replaced with zero before
/// fitting (the spline cannot fit through holes) unless `replace_missing`
/// is disabled, in which case any missing value is an error and the
/// caller must pre-filter.
#[derive(Debug, Clone)]
pub struct SplineSmoother {
    /// Zero-fill missing observations before fitting. Defaults to on.
    pub replace_missing: bool,
}

impl Default for SplineSmoother {
    fn default() -> Self {
        Self {
            replace_missing: true,
        }
    }
}

impl SplineSmoother {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Smoother for SplineSmoother {
    fn smooth(&self, series: &TimeSeries, parameter: Option<f64>) -> Result<TimeSeries> {
        if series.is_empty() {
            return Err(GatingError::EmptyData);
        }
        let values: Vec<f64> = if self.replace_missing {
            crate::transform::zero_filled(series.values())
        } else {
            if series.values().iter().any(|v| v.is_nan()) {
                return Err(GatingError::MissingValues);
            }
            series.values().to_vec()
        };

        let spar = match parameter {
            Some(p) => {
                if !p.is_finite() {
                    return Err(GatingError::InvalidParameter(format!(
                        "smoothing parameter must be finite, got {p}"
                    )));
                }
                p
            }
            None => select_spar(&values),
        };

        let fitted = fit_penalized(&values, lambda_for_spar(values.len(), spar));
        TimeSeries::new(series.dates().to_vec(), fitted)
    }
}
