//! Date-indexed series used throughout the transform engine.

use chrono::NaiveDate;

use crate::error::{GatingError, Result};

/// A univariate daily or weekly series for one entity and metric.
///
/// The date index is validated at construction: it must be strictly
/// increasing. An out-of-order date is a precondition violation
/// ([`GatingError::NonMonotonicDates`]) and a repeated date is an ambiguous
/// join key ([`GatingError::DuplicateDate`]); neither is ever repaired by
/// sorting. Missing observations are `f64::NAN`, which is distinct from
/// zero and flows through downstream arithmetic.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl TimeSeries {
    /// Create a series, validating the date index.
    pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(GatingError::LengthMismatch {
                expected: dates.len(),
                got: values.len(),
            });
        }
        for i in 1..dates.len() {
            if dates[i] == dates[i - 1] {
                return Err(GatingError::DuplicateDate { date: dates[i] });
            }
            if dates[i] < dates[i - 1] {
                return Err(GatingError::NonMonotonicDates { position: i });
            }
        }
        Ok(Self { dates, values })
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Check if the series is empty.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// The validated date index.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Observed values, aligned with [`Self::dates`].
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Consume the series, keeping only the values.
    pub fn into_values(self) -> Vec<f64> {
        self.values
    }

    /// Consume the series into its parts.
    pub fn into_parts(self) -> (Vec<NaiveDate>, Vec<f64>) {
        (self.dates, self.values)
    }
}

/// O(1) date-to-row lookup for one entity's series.
///
/// Rows are addressed by ordinal day offset from the series epoch (its
/// first date), so point lookups never scan: a dense offset table is built
/// once and each probe is a single index. Calendar gaps resolve to `None`,
/// which callers surface as a missing value rather than interpolating.
#[derive(Debug, Clone)]
pub struct DateIndex {
    epoch: NaiveDate,
    rows: Vec<Option<usize>>,
}

impl DateIndex {
    /// Build the dense offset table for a strictly increasing date index.
    pub fn new(dates: &[NaiveDate]) -> Option<Self> {
        let (&first, &last) = (dates.first()?, dates.last()?);
        let span = (last - first).num_days() as usize + 1;
        let mut rows = vec![None; span];
        for (row, &date) in dates.iter().enumerate() {
            rows[(date - first).num_days() as usize] = Some(row);
        }
        Some(Self { epoch: first, rows })
    }

    /// Row index holding `date`, if the entity reported on that day.
    pub fn row(&self, date: NaiveDate) -> Option<usize> {
        let offset = (date - self.epoch).num_days();
        if offset < 0 {
            return None;
        }
        self.rows.get(offset as usize).copied().flatten()
    }
}
