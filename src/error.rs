//! Error types for the covid-gating library.

use chrono::NaiveDate;
use thiserror::Error;

/// Result type alias for gating-criteria operations.
pub type Result<T> = std::result::Result<T, GatingError>;

/// Errors that can occur while transforming surveillance series.
///
/// Missing data points and division anomalies are never errors: they flow
/// through every computation as explicit `f64::NAN` markers. Only
/// precondition violations and ambiguous joins abort a series.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatingError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Date index is not sorted in ascending order.
    #[error("dates are not strictly increasing at position {position}")]
    NonMonotonicDates { position: usize },

    /// The same date appears more than once, making (entity, date) lookups
    /// ambiguous.
    #[error("duplicate date {date} in series")]
    DuplicateDate { date: NaiveDate },

    /// Dimension mismatch between parallel arrays.
    #[error("length mismatch: expected {expected}, got {got}")]
    LengthMismatch { expected: usize, got: usize },

    /// Missing values detected when the caller disabled zero-filling.
    #[error("missing values detected in data")]
    MissingValues,

    /// No population figure for a state that appears in the daily table.
    #[error("no population entry for state {state}")]
    MissingPopulation { state: String },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A (year, week) pair outside the supported week-numbering range.
    #[error("invalid surveillance week: year {year}, week {week}")]
    InvalidWeek { year: i32, week: u32 },

    /// Computation error (e.g., numerical issues in the spline solver).
    #[error("computation error: {0}")]
    ComputationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_descriptive() {
        let err = GatingError::EmptyData;
        assert_eq!(err.to_string(), "empty input data");

        let err = GatingError::NonMonotonicDates { position: 3 };
        assert_eq!(
            err.to_string(),
            "dates are not strictly increasing at position 3"
        );

        let err = GatingError::LengthMismatch {
            expected: 5,
            got: 4,
        };
        assert_eq!(err.to_string(), "length mismatch: expected 5, got 4");

        let err = GatingError::MissingPopulation {
            state: "WY".to_string(),
        };
        assert_eq!(err.to_string(), "no population entry for state WY");

        let err = GatingError::InvalidWeek {
            year: 2020,
            week: 0,
        };
        assert_eq!(
            err.to_string(),
            "invalid surveillance week: year 2020, week 0"
        );
    }

    #[test]
    fn errors_are_clonable_and_comparable() {
        let err1 = GatingError::EmptyData;
        let err2 = err1.clone();
        assert_eq!(err1, err2);
    }
}
