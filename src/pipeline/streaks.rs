//! Streak counters over named criterion flags.
//!
//! Each published flag carries two trend series: how many consecutive
//! periods it has been continuously met, and continuously failed. Both
//! restart at 1 on every value change.

use crate::transform::boolean_runs;

/// The named daily gating criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CriterionId {
    Criteria1A,
    Criteria1B,
    Criteria1C,
    Criteria1D,
    Criteria1Combined,
    Criteria2A,
    Criteria2B,
    Criteria2C,
    Criteria2D,
    Criteria2Combined,
    Criteria6,
    CriteriaAllCombined,
    CriteriaAllCombinedOr,
}

impl CriterionId {
    /// Every daily criterion, in publish order.
    pub const ALL: [CriterionId; 13] = [
        CriterionId::Criteria1A,
        CriterionId::Criteria1B,
        CriterionId::Criteria1C,
        CriterionId::Criteria1D,
        CriterionId::Criteria1Combined,
        CriterionId::Criteria2A,
        CriterionId::Criteria2B,
        CriterionId::Criteria2C,
        CriterionId::Criteria2D,
        CriterionId::Criteria2Combined,
        CriterionId::Criteria6,
        CriterionId::CriteriaAllCombined,
        CriterionId::CriteriaAllCombinedOr,
    ];

    /// Published column name for the flag itself.
    pub fn label(self) -> &'static str {
        match self {
            CriterionId::Criteria1A => "cdc_criteria_1a_covid_continuous_decline",
            CriterionId::Criteria1B => "cdc_criteria_1b_covid_no_rebounds",
            CriterionId::Criteria1C => "cdc_criteria_1c_covid_overall_decline",
            CriterionId::Criteria1D => "cdc_criteria_1d_covid_near_zero_incidence",
            CriterionId::Criteria1Combined => "cdc_criteria_1_combined",
            CriterionId::Criteria2A => "cdc_criteria_2a_covid_percent_continuous_decline",
            CriterionId::Criteria2B => "cdc_criteria_2b_covid_total_test_volume_increasing",
            CriterionId::Criteria2C => "cdc_criteria_2c_covid_percent_overall_decline",
            CriterionId::Criteria2D => "cdc_criteria_2d_covid_near_zero_positive_tests",
            CriterionId::Criteria2Combined => "cdc_criteria_2_combined",
            CriterionId::Criteria6 => "cdc_criteria_6_max_percent_positive",
            CriterionId::CriteriaAllCombined => "cdc_criteria_all_combined",
            CriterionId::CriteriaAllCombinedOr => "cdc_criteria_all_combined_using_or",
        }
    }
}

/// The named weekly influenza-like-illness criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IliCriterionId {
    Criteria5A,
    Criteria5B,
    Criteria5C,
    Criteria5D,
    Criteria5Combined,
}

impl IliCriterionId {
    /// Every weekly criterion, in publish order.
    pub const ALL: [IliCriterionId; 5] = [
        IliCriterionId::Criteria5A,
        IliCriterionId::Criteria5B,
        IliCriterionId::Criteria5C,
        IliCriterionId::Criteria5D,
        IliCriterionId::Criteria5Combined,
    ];

    /// Published column name for the flag itself.
    pub fn label(self) -> &'static str {
        match self {
            IliCriterionId::Criteria5A => "cdc_criteria_5a_total_ili_continuous_decline",
            IliCriterionId::Criteria5B => "cdc_criteria_5b_total_ili_overall_decline",
            IliCriterionId::Criteria5C => "cdc_criteria_5c_percent_ili_continuous_decline",
            IliCriterionId::Criteria5D => "cdc_criteria_5d_percent_ili_overall_decline",
            IliCriterionId::Criteria5Combined => "cdc_criteria_5_combined",
        }
    }
}

/// Consecutive-met and consecutive-failed counters for one flag.
#[derive(Debug, Clone, PartialEq)]
pub struct Streaks {
    /// Consecutive periods the flag has been continuously true.
    pub met: Vec<u32>,
    /// Consecutive periods the flag has been continuously false.
    pub failed: Vec<u32>,
}

/// Compute both streak counters for a flag series.
pub fn flag_streaks(flags: &[bool]) -> Streaks {
    let runs = boolean_runs(flags);
    Streaks {
        met: runs.truthy,
        failed: runs.falsy,
    }
}

/// Column name for a criterion's consecutive-met streak.
pub fn met_column(label: &str) -> String {
    format!("{label}_consecutive_met")
}

/// Column name for a criterion's consecutive-failed streak.
pub fn failed_column(label: &str) -> String {
    format!("{label}_consecutive_failed")
}
