//! Engine configuration.

use std::time::Duration;

/// Configuration for one transform run.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Spline smoothing parameter for case and testing series. `None`
    /// selects automatically per series; the published convention is 0.5.
    pub smoothing_parameter: Option<f64>,
    /// Number of historical lags in sparkline tables (lag 0 excluded, so
    /// tables carry `num_lags + 1` value columns).
    pub num_lags: usize,
    /// Entities removed from published tables after transformation.
    /// Defaults to American Samoa, which reported no usable testing data.
    pub excluded_entities: Vec<String>,
    /// Suggested pause between successive publish calls, for the
    /// orchestrator that owns rate-limit handling. The engine itself
    /// never sleeps.
    pub publish_delay: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            smoothing_parameter: Some(0.5),
            num_lags: 120,
            excluded_entities: vec!["AS".to_string()],
            publish_delay: Duration::from_secs(20),
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an entity is dropped from published tables.
    pub fn is_excluded(&self, entity: &str) -> bool {
        self.excluded_entities.iter().any(|e| e == entity)
    }
}
