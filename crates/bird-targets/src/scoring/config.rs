use serde::{Deserialize, Serialize};

pub const DEFAULT_OBSERVER_WEIGHT: f64 = 0.7;
pub const DEFAULT_HABITAT_WEIGHT: f64 = 0.3;
pub const DEFAULT_MIN_COUNTIES: usize = 3;
pub const DEFAULT_MIN_OBSERVATIONS: u64 = 25;

/// Knobs controlling how expectation signals are blended and which neighbor species qualify.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub observer_weight: f64,
    pub habitat_weight: f64,
    pub apply_plausibility_filter: bool,
    pub min_counties: usize,
    pub min_observations: u64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            observer_weight: DEFAULT_OBSERVER_WEIGHT,
            habitat_weight: DEFAULT_HABITAT_WEIGHT,
            apply_plausibility_filter: true,
            min_counties: DEFAULT_MIN_COUNTIES,
            min_observations: DEFAULT_MIN_OBSERVATIONS,
        }
    }
}
