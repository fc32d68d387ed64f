use super::config::ScoringConfig;
use super::domain::{round4, SpeciesScore};
use super::habitat::HabitatModel;
use super::observer::{expected_score, observed_score};
use super::plausibility::PlausibilityFilter;
use super::ScoringInputs;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Weighted blend of the observer and habitat expectations, rounded to four places.
///
/// Weights are normalized by their sum. A negative or non-finite weight, or a non-positive sum,
/// yields `0.0`.
pub fn combine_expected(
    observer_expected: f64,
    habitat_expected: f64,
    observer_weight: f64,
    habitat_weight: f64,
) -> f64 {
    round4(blend(
        observer_expected,
        habitat_expected,
        observer_weight,
        habitat_weight,
    ))
}

fn weight_total(observer_weight: f64, habitat_weight: f64) -> Option<f64> {
    let usable = |weight: f64| weight.is_finite() && weight >= 0.0;
    if !usable(observer_weight) || !usable(habitat_weight) {
        return None;
    }

    let total = observer_weight + habitat_weight;
    (total.is_finite() && total > 0.0).then_some(total)
}

fn blend(observer: f64, habitat: f64, observer_weight: f64, habitat_weight: f64) -> f64 {
    let Some(total) = weight_total(observer_weight, habitat_weight) else {
        return 0.0;
    };

    let alpha = observer_weight / total;
    let beta = habitat_weight / total;
    alpha * observer + beta * habitat
}

/// Gap between combined expectation and local observation, floored at zero.
pub fn underreported_gap(combined_expected: f64, observed: f64) -> f64 {
    if combined_expected > 0.0 {
        (combined_expected - observed).max(0.0)
    } else {
        0.0
    }
}

/// Ordered candidate pool; a repeated code keeps its first position.
#[derive(Default)]
struct CandidatePool {
    entries: Vec<(String, String)>,
    positions: HashMap<String, usize>,
}

impl CandidatePool {
    fn upsert(&mut self, species_code: &str, common_name: &str) {
        match self.positions.get(species_code) {
            Some(&position) => self.entries[position].1 = common_name.to_string(),
            None => self.insert_new(species_code, common_name),
        }
    }

    fn insert_if_absent(&mut self, species_code: &str, common_name: &str) {
        if !self.positions.contains_key(species_code) {
            self.insert_new(species_code, common_name);
        }
    }

    fn insert_new(&mut self, species_code: &str, common_name: &str) {
        self.positions
            .insert(species_code.to_string(), self.entries.len());
        self.entries
            .push((species_code.to_string(), common_name.to_string()));
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Builds the under-reported ranking for one target region.
#[derive(Debug, Clone, Default)]
pub struct ScoreRanker {
    config: ScoringConfig,
    habitat: HabitatModel,
}

impl ScoreRanker {
    pub fn new(config: ScoringConfig) -> Self {
        Self {
            config,
            habitat: HabitatModel::default(),
        }
    }

    pub fn with_habitat_model(mut self, habitat: HabitatModel) -> Self {
        self.habitat = habitat;
        self
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score every candidate species and sort by under-reported score, highest first.
    ///
    /// Candidates are, in order: plausible neighbor species, then species seen in the target
    /// region, then species known only from habitat rules. Excluded codes never enter the pool
    /// and equal scores keep that order.
    pub fn rank(&self, inputs: &ScoringInputs) -> Vec<SpeciesScore> {
        let config = &self.config;
        if weight_total(config.observer_weight, config.habitat_weight).is_none() {
            warn!(
                observer_weight = config.observer_weight,
                habitat_weight = config.habitat_weight,
                "expectation weights are unusable; every combined score will be 0"
            );
        }

        let pool = self.candidate_pool(inputs);
        let habitat_scores = self
            .habitat
            .score_all(&inputs.habitat_rules, &inputs.parcels);

        let mut scores: Vec<SpeciesScore> = pool
            .entries
            .into_iter()
            .map(|(species_code, pooled_name)| {
                let (observer_expected, neighbor_name) =
                    expected_score(&species_code, &inputs.neighbors);
                let observed = observed_score(&species_code, &inputs.target);
                let habitat_expected = habitat_scores
                    .get(&species_code)
                    .map(|score| score.habitat_expected_score)
                    .unwrap_or(0.0);

                let combined = blend(
                    observer_expected,
                    habitat_expected,
                    config.observer_weight,
                    config.habitat_weight,
                );
                let underreported = underreported_gap(combined, observed);

                SpeciesScore {
                    common_name: neighbor_name.map(str::to_string).unwrap_or(pooled_name),
                    species_code,
                    observer_expected_score: round4(observer_expected),
                    habitat_expected_score: round4(habitat_expected),
                    combined_expected_score: round4(combined),
                    observed_score: round4(observed),
                    underreported_score: round4(underreported),
                }
            })
            .collect();

        // `sort_by` is stable, so ties keep candidate order.
        scores.sort_by(|left, right| {
            right
                .underreported_score
                .total_cmp(&left.underreported_score)
        });

        info!(
            target_region = %inputs.target.region_id,
            species = scores.len(),
            "ranked under-reported species"
        );

        scores
    }

    fn candidate_pool(&self, inputs: &ScoringInputs) -> CandidatePool {
        let exclusions = &inputs.exclusions;
        let plausible = self.config.apply_plausibility_filter.then(|| {
            PlausibilityFilter::new(self.config.min_counties, self.config.min_observations)
                .passing_species(&inputs.neighbors)
        });

        let mut pool = CandidatePool::default();

        for region in &inputs.neighbors {
            for observation in region.species() {
                let code = observation.species_code.as_str();
                if exclusions.contains(code) {
                    continue;
                }
                if let Some(plausible) = &plausible {
                    if !plausible.contains(code) {
                        continue;
                    }
                }
                pool.upsert(code, &observation.common_name);
            }
        }
        let from_neighbors = pool.len();

        for observation in inputs.target.species() {
            if !exclusions.contains(&observation.species_code) {
                pool.upsert(&observation.species_code, &observation.common_name);
            }
        }
        let from_target = pool.len() - from_neighbors;

        for rule in &inputs.habitat_rules {
            if !exclusions.contains(&rule.species_code) {
                pool.insert_if_absent(&rule.species_code, &rule.common_name);
            }
        }

        debug!(
            from_neighbors,
            from_target,
            from_rules = pool.len() - from_neighbors - from_target,
            excluded = exclusions.len(),
            "candidate pool assembled"
        );

        pool
    }
}
