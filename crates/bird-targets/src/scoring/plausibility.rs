use super::domain::RegionObservations;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// How widely a species shows up across the neighbor regions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NeighborPresence {
    pub county_count: usize,
    pub total_observations: u64,
}

/// Drops neighbor-derived candidates that are too rare to be credible for the target region.
///
/// The filter only sees neighbor data. Exempting species observed in the target region, or
/// known only from habitat rules, is the ranker's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlausibilityFilter {
    pub min_counties: usize,
    pub min_observations: u64,
}

impl PlausibilityFilter {
    pub fn new(min_counties: usize, min_observations: u64) -> Self {
        Self {
            min_counties,
            min_observations,
        }
    }

    pub fn passes(&self, presence: &NeighborPresence) -> bool {
        presence.county_count >= self.min_counties
            || presence.total_observations >= self.min_observations
    }

    /// Codes seen in any neighbor region that clear either threshold.
    pub fn passing_species(&self, neighbors: &[RegionObservations]) -> HashSet<String> {
        let presence = neighbor_presence(neighbors);
        let total = presence.len();

        let passing: HashSet<String> = presence
            .into_iter()
            .filter(|(_, presence)| self.passes(presence))
            .map(|(code, _)| code)
            .collect();

        debug!(
            neighbor_species = total,
            plausible = passing.len(),
            min_counties = self.min_counties,
            min_observations = self.min_observations,
            "plausibility filter evaluated"
        );

        passing
    }
}

/// Per-species county count and summed observations across `neighbors`.
pub fn neighbor_presence(neighbors: &[RegionObservations]) -> HashMap<String, NeighborPresence> {
    let mut presence: HashMap<String, NeighborPresence> = HashMap::new();

    for region in neighbors {
        for observation in region.species() {
            let entry = presence
                .entry(observation.species_code.clone())
                .or_default();
            entry.county_count += 1;
            entry.total_observations = entry
                .total_observations
                .saturating_add(observation.observation_count);
        }
    }

    presence
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::domain::SpeciesObservation;

    fn region(id: &str, species: &[(&str, u64)]) -> RegionObservations {
        RegionObservations::new(
            id,
            id,
            false,
            100,
            species.iter().map(|(code, count)| SpeciesObservation {
                species_code: code.to_string(),
                common_name: code.to_string(),
                observation_count: *count,
            }),
        )
    }

    #[test]
    fn counts_distinct_regions_and_totals() {
        let neighbors = vec![
            region("a", &[("carwre", 10), ("woothr", 2)]),
            region("b", &[("carwre", 12)]),
            region("c", &[("carwre", 3), ("woothr", 1)]),
        ];

        let presence = neighbor_presence(&neighbors);
        assert_eq!(
            presence["carwre"],
            NeighborPresence {
                county_count: 3,
                total_observations: 25,
            }
        );
        assert_eq!(presence["woothr"].county_count, 2);
        assert_eq!(presence["woothr"].total_observations, 3);
    }

    #[test]
    fn totals_saturate_instead_of_overflowing() {
        let neighbors = vec![
            region("a", &[("carwre", u64::MAX - 1)]),
            region("b", &[("carwre", 5)]),
        ];

        let presence = neighbor_presence(&neighbors);
        assert_eq!(presence["carwre"].total_observations, u64::MAX);
        assert!(PlausibilityFilter::new(3, 25).passing_species(&neighbors).contains("carwre"));
    }

    #[test]
    fn passes_on_either_threshold() {
        let filter = PlausibilityFilter::new(3, 25);
        let neighbors = vec![
            region("a", &[("wide", 1), ("heavy", 30), ("vagrant", 1)]),
            region("b", &[("wide", 1)]),
            region("c", &[("wide", 1)]),
        ];

        let passing = filter.passing_species(&neighbors);
        assert!(passing.contains("wide"));
        assert!(passing.contains("heavy"));
        assert!(!passing.contains("vagrant"));
    }

    #[test]
    fn zero_thresholds_admit_everything() {
        let filter = PlausibilityFilter::new(0, 0);
        let neighbors = vec![region("a", &[("rare", 0)])];
        assert!(filter.passing_species(&neighbors).contains("rare"));
    }

    #[test]
    fn empty_neighbors_yield_empty_set() {
        let filter = PlausibilityFilter::new(3, 25);
        assert!(filter.passing_species(&[]).is_empty());
    }
}
