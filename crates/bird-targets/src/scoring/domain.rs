use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// One species line inside a region's observation list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesObservation {
    pub species_code: String,
    pub common_name: String,
    pub observation_count: u64,
}

/// Normalized observation counts for a single region.
///
/// Species keep the position of their first occurrence; a repeated code replaces the earlier
/// entry's name and count in place.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionObservations {
    pub region_id: String,
    pub display_name: String,
    pub is_target: bool,
    checklists_total: u64,
    species: Vec<SpeciesObservation>,
    index: HashMap<String, usize>,
}

impl RegionObservations {
    pub fn new<I>(
        region_id: impl Into<String>,
        display_name: impl Into<String>,
        is_target: bool,
        checklists_total: u64,
        observations: I,
    ) -> Self
    where
        I: IntoIterator<Item = SpeciesObservation>,
    {
        let mut species: Vec<SpeciesObservation> = Vec::new();
        let mut index = HashMap::new();

        for observation in observations {
            match index.get(&observation.species_code) {
                Some(&position) => species[position] = observation,
                None => {
                    index.insert(observation.species_code.clone(), species.len());
                    species.push(observation);
                }
            }
        }

        Self {
            region_id: region_id.into(),
            display_name: display_name.into(),
            is_target,
            checklists_total,
            species,
            index,
        }
    }

    /// Checklist count when positive, otherwise the summed observation counts (saturating).
    pub fn normalization_denominator(&self) -> u64 {
        if self.checklists_total > 0 {
            self.checklists_total
        } else {
            self.species
                .iter()
                .map(|observation| observation.observation_count)
                .fold(0u64, u64::saturating_add)
        }
    }

    pub fn checklists_total(&self) -> u64 {
        self.checklists_total
    }

    pub fn species(&self) -> &[SpeciesObservation] {
        &self.species
    }

    pub fn observation(&self, species_code: &str) -> Option<&SpeciesObservation> {
        self.index
            .get(species_code)
            .map(|&position| &self.species[position])
    }

    pub fn contains(&self, species_code: &str) -> bool {
        self.index.contains_key(species_code)
    }

    /// Reporting rate for `species_code`; `0.0` when absent or the denominator is zero.
    pub fn reporting_rate(&self, species_code: &str) -> f64 {
        let denominator = self.normalization_denominator();
        if denominator == 0 {
            return 0.0;
        }

        self.observation(species_code)
            .map(|observation| observation.observation_count as f64 / denominator as f64)
            .unwrap_or(0.0)
    }
}

/// Species codes dropped from every ranking regardless of other signals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    codes: HashSet<String>,
}

impl ExclusionSet {
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            codes: codes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, species_code: &str) -> bool {
        self.codes.contains(species_code)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

/// Ranked output row. Field order doubles as the CSV column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesScore {
    pub species_code: String,
    pub common_name: String,
    pub observer_expected_score: f64,
    pub habitat_expected_score: f64,
    pub combined_expected_score: f64,
    pub observed_score: f64,
    pub underreported_score: f64,
}

pub(crate) fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation(code: &str, count: u64) -> SpeciesObservation {
        SpeciesObservation {
            species_code: code.to_string(),
            common_name: code.to_uppercase(),
            observation_count: count,
        }
    }

    #[test]
    fn denominator_prefers_checklist_total() {
        let region = RegionObservations::new(
            "US-NC-063",
            "Durham",
            true,
            1000,
            vec![observation("carwre", 10)],
        );
        assert_eq!(region.normalization_denominator(), 1000);
        assert_eq!(region.reporting_rate("carwre"), 0.01);
    }

    #[test]
    fn denominator_falls_back_to_observation_sum() {
        let region = RegionObservations::new(
            "US-NC-135",
            "Orange",
            false,
            0,
            vec![observation("carwre", 150), observation("woothr", 50)],
        );
        assert_eq!(region.normalization_denominator(), 200);
        assert_eq!(region.reporting_rate("woothr"), 0.25);
    }

    #[test]
    fn fallback_denominator_saturates_on_huge_counts() {
        let half = u64::MAX / 2 + 1;
        let region = RegionObservations::new(
            "US-NC-077",
            "Granville",
            false,
            0,
            vec![observation("carwre", half), observation("woothr", half)],
        );
        assert_eq!(region.normalization_denominator(), u64::MAX);
        assert!(region.reporting_rate("woothr") > 0.0);
    }

    #[test]
    fn zero_denominator_yields_zero_rate() {
        let region =
            RegionObservations::new("US-NC-001", "Empty", false, 0, vec![observation("x", 0)]);
        assert_eq!(region.normalization_denominator(), 0);
        assert_eq!(region.reporting_rate("x"), 0.0);
        assert_eq!(region.reporting_rate("missing"), 0.0);
    }

    #[test]
    fn duplicate_species_keep_first_position_with_last_values() {
        let region = RegionObservations::new(
            "US-NC-183",
            "Wake",
            false,
            100,
            vec![
                observation("woothr", 5),
                observation("carwre", 20),
                observation("woothr", 9),
            ],
        );

        let codes: Vec<_> = region
            .species()
            .iter()
            .map(|entry| entry.species_code.as_str())
            .collect();
        assert_eq!(codes, ["woothr", "carwre"]);
        assert_eq!(
            region
                .observation("woothr")
                .expect("woothr present")
                .observation_count,
            9
        );
    }

    #[test]
    fn round4_trims_float_noise() {
        assert_eq!(round4(0.7 * 0.8 + 0.3 * 0.0), 0.56);
        assert_eq!(round4(0.123_456), 0.1235);
    }
}
