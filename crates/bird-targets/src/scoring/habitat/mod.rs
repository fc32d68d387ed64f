//! Habitat-based expectation: how much of the surveyed public land suits a species.
//!
//! Each parcel contributes its area scaled by the fraction of the species' required habitats it
//! offers. The sum is normalized by the area of *all* parcels, matched or not, and capped by the
//! rule weight, so the score reads as "share of available land that is suitable".

mod land_types;
mod rationale;

pub use land_types::LandTypeHabitats;
pub use rationale::habitat_rationale;

use super::domain::round4;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub const DEFAULT_RULE_WEIGHT: f64 = 0.5;

/// Habitat requirements for one species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitatRule {
    pub species_code: String,
    pub common_name: String,
    pub required_habitats: BTreeSet<String>,
    pub rule_weight: f64,
}

/// A public-land parcel as read from the lands FeatureCollection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicLandParcel {
    pub name: String,
    pub land_type: String,
    pub area_acres: f64,
    /// Explicit tags from the parcel properties; `None` means "derive from land type".
    pub habitat_tags: Option<BTreeSet<String>>,
    #[serde(default)]
    pub geometry: serde_json::Value,
}

impl PublicLandParcel {
    /// Explicit tags when present and non-empty, otherwise the land-type defaults.
    pub fn habitat_tags<'a>(&'a self, land_types: &'a LandTypeHabitats) -> &'a BTreeSet<String> {
        match &self.habitat_tags {
            Some(tags) if !tags.is_empty() => tags,
            _ => land_types.tags_for(&self.land_type),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitatMatch {
    pub land_name: String,
    pub land_type: String,
    pub matched_habitats: Vec<String>,
    pub area_acres: f64,
    pub contribution: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitatScore {
    pub species_code: String,
    pub habitat_expected_score: f64,
    /// Matches in parcel order.
    pub matched_lands: Vec<HabitatMatch>,
    pub rule_weight: f64,
}

impl HabitatScore {
    fn empty(rule: &HabitatRule) -> Self {
        Self {
            species_code: rule.species_code.clone(),
            habitat_expected_score: 0.0,
            matched_lands: Vec::new(),
            rule_weight: rule.rule_weight,
        }
    }

    /// Matches ordered by contribution, largest first; equal contributions keep parcel order.
    pub fn matches_by_contribution(&self) -> Vec<&HabitatMatch> {
        let mut matches: Vec<&HabitatMatch> = self.matched_lands.iter().collect();
        matches.sort_by(|left, right| right.contribution.total_cmp(&left.contribution));
        matches
    }
}

/// Scores habitat rules against a parcel inventory using a fixed land-type table.
#[derive(Debug, Clone, Default)]
pub struct HabitatModel {
    land_types: LandTypeHabitats,
}

impl HabitatModel {
    pub fn new(land_types: LandTypeHabitats) -> Self {
        Self { land_types }
    }

    pub fn land_types(&self) -> &LandTypeHabitats {
        &self.land_types
    }

    pub fn score(&self, rule: &HabitatRule, parcels: &[PublicLandParcel]) -> HabitatScore {
        let required = &rule.required_habitats;
        if required.is_empty() {
            return HabitatScore::empty(rule);
        }

        let mut matched_lands = Vec::new();
        let mut total_weighted_area = 0.0;
        let mut max_possible_area = 0.0;

        for parcel in parcels {
            max_possible_area += parcel.area_acres;

            let tags = parcel.habitat_tags(&self.land_types);
            let matched: Vec<String> = required.intersection(tags).cloned().collect();
            if matched.is_empty() {
                continue;
            }

            let match_proportion = matched.len() as f64 / required.len() as f64;
            let contribution = parcel.area_acres * match_proportion;
            total_weighted_area += contribution;

            matched_lands.push(HabitatMatch {
                land_name: parcel.name.clone(),
                land_type: parcel.land_type.clone(),
                matched_habitats: matched,
                area_acres: parcel.area_acres,
                contribution,
            });
        }

        let habitat_expected_score = if max_possible_area > 0.0 {
            (total_weighted_area / max_possible_area) * rule.rule_weight
        } else {
            0.0
        };

        HabitatScore {
            species_code: rule.species_code.clone(),
            habitat_expected_score: round4(habitat_expected_score),
            matched_lands,
            rule_weight: rule.rule_weight,
        }
    }

    /// Score every rule. Species without a rule have no entry.
    pub fn score_all(
        &self,
        rules: &[HabitatRule],
        parcels: &[PublicLandParcel],
    ) -> BTreeMap<String, HabitatScore> {
        rules
            .iter()
            .map(|rule| (rule.species_code.clone(), self.score(rule, parcels)))
            .collect()
    }
}
