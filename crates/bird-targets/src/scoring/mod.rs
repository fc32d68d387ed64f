//! Under-reported species scoring.
//!
//! Pure, synchronous computation over already-loaded region, exclusion, habitat-rule and parcel
//! data. Nothing in here performs I/O, and no missing-data case is an error: absent species,
//! missing rules and zero denominators all resolve to `0.0`.

mod config;
mod domain;
pub mod habitat;
pub mod observer;
pub mod plausibility;
mod ranker;

pub use config::{
    ScoringConfig, DEFAULT_HABITAT_WEIGHT, DEFAULT_MIN_COUNTIES, DEFAULT_MIN_OBSERVATIONS,
    DEFAULT_OBSERVER_WEIGHT,
};
pub use domain::{ExclusionSet, RegionObservations, SpeciesObservation, SpeciesScore};
pub use habitat::{
    habitat_rationale, HabitatMatch, HabitatModel, HabitatRule, HabitatScore, LandTypeHabitats,
    PublicLandParcel,
};
pub use plausibility::{NeighborPresence, PlausibilityFilter};
pub use ranker::{combine_expected, underreported_gap, ScoreRanker};

/// Everything the ranker reads for one run.
#[derive(Debug, Clone)]
pub struct ScoringInputs {
    pub target: RegionObservations,
    pub neighbors: Vec<RegionObservations>,
    pub exclusions: ExclusionSet,
    /// Rules in source order; that order decides where rule-only species land on ties.
    pub habitat_rules: Vec<HabitatRule>,
    pub parcels: Vec<PublicLandParcel>,
}

impl ScoringInputs {
    pub fn from_parts(
        target: RegionObservations,
        neighbors: Vec<RegionObservations>,
        exclusions: ExclusionSet,
        habitat_rules: Vec<HabitatRule>,
        parcels: Vec<PublicLandParcel>,
    ) -> Self {
        Self {
            target,
            neighbors,
            exclusions,
            habitat_rules,
            parcels,
        }
    }

    /// Habitat scores for every rule, keyed by species code.
    pub fn habitat_scores(
        &self,
        model: &HabitatModel,
    ) -> std::collections::BTreeMap<String, HabitatScore> {
        model.score_all(&self.habitat_rules, &self.parcels)
    }
}
