use crate::scoring::habitat::DEFAULT_RULE_WEIGHT;
use crate::scoring::{HabitatRule, PublicLandParcel, RegionObservations, SpeciesObservation};
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
pub(crate) struct RawObservation {
    species_code: String,
    #[serde(default)]
    common_name: Option<String>,
    #[serde(default)]
    observation_count: u64,
}

impl RawObservation {
    fn into_observation(self) -> SpeciesObservation {
        let common_name = self
            .common_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| self.species_code.clone());

        SpeciesObservation {
            species_code: self.species_code,
            common_name,
            observation_count: self.observation_count,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawRegion {
    #[serde(default, alias = "code")]
    region_code: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    checklists_total: u64,
    #[serde(default)]
    species: Vec<RawObservation>,
}

impl RawRegion {
    pub(crate) fn into_region(self, names: &RegionNames, is_target: bool) -> RegionObservations {
        let display_name = names
            .lookup(&self.region_code)
            .map(str::to_string)
            .or(self.name)
            .unwrap_or_else(|| self.region_code.clone());

        RegionObservations::new(
            self.region_code,
            display_name,
            is_target,
            self.checklists_total,
            self.species.into_iter().map(RawObservation::into_observation),
        )
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawNeighborCollection {
    #[serde(default)]
    pub(crate) regions: Vec<RawRegion>,
}

#[derive(Debug, Deserialize)]
struct RawRegionRef {
    #[serde(alias = "region_code")]
    code: String,
    name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawRegionDirectory {
    target_region: Option<RawRegionRef>,
    #[serde(default)]
    adjacent_regions: Vec<RawRegionRef>,
}

/// Display names from `regions.json`, keyed by region code.
#[derive(Debug, Default)]
pub(crate) struct RegionNames {
    by_code: HashMap<String, String>,
}

impl RegionNames {
    fn lookup(&self, code: &str) -> Option<&str> {
        self.by_code.get(code).map(String::as_str)
    }
}

impl From<RawRegionDirectory> for RegionNames {
    fn from(directory: RawRegionDirectory) -> Self {
        let by_code = directory
            .target_region
            .into_iter()
            .chain(directory.adjacent_regions)
            .map(|region| (region.code, region.name))
            .collect();
        Self { by_code }
    }
}

#[derive(Debug, Deserialize)]
struct RawExcludedSpecies {
    species_code: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawExclusions {
    #[serde(default)]
    excluded_species: Vec<RawExcludedSpecies>,
}

impl RawExclusions {
    pub(crate) fn codes(self) -> impl Iterator<Item = String> {
        self.excluded_species
            .into_iter()
            .map(|species| species.species_code)
    }
}

#[derive(Debug, Deserialize)]
struct RawRule {
    #[serde(default)]
    common_name: Option<String>,
    #[serde(default)]
    habitats: Vec<String>,
    #[serde(default)]
    weight: Option<f64>,
}

/// Builds rules in file order, skipping `_`-prefixed metadata keys before looking at their values.
pub(crate) fn parse_rules(
    raw: serde_json::Map<String, serde_json::Value>,
) -> Result<Vec<HabitatRule>, (String, String)> {
    let mut rules = Vec::with_capacity(raw.len());

    for (species_code, value) in raw {
        if species_code.starts_with('_') {
            continue;
        }

        let rule: RawRule = match serde_json::from_value(value) {
            Ok(rule) => rule,
            Err(err) => return Err((species_code, err.to_string())),
        };

        let rule_weight = rule.weight.unwrap_or(DEFAULT_RULE_WEIGHT);
        if !(0.0..=1.0).contains(&rule_weight) {
            return Err((
                species_code,
                format!("weight {rule_weight} is outside [0, 1]"),
            ));
        }

        rules.push(HabitatRule {
            common_name: rule
                .common_name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| species_code.clone()),
            species_code,
            required_habitats: rule.habitats.into_iter().collect(),
            rule_weight,
        });
    }

    Ok(rules)
}

#[derive(Debug, Default, Deserialize)]
struct RawParcelProperties {
    #[serde(default)]
    name: Option<String>,
    #[serde(default, rename = "type")]
    land_type: Option<String>,
    #[serde(default)]
    area_acres: Option<f64>,
    #[serde(default)]
    habitats: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct RawFeature {
    #[serde(default)]
    properties: RawParcelProperties,
    #[serde(default)]
    geometry: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawFeatureCollection {
    #[serde(default)]
    features: Vec<RawFeature>,
}

impl RawFeatureCollection {
    pub(crate) fn into_parcels(self) -> Result<Vec<PublicLandParcel>, (String, String)> {
        self.features
            .into_iter()
            .map(|feature| {
                let properties = feature.properties;
                let name = properties.name.unwrap_or_else(|| "Unknown".to_string());
                let area_acres = properties.area_acres.unwrap_or(0.0);
                if !area_acres.is_finite() || area_acres < 0.0 {
                    return Err((name, format!("area_acres {area_acres} must be non-negative")));
                }

                Ok(PublicLandParcel {
                    name,
                    land_type: properties.land_type.unwrap_or_default(),
                    area_acres,
                    habitat_tags: properties
                        .habitats
                        .map(|tags| tags.into_iter().collect()),
                    geometry: feature.geometry,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rules_from(value: serde_json::Value) -> Result<Vec<HabitatRule>, (String, String)> {
        match value {
            serde_json::Value::Object(map) => parse_rules(map),
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn rules_keep_file_order_and_skip_metadata() {
        let rules = rules_from(json!({
            "_comment": "metadata, not a species",
            "woothr": {"common_name": "Wood Thrush", "habitats": ["mature_forest"], "weight": 0.7},
            "_version": 2,
            "brdowl": {"habitats": ["riparian", "mature_forest"]}
        }))
        .expect("rules parse");

        let codes: Vec<_> = rules.iter().map(|rule| rule.species_code.as_str()).collect();
        assert_eq!(codes, ["woothr", "brdowl"]);
        assert_eq!(rules[1].common_name, "brdowl");
        assert_eq!(rules[1].rule_weight, DEFAULT_RULE_WEIGHT);
        assert_eq!(rules[1].required_habitats.len(), 2);
    }

    #[test]
    fn rule_weight_out_of_range_is_rejected() {
        let (code, reason) = rules_from(json!({"kenwar": {"habitats": [], "weight": 1.5}}))
            .expect_err("weight rejected");
        assert_eq!(code, "kenwar");
        assert!(reason.contains("1.5"));
    }

    #[test]
    fn non_object_rule_is_rejected() {
        let (code, _) = rules_from(json!({"kenwar": "forest"})).expect_err("shape rejected");
        assert_eq!(code, "kenwar");
    }

    #[test]
    fn parcel_defaults_apply() {
        let collection: RawFeatureCollection = serde_json::from_value(json!({
            "type": "FeatureCollection",
            "features": [{"type": "Feature", "properties": {}, "geometry": null}]
        }))
        .expect("collection parses");

        let parcels = collection.into_parcels().expect("parcels valid");
        assert_eq!(parcels[0].name, "Unknown");
        assert_eq!(parcels[0].land_type, "");
        assert_eq!(parcels[0].area_acres, 0.0);
        assert!(parcels[0].habitat_tags.is_none());
    }

    #[test]
    fn negative_parcel_area_is_rejected() {
        let collection: RawFeatureCollection = serde_json::from_value(json!({
            "features": [{"properties": {"name": "Bad Tract", "area_acres": -4.0}}]
        }))
        .expect("collection parses");

        let (name, _) = collection.into_parcels().expect_err("area rejected");
        assert_eq!(name, "Bad Tract");
    }

    #[test]
    fn region_name_prefers_directory_then_record_then_code() {
        let names = RegionNames::from(RawRegionDirectory {
            target_region: Some(RawRegionRef {
                code: "US-NC-063".to_string(),
                name: "Durham County".to_string(),
            }),
            adjacent_regions: Vec::new(),
        });

        let raw: RawNeighborCollection = serde_json::from_value(json!({
            "regions": [
                {"region_code": "US-NC-063", "name": "Durham"},
                {"region_code": "US-NC-135", "name": "Orange"},
                {"region_code": "US-NC-183"}
            ]
        }))
        .expect("regions parse");

        let display: Vec<_> = raw
            .regions
            .into_iter()
            .map(|region| region.into_region(&names, false).display_name)
            .collect();
        assert_eq!(display, ["Durham County", "Orange", "US-NC-183"]);
    }

    #[test]
    fn missing_checklists_total_is_zero() {
        let raw: RawRegion = serde_json::from_value(json!({
            "region_code": "US-NC-145",
            "species": [{"species_code": "carwre", "common_name": "Carolina Wren", "observation_count": 40}]
        }))
        .expect("region parses");

        let region = raw.into_region(&RegionNames::default(), false);
        assert_eq!(region.checklists_total(), 0);
        assert_eq!(region.normalization_denominator(), 40);
    }
}
