//! Loading a fixtures directory into scoring inputs.
//!
//! Every file read here is fatal when missing or malformed, except the habitat rules file, which
//! is optional unless a path is given explicitly.

mod parser;

use crate::scoring::{
    ExclusionSet, HabitatRule, PublicLandParcel, RegionObservations, ScoringInputs,
};
use parser::{
    RawExclusions, RawFeatureCollection, RawNeighborCollection, RawRegion, RawRegionDirectory,
    RegionNames,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const REGIONS_FILE: &str = "regions.json";
pub const TARGET_SPECIES_FILE: &str = "target_species.json";
pub const ADJACENT_SPECIES_FILE: &str = "adjacent_species.json";
pub const EXCLUSIONS_FILE: &str = "exclusions.json";
pub const PUBLIC_LANDS_FILE: &str = "public_lands.json";
pub const HOTSPOTS_FILE: &str = "hotspots.json";
pub const HABITAT_RULES_FILE: &str = "species_habitat_rules.json";

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid habitat rule for {species_code}: {reason}")]
    InvalidRule { species_code: String, reason: String },
    #[error("invalid public land parcel {name:?}: {reason}")]
    InvalidParcel { name: String, reason: String },
}

/// A birding hotspot with its lifetime checklist count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotspot {
    pub loc_id: String,
    pub name: String,
    #[serde(default)]
    pub checklist_count: u64,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Deserialize)]
struct RawHotspots {
    #[serde(default)]
    hotspots: Vec<Hotspot>,
}

/// Everything read from a fixtures directory: the scoring inputs plus the map-only data.
#[derive(Debug, Clone)]
pub struct Fixtures {
    pub scoring: ScoringInputs,
    /// The public lands FeatureCollection exactly as read.
    pub public_lands: serde_json::Value,
    pub hotspots: Vec<Hotspot>,
}

impl Fixtures {
    pub fn load<P: AsRef<Path>>(dir: P, rules_path: Option<&Path>) -> Result<Self, LoadError> {
        let dir = dir.as_ref();
        let (scoring, public_lands) = load_scoring(dir, rules_path)?;
        let hotspots = load_hotspots(dir.join(HOTSPOTS_FILE))?;

        info!(
            fixtures = %dir.display(),
            neighbors = scoring.neighbors.len(),
            rules = scoring.habitat_rules.len(),
            parcels = scoring.parcels.len(),
            hotspots = hotspots.len(),
            "fixtures loaded"
        );

        Ok(Self {
            scoring,
            public_lands,
            hotspots,
        })
    }
}

impl ScoringInputs {
    /// Reads the region, exclusion, rule and parcel files from `dir`.
    pub fn from_dir<P: AsRef<Path>>(dir: P, rules_path: Option<&Path>) -> Result<Self, LoadError> {
        load_scoring(dir.as_ref(), rules_path).map(|(inputs, _)| inputs)
    }
}

fn load_scoring(
    dir: &Path,
    rules_path: Option<&Path>,
) -> Result<(ScoringInputs, serde_json::Value), LoadError> {
    let names = load_region_names(dir.join(REGIONS_FILE))?;
    let target = load_target_region(dir.join(TARGET_SPECIES_FILE), &names)?;
    let neighbors = load_neighbor_regions(dir.join(ADJACENT_SPECIES_FILE), &names)?;
    let exclusions = load_exclusions(dir.join(EXCLUSIONS_FILE))?;

    let habitat_rules = match resolve_rules_path(dir, rules_path) {
        Some(path) => load_habitat_rules(path)?,
        None => {
            debug!(fixtures = %dir.display(), "no habitat rules file; scoring without rules");
            Vec::new()
        }
    };

    let lands_path = dir.join(PUBLIC_LANDS_FILE);
    let public_lands: serde_json::Value = read_json(&lands_path)?;
    let parcels = parse_parcels(&lands_path, &public_lands)?;

    let inputs = ScoringInputs::from_parts(target, neighbors, exclusions, habitat_rules, parcels);
    Ok((inputs, public_lands))
}

/// An explicit path is always used; otherwise the rules file inside `dir`, if present.
fn resolve_rules_path(dir: &Path, explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let candidate = dir.join(HABITAT_RULES_FILE);
            candidate.is_file().then_some(candidate)
        }
    }
}

fn load_region_names<P: AsRef<Path>>(path: P) -> Result<RegionNames, LoadError> {
    let directory: RawRegionDirectory = read_json(path.as_ref())?;
    Ok(RegionNames::from(directory))
}

fn load_target_region<P: AsRef<Path>>(
    path: P,
    names: &RegionNames,
) -> Result<RegionObservations, LoadError> {
    let raw: RawRegion = read_json(path.as_ref())?;
    Ok(raw.into_region(names, true))
}

fn load_neighbor_regions<P: AsRef<Path>>(
    path: P,
    names: &RegionNames,
) -> Result<Vec<RegionObservations>, LoadError> {
    let raw: RawNeighborCollection = read_json(path.as_ref())?;
    Ok(raw
        .regions
        .into_iter()
        .map(|region| region.into_region(names, false))
        .collect())
}

pub fn load_exclusions<P: AsRef<Path>>(path: P) -> Result<ExclusionSet, LoadError> {
    let raw: RawExclusions = read_json(path.as_ref())?;
    Ok(ExclusionSet::new(raw.codes()))
}

/// Rules in file order. Keys starting with `_` are metadata and never become species.
pub fn load_habitat_rules<P: AsRef<Path>>(path: P) -> Result<Vec<HabitatRule>, LoadError> {
    let raw: serde_json::Map<String, serde_json::Value> = read_json(path.as_ref())?;
    parser::parse_rules(raw)
        .map_err(|(species_code, reason)| LoadError::InvalidRule { species_code, reason })
}

pub fn load_public_lands<P: AsRef<Path>>(path: P) -> Result<Vec<PublicLandParcel>, LoadError> {
    let path = path.as_ref();
    let collection: serde_json::Value = read_json(path)?;
    parse_parcels(path, &collection)
}

pub fn load_hotspots<P: AsRef<Path>>(path: P) -> Result<Vec<Hotspot>, LoadError> {
    let raw: RawHotspots = read_json(path.as_ref())?;
    Ok(raw.hotspots)
}

fn parse_parcels(
    path: &Path,
    collection: &serde_json::Value,
) -> Result<Vec<PublicLandParcel>, LoadError> {
    let raw = RawFeatureCollection::deserialize(collection).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    raw.into_parcels()
        .map_err(|(name, reason)| LoadError::InvalidParcel { name, reason })
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })
}
