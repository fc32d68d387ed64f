use crate::inputs::Hotspot;
use crate::scoring::PublicLandParcel;
use serde_json::{json, Value};

/// Map layers produced by an export and served by the map router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    PublicLands,
    ChecklistDensity,
    SurveyTargets,
}

impl Layer {
    pub const ALL: [Layer; 3] = [
        Layer::PublicLands,
        Layer::ChecklistDensity,
        Layer::SurveyTargets,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Layer::PublicLands => "public_lands",
            Layer::ChecklistDensity => "checklist_density",
            Layer::SurveyTargets => "survey_targets",
        }
    }

    pub fn file_name(self) -> String {
        format!("{}.geojson", self.name())
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|layer| layer.name() == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

pub fn density_class(checklist_count: u64) -> &'static str {
    if checklist_count >= 800 {
        "high"
    } else if checklist_count >= 300 {
        "medium"
    } else {
        "low"
    }
}

/// Fewer checklists per acre means a higher survey priority.
pub fn survey_priority(coverage_ratio: f64) -> Priority {
    if coverage_ratio < 0.1 {
        Priority::High
    } else if coverage_ratio < 0.2 {
        Priority::Medium
    } else {
        Priority::Low
    }
}

pub fn checklist_density(hotspots: &[Hotspot]) -> Value {
    let features: Vec<Value> = hotspots
        .iter()
        .map(|hotspot| {
            json!({
                "type": "Feature",
                "properties": {
                    "loc_id": hotspot.loc_id,
                    "name": hotspot.name,
                    "checklist_count": hotspot.checklist_count,
                    "density_class": density_class(hotspot.checklist_count),
                },
                "geometry": {
                    "type": "Point",
                    "coordinates": [hotspot.lon, hotspot.lat],
                },
            })
        })
        .collect();

    feature_collection(features)
}

/// Checklists from hotspots whose name mentions the parcel, matched on the parcel name up to `--`.
pub fn checklist_coverage(parcel_name: &str, hotspots: &[Hotspot]) -> u64 {
    let lowered = parcel_name.to_lowercase();
    let needle = lowered.split("--").next().unwrap_or_default();

    hotspots
        .iter()
        .filter(|hotspot| hotspot.name.to_lowercase().contains(needle))
        .map(|hotspot| hotspot.checklist_count)
        .fold(0u64, u64::saturating_add)
}

pub fn survey_targets(parcels: &[PublicLandParcel], hotspots: &[Hotspot]) -> Value {
    let mut ranked: Vec<(Priority, Value)> = parcels
        .iter()
        .map(|parcel| {
            let coverage = checklist_coverage(&parcel.name, hotspots);
            let ratio = if parcel.area_acres > 0.0 {
                coverage as f64 / parcel.area_acres
            } else {
                0.0
            };
            let priority = survey_priority(ratio);

            let feature = json!({
                "type": "Feature",
                "properties": {
                    "name": parcel.name,
                    "type": parcel.land_type,
                    "area_acres": parcel.area_acres,
                    "checklist_coverage": coverage,
                    "survey_priority": priority.as_str(),
                },
                "geometry": parcel.geometry,
            });
            (priority, feature)
        })
        .collect();

    ranked.sort_by_key(|(priority, _)| *priority);
    feature_collection(ranked.into_iter().map(|(_, feature)| feature).collect())
}

fn feature_collection(features: Vec<Value>) -> Value {
    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}
