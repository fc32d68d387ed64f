use std::collections::{BTreeMap, BTreeSet};

const STANDARD_LAND_TYPES: &[(&str, &[&str])] = &[
    (
        "university_forest",
        &["mature_forest", "mixed_forest", "riparian"],
    ),
    (
        "state_park",
        &["mature_forest", "mixed_forest", "riparian", "open_fields"],
    ),
    (
        "state_recreation_area",
        &["lake_wetland", "riparian", "open_fields", "mixed_forest"],
    ),
    (
        "regional_park",
        &["mixed_forest", "riparian", "suburban_edge", "open_fields"],
    ),
    ("city_park", &["suburban_edge", "open_fields", "mixed_forest"]),
    (
        "wildlife_refuge",
        &["wetland", "mature_forest", "open_fields", "riparian"],
    ),
    ("nature_preserve", &["mature_forest", "wetland", "riparian"]),
];

const FALLBACK_HABITATS: &[&str] = &["mixed_forest"];

/// Habitat tags assumed for a parcel that does not list its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LandTypeHabitats {
    by_type: BTreeMap<String, BTreeSet<String>>,
    fallback: BTreeSet<String>,
}

impl LandTypeHabitats {
    pub fn standard() -> Self {
        let by_type = STANDARD_LAND_TYPES
            .iter()
            .map(|(land_type, tags)| (land_type.to_string(), to_tag_set(tags)))
            .collect();

        Self {
            by_type,
            fallback: to_tag_set(FALLBACK_HABITATS),
        }
    }

    pub fn with_land_type<I, S>(mut self, land_type: impl Into<String>, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.by_type
            .insert(land_type.into(), tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn tags_for(&self, land_type: &str) -> &BTreeSet<String> {
        self.by_type.get(land_type).unwrap_or(&self.fallback)
    }

    pub fn land_types(&self) -> impl Iterator<Item = &str> {
        self.by_type.keys().map(String::as_str)
    }
}

impl Default for LandTypeHabitats {
    fn default() -> Self {
        Self::standard()
    }
}

fn to_tag_set(tags: &[&str]) -> BTreeSet<String> {
    tags.iter().map(|tag| tag.to_string()).collect()
}
