use crate::scoring::{habitat_rationale, HabitatScore, ScoringInputs, SpeciesScore};

pub const DOSSIER_LIMIT: usize = 5;

/// Species codes become file names, so only plain alphanumeric codes qualify.
pub fn is_valid_species_code(code: &str) -> bool {
    !code.is_empty() && code.chars().all(|c| c.is_ascii_alphanumeric())
}

pub fn dossier_file_name(species_code: &str) -> String {
    format!("{species_code}.md")
}

/// Markdown report for one ranked species.
pub fn species_dossier(
    score: &SpeciesScore,
    inputs: &ScoringInputs,
    habitat: Option<&HabitatScore>,
) -> String {
    let target = &inputs.target.display_name;
    let neighbor_names: Vec<&str> = inputs
        .neighbors
        .iter()
        .map(|region| region.display_name.as_str())
        .collect();

    let mut lines = vec![
        format!("# {} ({})", score.common_name, score.species_code),
        String::new(),
        "## Under-Reported Status".to_string(),
        String::new(),
        format!(
            "This species is identified as **under-reported** in {target} relative to neighboring regions."
        ),
        String::new(),
        "### Scores".to_string(),
        String::new(),
        "| Metric | Value |".to_string(),
        "|--------|-------|".to_string(),
    ];

    for (metric, value) in [
        ("Observer Expected Score", score.observer_expected_score),
        ("Habitat Expected Score", score.habitat_expected_score),
        ("Combined Expected Score", score.combined_expected_score),
        ("Observed Score", score.observed_score),
        ("Under-reported Score", score.underreported_score),
    ] {
        lines.push(format!("| {metric} | {value:.4} |"));
    }

    lines.extend([
        String::new(),
        "## Regional Context".to_string(),
        String::new(),
        format!("**Target Region:** {target}"),
        String::new(),
        "**Adjacent Regions for Comparison:**".to_string(),
    ]);
    lines.extend(neighbor_names.iter().map(|name| format!("- {name}")));

    lines.extend([
        String::new(),
        "## Habitat Analysis".to_string(),
        String::new(),
        match habitat {
            Some(habitat) => habitat_rationale(habitat),
            None => "No habitat rule is defined for this species.".to_string(),
        },
        String::new(),
        "## Interpretation".to_string(),
        String::new(),
        format!(
            "- **Observer Expected Score**: mean reporting rate in adjacent regions ({})",
            neighbor_names.join(", ")
        ),
        "- **Habitat Expected Score**: share of surveyed public land suited to the species"
            .to_string(),
        format!("- **Observed Score**: current reporting rate in {target}"),
        "- **Under-reported Score**: gap between combined expectation and observation (higher = more under-reported)"
            .to_string(),
        String::new(),
        "## Survey Recommendations".to_string(),
        String::new(),
    ]);

    let best_land = habitat.and_then(|habitat| habitat.matches_by_contribution().first().copied());
    let first_step = match best_land {
        Some(best) => format!(
            "1. Start with **{}**, the public land offering the most suitable habitat",
            best.land_name
        ),
        None => "1. Focus surveys on habitats where this species is typically found".to_string(),
    };
    lines.push(first_step);
    lines.push("2. Consider time of day and seasonality for optimal detection".to_string());
    lines.push(format!("3. Prioritize under-surveyed public lands in {target}"));

    let mut doc = lines.join("\n");
    doc.push('\n');
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{
        ExclusionSet, HabitatModel, HabitatRule, PublicLandParcel, RegionObservations,
    };

    fn inputs() -> ScoringInputs {
        ScoringInputs::from_parts(
            RegionObservations::new("US-NC-063", "Durham County", true, 1000, Vec::new()),
            vec![
                RegionObservations::new("US-NC-135", "Orange County", false, 500, Vec::new()),
                RegionObservations::new("US-NC-183", "Wake County", false, 2000, Vec::new()),
            ],
            ExclusionSet::default(),
            vec![HabitatRule {
                species_code: "kenwar".to_string(),
                common_name: "Kentucky Warbler".to_string(),
                required_habitats: ["mature_forest".to_string()].into_iter().collect(),
                rule_weight: 0.7,
            }],
            vec![PublicLandParcel {
                name: "Duke Forest".to_string(),
                land_type: "university_forest".to_string(),
                area_acres: 7000.0,
                habitat_tags: None,
                geometry: serde_json::Value::Null,
            }],
        )
    }

    fn kenwar() -> SpeciesScore {
        SpeciesScore {
            species_code: "kenwar".to_string(),
            common_name: "Kentucky Warbler".to_string(),
            observer_expected_score: 0.0867,
            habitat_expected_score: 0.7,
            combined_expected_score: 0.2707,
            observed_score: 0.01,
            underreported_score: 0.2607,
        }
    }

    #[test]
    fn dossier_carries_scores_regions_and_rationale() {
        let inputs = inputs();
        let habitat = inputs.habitat_scores(&HabitatModel::default());
        let text = species_dossier(&kenwar(), &inputs, habitat.get("kenwar"));

        assert!(text.starts_with("# Kentucky Warbler (kenwar)\n"));
        assert!(text.contains("| Under-reported Score | 0.2607 |"));
        assert!(text.contains("| Observed Score | 0.0100 |"));
        assert!(text.contains("**Target Region:** Durham County"));
        assert!(text.contains("- Orange County\n- Wake County\n"));
        assert!(text.contains("**Habitat Score:** 0.7000 (weight: 0.7)"));
        assert!(text.contains("Start with **Duke Forest**"));
    }

    #[test]
    fn dossier_without_rule_says_so() {
        let text = species_dossier(&kenwar(), &inputs(), None);
        assert!(text.contains("No habitat rule is defined for this species."));
        assert!(text.contains("Focus surveys on habitats"));
    }

    #[test]
    fn species_code_validation() {
        assert!(is_valid_species_code("kenwar"));
        assert!(is_valid_species_code("x00125"));
        assert!(!is_valid_species_code(""));
        assert!(!is_valid_species_code("../etc"));
        assert!(!is_valid_species_code("ken war"));
    }
}
