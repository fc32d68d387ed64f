use super::HabitatScore;

/// Markdown explanation of which public lands drive a habitat score.
pub fn habitat_rationale(score: &HabitatScore) -> String {
    if score.matched_lands.is_empty() {
        return "No suitable habitat identified on public lands.".to_string();
    }

    let mut lines = vec![
        format!(
            "**Habitat Score:** {:.4} (weight: {})",
            score.habitat_expected_score,
            format_weight(score.rule_weight)
        ),
        String::new(),
        "**Matched Public Lands:**".to_string(),
    ];

    for entry in score.matches_by_contribution() {
        lines.push(format!(
            "- **{}** ({}): {} acres",
            entry.land_name,
            entry.land_type,
            with_thousands(entry.area_acres, 0)
        ));
        lines.push(format!("  - Habitats: {}", entry.matched_habitats.join(", ")));
        lines.push(format!(
            "  - Contribution: {}",
            with_thousands(entry.contribution, 1)
        ));
    }

    lines.join("\n")
}

fn format_weight(weight: f64) -> String {
    if weight.fract() == 0.0 {
        format!("{weight:.1}")
    } else {
        weight.to_string()
    }
}

fn with_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (integer, fraction) = match formatted.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (position, digit) in integer.chars().enumerate() {
        if position > 0 && (integer.len() - position) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && formatted.chars().any(|c| c != '0' && c != '.') {
        "-"
    } else {
        ""
    };

    match fraction {
        Some(fraction) => format!("{sign}{grouped}.{fraction}"),
        None => format!("{sign}{grouped}"),
    }
}
