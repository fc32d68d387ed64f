use super::domain::RegionObservations;

/// Mean reporting rate across the neighbor regions that actually carry `species_code`.
///
/// Regions without the species are left out of both the sum and the count. Zero-denominator
/// regions contribute nothing to the mean either: they are skipped, not averaged in as a `0.0`
/// rate. The returned name comes from the first region that contributed a rate.
pub fn expected_score<'a>(
    species_code: &str,
    neighbors: &'a [RegionObservations],
) -> (f64, Option<&'a str>) {
    let mut total_rate = 0.0;
    let mut region_count = 0usize;
    let mut common_name = None;

    for region in neighbors {
        let denominator = region.normalization_denominator();
        if denominator == 0 {
            continue;
        }

        if let Some(observation) = region.observation(species_code) {
            total_rate += observation.observation_count as f64 / denominator as f64;
            region_count += 1;
            if common_name.is_none() {
                common_name = Some(observation.common_name.as_str());
            }
        }
    }

    if region_count == 0 {
        return (0.0, common_name);
    }

    (total_rate / region_count as f64, common_name)
}

/// Local reporting rate in the target region.
pub fn observed_score(species_code: &str, target: &RegionObservations) -> f64 {
    target.reporting_rate(species_code)
}
