use crate::infra::parse_weight;
use bird_targets::config::TelemetryConfig;
use bird_targets::error::AppError;
use bird_targets::export::{
    export_all, write_targets_csv, DOSSIERS_DIR, LAYERS_DIR, TARGETS_CSV_FILE,
};
use bird_targets::inputs::Fixtures;
use bird_targets::scoring::{
    ScoreRanker, ScoringConfig, ScoringInputs, SpeciesScore, DEFAULT_HABITAT_WEIGHT,
    DEFAULT_MIN_COUNTIES, DEFAULT_MIN_OBSERVATIONS, DEFAULT_OBSERVER_WEIGHT,
};
use bird_targets::telemetry;
use clap::Args;
use std::path::{Path, PathBuf};

const SUMMARY_ROWS: usize = 5;

#[derive(Args, Debug)]
pub(crate) struct RunArgs {
    /// Directory holding the region, exclusion, public land and hotspot JSON files
    #[arg(long)]
    pub(crate) fixtures: PathBuf,
    /// Output directory (created if missing)
    #[arg(long)]
    pub(crate) out: PathBuf,
    #[command(flatten)]
    pub(crate) scoring: ScoringArgs,
}

#[derive(Args, Debug)]
pub(crate) struct ScoringArgs {
    /// Habitat rules file. Defaults to species_habitat_rules.json in the fixtures directory, if present
    #[arg(long)]
    pub(crate) habitat_rules: Option<PathBuf>,
    /// Relative weight of the neighbor-region expectation
    #[arg(long, default_value_t = DEFAULT_OBSERVER_WEIGHT, value_parser = parse_weight)]
    pub(crate) observer_weight: f64,
    /// Relative weight of the habitat expectation
    #[arg(long, default_value_t = DEFAULT_HABITAT_WEIGHT, value_parser = parse_weight)]
    pub(crate) habitat_weight: f64,
    /// Neighbor regions a species must appear in to count as plausible
    #[arg(long, default_value_t = DEFAULT_MIN_COUNTIES)]
    pub(crate) min_counties: usize,
    /// Total neighbor observations that also make a species plausible
    #[arg(long, default_value_t = DEFAULT_MIN_OBSERVATIONS)]
    pub(crate) min_observations: u64,
    /// Keep every neighbor species, however rare
    #[arg(long)]
    pub(crate) no_plausibility_filter: bool,
}

impl ScoringArgs {
    pub(crate) fn config(&self) -> ScoringConfig {
        ScoringConfig {
            observer_weight: self.observer_weight,
            habitat_weight: self.habitat_weight,
            apply_plausibility_filter: !self.no_plausibility_filter,
            min_counties: self.min_counties,
            min_observations: self.min_observations,
        }
    }
}

pub(crate) fn run_demo(args: RunArgs) -> Result<(), AppError> {
    init_logging()?;
    demo(&args)
}

pub(crate) fn run_export(args: RunArgs) -> Result<(), AppError> {
    init_logging()?;
    export(&args)
}

fn demo(args: &RunArgs) -> Result<(), AppError> {
    ensure_fixtures(&args.fixtures)?;

    let inputs = ScoringInputs::from_dir(&args.fixtures, args.scoring.habitat_rules.as_deref())?;
    let scores = ScoreRanker::new(args.scoring.config()).rank(&inputs);

    let csv_path = args.out.join(TARGETS_CSV_FILE);
    write_targets_csv(&csv_path, &scores)?;
    println!("Wrote {} species to {}", scores.len(), csv_path.display());
    render_top_targets(&scores);

    Ok(())
}

fn export(args: &RunArgs) -> Result<(), AppError> {
    ensure_fixtures(&args.fixtures)?;

    let fixtures = Fixtures::load(&args.fixtures, args.scoring.habitat_rules.as_deref())?;
    let scores = ScoreRanker::new(args.scoring.config()).rank(&fixtures.scoring);

    let csv_path = args.out.join(TARGETS_CSV_FILE);
    write_targets_csv(&csv_path, &scores)?;
    let summary = export_all(&fixtures, &scores, &args.out)?;

    println!("Wrote {} species to {}", scores.len(), csv_path.display());
    println!(
        "Exported {} GeoJSON layers to {}/",
        summary.layers_exported,
        args.out.join(LAYERS_DIR).display()
    );
    println!(
        "Exported {} species dossiers to {}/",
        summary.dossiers_exported,
        args.out.join(DOSSIERS_DIR).display()
    );

    Ok(())
}

fn init_logging() -> Result<(), AppError> {
    telemetry::init(&TelemetryConfig::load())?;
    Ok(())
}

fn ensure_fixtures(path: &Path) -> Result<(), AppError> {
    if path.is_dir() {
        return Ok(());
    }

    Err(AppError::Io(std::io::Error::new(
        std::io::ErrorKind::NotFound,
        format!("fixtures path does not exist: {}", path.display()),
    )))
}

fn render_top_targets(scores: &[SpeciesScore]) {
    let top: Vec<&SpeciesScore> = scores
        .iter()
        .filter(|score| score.underreported_score > 0.0)
        .take(SUMMARY_ROWS)
        .collect();
    if top.is_empty() {
        println!("No under-reported species found.");
        return;
    }

    println!("\nTop under-reported species");
    for (rank, score) in top.iter().enumerate() {
        println!(
            "  {}. {} ({}) gap {:.4} (expected {:.4}, observed {:.4})",
            rank + 1,
            score.common_name,
            score.species_code,
            score.underreported_score,
            score.combined_expected_score,
            score.observed_score
        );
    }
}
