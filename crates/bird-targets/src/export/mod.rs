//! Writes rankings and map artifacts to an output directory.

mod dossier;
mod layers;
mod targets_csv;

pub use dossier::{
    dossier_file_name, is_valid_species_code, species_dossier, DOSSIER_LIMIT,
};
pub use layers::{
    checklist_coverage, checklist_density, density_class, survey_priority, survey_targets, Layer,
    Priority,
};
pub use targets_csv::{
    read_targets, read_targets_csv, write_targets, write_targets_csv, TARGETS_CSV_FILE,
};

use crate::inputs::Fixtures;
use crate::scoring::{HabitatModel, SpeciesScore};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const LAYERS_DIR: &str = "layers";
pub const DOSSIERS_DIR: &str = "species_dossiers";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid CSV data in {}: {source}", .path.display())]
    Csv { path: PathBuf, source: csv::Error },
    #[error("failed to encode {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl ExportError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn csv(path: &Path, source: csv::Error) -> Self {
        Self::Csv {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExportSummary {
    pub layers_exported: usize,
    pub dossiers_exported: usize,
}

/// Writes every map layer and the dossiers for the top-ranked under-reported species.
///
/// `scores` must already be ranked. Files are overwritten; output is byte-identical for
/// identical inputs.
pub fn export_all<P: AsRef<Path>>(
    fixtures: &Fixtures,
    scores: &[SpeciesScore],
    out_dir: P,
) -> Result<ExportSummary, ExportError> {
    let out_dir = out_dir.as_ref();
    let layers_dir = out_dir.join(LAYERS_DIR);
    let dossiers_dir = out_dir.join(DOSSIERS_DIR);
    create_dir(&layers_dir)?;
    create_dir(&dossiers_dir)?;

    let mut layers_exported = 0;
    for layer in Layer::ALL {
        let collection = match layer {
            Layer::PublicLands => fixtures.public_lands.clone(),
            Layer::ChecklistDensity => checklist_density(&fixtures.hotspots),
            Layer::SurveyTargets => survey_targets(&fixtures.scoring.parcels, &fixtures.hotspots),
        };
        write_json(&layers_dir.join(layer.file_name()), &collection)?;
        layers_exported += 1;
    }

    let habitat_scores = fixtures.scoring.habitat_scores(&HabitatModel::default());
    let mut dossiers_exported = 0;
    for score in scores
        .iter()
        .take(DOSSIER_LIMIT)
        .filter(|score| score.underreported_score > 0.0)
    {
        if !is_valid_species_code(&score.species_code) {
            debug!(species = %score.species_code, "skipping dossier for unsafe species code");
            continue;
        }

        let content = species_dossier(
            score,
            &fixtures.scoring,
            habitat_scores.get(&score.species_code),
        );
        let path = dossiers_dir.join(dossier_file_name(&score.species_code));
        std::fs::write(&path, content).map_err(|source| ExportError::io(&path, source))?;
        dossiers_exported += 1;
    }

    info!(
        out = %out_dir.display(),
        layers_exported,
        dossiers_exported,
        "export complete"
    );

    Ok(ExportSummary {
        layers_exported,
        dossiers_exported,
    })
}

fn create_dir(path: &Path) -> Result<(), ExportError> {
    std::fs::create_dir_all(path).map_err(|source| ExportError::io(path, source))
}

fn write_json(path: &Path, value: &serde_json::Value) -> Result<(), ExportError> {
    let mut encoded = serde_json::to_vec_pretty(value).map_err(|source| ExportError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    encoded.push(b'\n');
    std::fs::write(path, encoded).map_err(|source| ExportError::io(path, source))
}
