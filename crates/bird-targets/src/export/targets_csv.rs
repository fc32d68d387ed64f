use super::ExportError;
use crate::scoring::SpeciesScore;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

pub const TARGETS_CSV_FILE: &str = "targets_ranked.csv";

const HEADER: [&str; 7] = [
    "species_code",
    "common_name",
    "observer_expected_score",
    "habitat_expected_score",
    "combined_expected_score",
    "observed_score",
    "underreported_score",
];

/// Writes the ranking in order, header first. An empty ranking still gets a header row.
pub fn write_targets_csv<P: AsRef<Path>>(path: P, scores: &[SpeciesScore]) -> Result<(), ExportError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ExportError::io(path, source))?;
    }

    let file = File::create(path).map_err(|source| ExportError::io(path, source))?;
    write_targets(file, scores).map_err(|source| ExportError::csv(path, source))
}

pub fn write_targets<W: Write>(writer: W, scores: &[SpeciesScore]) -> Result<(), csv::Error> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record(HEADER)?;
    for score in scores {
        csv_writer.serialize(score)?;
    }
    csv_writer.flush()?;

    Ok(())
}

pub fn read_targets_csv<P: AsRef<Path>>(path: P) -> Result<Vec<SpeciesScore>, ExportError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| ExportError::io(path, source))?;
    read_targets(file).map_err(|source| ExportError::csv(path, source))
}

pub fn read_targets<R: Read>(reader: R) -> Result<Vec<SpeciesScore>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    csv_reader.deserialize::<SpeciesScore>().collect()
}
