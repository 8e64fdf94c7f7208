//! Raw molecule sources normalized to a `{SMILES, ID}` table.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::NovaConfig;
use crate::error::{NovaError, Result};
use crate::table::{CsvReader, DataTable, ReaderConfig, write_csv};
use super::sdf::read_sdf;
use super::smiles::to_smiles;
use super::{ID_COLUMN, SMILES_COLUMN};

/// A raw dataset and the format it is stored in.
///
/// `file` is relative to the configured base directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum MoleculeSource {
    /// Header-less delimited list (`.smi`): SMILES and accession by position.
    DelimitedList { name: String, file: PathBuf },
    /// Multi-record structure-data file (`.sdf`).
    StructureContainer { name: String, file: PathBuf },
    /// Already-tabular CSV loaded as-is.
    Tabular { name: String, file: PathBuf },
}

/// Outcome of normalizing one source.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub name: String,
    pub output: PathBuf,
    pub rows: usize,
    /// Records skipped because they failed to parse.
    pub skipped: usize,
}

impl MoleculeSource {
    /// The three reference datasets.
    pub fn defaults() -> Vec<MoleculeSource> {
        vec![
            MoleculeSource::DelimitedList {
                name: "lotus".to_string(),
                file: PathBuf::from("LOTUS_DB.smi"),
            },
            MoleculeSource::StructureContainer {
                name: "ttd".to_string(),
                file: PathBuf::from("TTD_DB.sdf"),
            },
            MoleculeSource::Tabular {
                name: "coconut".to_string(),
                file: PathBuf::from("COCONUT_DB.csv"),
            },
        ]
    }

    pub fn name(&self) -> &str {
        match self {
            MoleculeSource::DelimitedList { name, .. }
            | MoleculeSource::StructureContainer { name, .. }
            | MoleculeSource::Tabular { name, .. } => name,
        }
    }

    pub fn file(&self) -> &PathBuf {
        match self {
            MoleculeSource::DelimitedList { file, .. }
            | MoleculeSource::StructureContainer { file, .. }
            | MoleculeSource::Tabular { file, .. } => file,
        }
    }

    /// Read the raw file into a table.
    ///
    /// A missing file is fatal. Unparseable SDF records are logged and
    /// skipped.
    pub fn produce(&self, config: &NovaConfig) -> Result<DataTable> {
        Ok(self.produce_counted(config)?.0)
    }

    fn produce_counted(&self, config: &NovaConfig) -> Result<(DataTable, usize)> {
        let path = config.base_dir().join(self.file());
        tracing::info!(source = self.name(), path = %path.display(), "reading molecule source");

        match self {
            MoleculeSource::DelimitedList { .. } => {
                let reader = CsvReader::with_config(ReaderConfig {
                    delimiter: config.delimiter_byte()?,
                    has_header: false,
                    column_names: Some(config.molecules.column_names.clone()),
                    ..ReaderConfig::default()
                });
                Ok((reader.read_file(&path)?, 0))
            }
            MoleculeSource::StructureContainer { .. } => {
                let text = fs::read_to_string(&path).map_err(|e| NovaError::io(&path, e))?;
                Ok(structures_to_table(self.name(), &text))
            }
            MoleculeSource::Tabular { .. } => Ok((CsvReader::new().read_file(&path)?, 0)),
        }
    }

    /// Produce the table and write it to `<pre_processed>/<name>_processed.csv`.
    pub fn ingest(&self, config: &NovaConfig) -> Result<IngestReport> {
        let (table, skipped) = self.produce_counted(config)?;
        let output = config.processed_path(self.name());
        write_csv(&table, &output)?;

        tracing::info!(
            source = self.name(),
            rows = table.row_count(),
            skipped,
            output = %output.display(),
            "normalized molecule source"
        );
        Ok(IngestReport {
            name: self.name().to_string(),
            output,
            rows: table.row_count(),
            skipped,
        })
    }
}

/// Convert every parseable SDF record to a `{SMILES, ID}` row.
fn structures_to_table(source: &str, text: &str) -> (DataTable, usize) {
    let mut table = DataTable::with_headers([SMILES_COLUMN, ID_COLUMN]);
    let mut skipped = 0;

    for (index, result) in read_sdf(text) {
        match result {
            Ok(mol) => {
                let smiles = to_smiles(&mol);
                table.push_row(vec![smiles, mol.title]);
            }
            Err(e) => {
                skipped += 1;
                tracing::error!(source, record = index, error = %e, "skipping unparseable structure record");
            }
        }
    }

    (table, skipped)
}
