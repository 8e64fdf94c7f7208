//! Per-file MD statistics and batch summaries.
//!
//! Every input file yields exactly one [`FileOutcome`]. A file that cannot
//! be read or parsed still produces a record keyed from its name, with all
//! statistics missing and a diagnostic explaining why.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{NovaError, Result};
use crate::table::{DataTable, write_csv};
use super::mmpbsa::{ENERGY_TERMS, parse_energy_terms};
use super::naming::{LigandKey, parse_file_name};
use super::stats::{Summary, format_value};
use super::xvg;

/// The three analysis kinds and their file conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    Rmsd,
    Rmsf,
    Mmpbsa,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 3] = [AnalysisKind::Rmsd, AnalysisKind::Rmsf, AnalysisKind::Mmpbsa];

    pub fn name(&self) -> &'static str {
        match self {
            AnalysisKind::Rmsd => "rmsd",
            AnalysisKind::Rmsf => "rmsf",
            AnalysisKind::Mmpbsa => "mmpbsa",
        }
    }

    /// Input sub-directory under the MD data directory.
    pub fn data_dir_name(&self) -> &'static str {
        match self {
            AnalysisKind::Rmsd => "rmsd_data",
            AnalysisKind::Rmsf => "rmsf_data",
            AnalysisKind::Mmpbsa => "mmpbsa_data",
        }
    }

    /// Input file extension, including the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            AnalysisKind::Rmsd | AnalysisKind::Rmsf => ".xvg",
            AnalysisKind::Mmpbsa => ".csv",
        }
    }

    /// Tag between the protein name and the extension.
    pub fn tag(&self) -> &'static str {
        match self {
            AnalysisKind::Rmsd => "-rmsd",
            AnalysisKind::Rmsf => "-rmsf",
            AnalysisKind::Mmpbsa => "_RESULTS_MMPBSA",
        }
    }

    pub fn metrics(&self) -> &'static [&'static str] {
        match self {
            AnalysisKind::Rmsd => &["RMSD"],
            AnalysisKind::Rmsf => &["RMSF"],
            AnalysisKind::Mmpbsa => &ENERGY_TERMS,
        }
    }

    pub fn summary_file_name(&self) -> String {
        format!("{}_summary.csv", self.name())
    }

    /// Summary table columns: `protein, ligand, <M>_mean, <M>_std, ...`.
    pub fn columns(&self) -> Vec<String> {
        let mut columns = vec!["protein".to_string(), "ligand".to_string()];
        for metric in self.metrics() {
            columns.push(format!("{}_mean", metric));
            columns.push(format!("{}_std", metric));
        }
        columns
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Statistics for one ligand from one file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRecord {
    pub key: LigandKey,
    /// One entry per metric of the kind, in order; `None` when missing.
    pub metrics: Vec<Option<Summary>>,
}

impl SummaryRecord {
    /// A record with every statistic missing.
    pub fn missing(kind: AnalysisKind, key: LigandKey) -> Self {
        Self {
            key,
            metrics: vec![None; kind.metrics().len()],
        }
    }
}

/// Result of processing one file.
#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub record: SummaryRecord,
    /// Why the record is degraded, if it is.
    pub diagnostic: Option<String>,
}

impl FileOutcome {
    pub fn is_degraded(&self) -> bool {
        self.diagnostic.is_some()
    }
}

/// Summary of one batch run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub kind: AnalysisKind,
    pub outcomes: Vec<FileOutcome>,
    pub output: PathBuf,
    #[serde(skip)]
    pub table: DataTable,
}

impl BatchSummary {
    pub fn degraded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_degraded()).count()
    }
}

/// Compute per-metric statistics from a file's contents.
pub fn summarize_text(kind: AnalysisKind, text: &str) -> Result<(Vec<Option<Summary>>, Vec<String>)> {
    match kind {
        AnalysisKind::Rmsd | AnalysisKind::Rmsf => {
            let values = xvg::signal(text)?;
            let summary = Summary::of(&values)
                .ok_or_else(|| NovaError::EmptyData("no finite values in signal column".to_string()))?;
            Ok((vec![Some(summary)], Vec::new()))
        }
        AnalysisKind::Mmpbsa => {
            let energy = parse_energy_terms(text)?;
            let mut warnings = Vec::new();
            if !energy.marker_found {
                warnings.push("'Delta Energy Terms' marker not found, parsed from the first line".to_string());
            }

            let mut metrics = Vec::with_capacity(ENERGY_TERMS.len());
            for term in ENERGY_TERMS {
                match energy.term_values(term)? {
                    Some(values) => metrics.push(Summary::of(&values)),
                    None => {
                        warnings.push(format!("column '{}' not found", term));
                        metrics.push(None);
                    }
                }
            }
            Ok((metrics, warnings))
        }
    }
}

/// Process one file. Never fails: errors become a degraded record.
pub fn aggregate_file(kind: AnalysisKind, path: &Path) -> FileOutcome {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let key = parse_file_name(&file_name, kind.extension(), kind.tag());

    let result = fs::read_to_string(path)
        .map_err(|e| NovaError::io(path, e))
        .and_then(|text| summarize_text(kind, &text));

    match result {
        Ok((metrics, warnings)) => {
            for warning in warnings {
                tracing::warn!(kind = %kind, path = %path.display(), "{}", warning);
            }
            tracing::debug!(kind = %kind, ligand = %key.ligand, protein = %key.protein, "summarized file");
            FileOutcome {
                path: path.to_path_buf(),
                record: SummaryRecord { key, metrics },
                diagnostic: None,
            }
        }
        Err(e) => {
            tracing::warn!(kind = %kind, path = %path.display(), error = %e, "file degraded to missing statistics");
            FileOutcome {
                path: path.to_path_buf(),
                record: SummaryRecord::missing(kind, key),
                diagnostic: Some(e.to_string()),
            }
        }
    }
}

/// Files of a kind in `dir`, sorted by name. A missing directory is fatal.
pub fn discover_files(kind: AnalysisKind, dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| NovaError::io(dir, e))?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| NovaError::io(dir, e))?.path();
        let matches = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(kind.extension()));
        if matches && path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Build the summary table: records sorted by `(protein, ligand)`, values
/// rounded to `decimals`.
pub fn summary_table(kind: AnalysisKind, records: &[SummaryRecord], decimals: u32) -> DataTable {
    let mut sorted: Vec<&SummaryRecord> = records.iter().collect();
    sorted.sort_by(|a, b| a.key.cmp(&b.key));

    let mut table = DataTable::with_headers(kind.columns());
    for record in sorted {
        let mut row = vec![record.key.protein.clone(), record.key.ligand.clone()];
        for metric in &record.metrics {
            let rounded = metric.map(|s| s.rounded(decimals));
            row.push(format_value(rounded.map(|s| s.mean)));
            row.push(format_value(rounded.map(|s| s.std)));
        }
        table.push_row(row);
    }
    table
}

/// Summarize every file of a kind in `input_dir` and write `output`.
///
/// Zero matching files is fatal and writes nothing.
pub fn aggregate_directory(
    kind: AnalysisKind,
    input_dir: &Path,
    output: &Path,
    decimals: u32,
) -> Result<BatchSummary> {
    let files = discover_files(kind, input_dir)?;
    if files.is_empty() {
        return Err(NovaError::NoInputs {
            dir: input_dir.to_path_buf(),
            pattern: format!("*{}", kind.extension()),
        });
    }

    tracing::info!(kind = %kind, files = files.len(), dir = %input_dir.display(), "aggregating MD files");
    let outcomes: Vec<FileOutcome> = files.iter().map(|p| aggregate_file(kind, p)).collect();

    let records: Vec<SummaryRecord> = outcomes.iter().map(|o| o.record.clone()).collect();
    let table = summary_table(kind, &records, decimals);
    write_csv(&table, output)?;

    let summary = BatchSummary {
        kind,
        outcomes,
        output: output.to_path_buf(),
        table,
    };
    tracing::info!(
        kind = %kind,
        records = summary.outcomes.len(),
        degraded = summary.degraded(),
        output = %output.display(),
        "wrote MD summary"
    );
    Ok(summary)
}
