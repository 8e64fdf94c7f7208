//! Read-only reports over produced artifacts.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

use crate::config::NovaConfig;
use crate::error::Result;
use crate::molecule::SMILES_COLUMN;
use crate::schema::{ColumnType, TableProfile, profile_table};
use crate::table::read_csv;

/// Status payload of one artifact.
///
/// Serializes as `{"rows", "columns", "schema"}` or `{"error"}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatusReport {
    Ready {
        rows: usize,
        columns: Vec<String>,
        schema: IndexMap<String, ColumnType>,
    },
    Failed {
        error: String,
    },
}

impl StatusReport {
    pub fn is_ready(&self) -> bool {
        matches!(self, StatusReport::Ready { .. })
    }
}

/// Report an artifact's shape and schema. Never fails: an absent or
/// unreadable file becomes an error payload.
pub fn artifact_status(path: &Path) -> StatusReport {
    if !path.is_file() {
        return StatusReport::Failed {
            error: format!("file not found: {}", path.display()),
        };
    }
    match read_csv(path) {
        Ok(table) => {
            let profile = profile_table(&table);
            StatusReport::Ready {
                rows: profile.rows,
                columns: table.headers,
                schema: profile.schema,
            }
        }
        Err(e) => StatusReport::Failed {
            error: e.to_string(),
        },
    }
}

/// Pre-analysis of one normalized source table.
#[derive(Debug, Clone, Serialize)]
pub struct SourceInspection {
    pub name: String,
    pub path: PathBuf,
    pub rows: usize,
    /// Rows left after dropping null `SMILES`.
    pub rows_with_smiles: usize,
    pub dropped_null_smiles: usize,
    pub complete_percentage: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Pre-analysis of the molecule pipeline's intermediate tables.
#[derive(Debug, Clone, Serialize)]
pub struct InspectReport {
    pub generated_at: DateTime<Utc>,
    pub sources: Vec<SourceInspection>,
    /// Profile of `merged_raw.csv` when it exists.
    pub merged: Option<TableProfile>,
}

/// Inspect every configured source's normalized table and the merged table.
pub fn inspect(config: &NovaConfig) -> Result<InspectReport> {
    let sources = config
        .molecules
        .sources
        .iter()
        .map(|source| inspect_source(source.name(), config.processed_path(source.name())))
        .collect();

    let merged_path = config.merged_raw_path();
    let merged = if merged_path.is_file() {
        Some(profile_table(&read_csv(&merged_path)?))
    } else {
        tracing::warn!(path = %merged_path.display(), "merged table not found");
        None
    };

    Ok(InspectReport {
        generated_at: Utc::now(),
        sources,
        merged,
    })
}

fn inspect_source(name: &str, path: PathBuf) -> SourceInspection {
    let mut inspection = SourceInspection {
        name: name.to_string(),
        path: path.clone(),
        rows: 0,
        rows_with_smiles: 0,
        dropped_null_smiles: 0,
        complete_percentage: 0.0,
        error: None,
    };

    let table = match read_csv(&path) {
        Ok(table) => table,
        Err(e) => {
            tracing::warn!(source = name, error = %e, "cannot inspect source");
            inspection.error = Some(e.to_string());
            return inspection;
        }
    };

    let profile = profile_table(&table);
    let with_smiles = table
        .column_by_name(SMILES_COLUMN)
        .map(|values| values.iter().filter(|v| !v.trim().is_empty()).count())
        .unwrap_or(0);

    inspection.rows = profile.rows;
    inspection.rows_with_smiles = with_smiles;
    inspection.dropped_null_smiles = profile.rows - with_smiles;
    inspection.complete_percentage = profile.complete_percentage();
    inspection
}
