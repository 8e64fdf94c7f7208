//! Stage orchestration for both pipelines.
//!
//! Every stage takes the run configuration by reference, writes its artifact
//! and returns a report. Artifacts are re-read after MD stages to confirm
//! they are non-empty before the next stage starts.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::NovaConfig;
use crate::error::{NovaError, Result};
use crate::md::{AnalysisKind, BatchSummary, ReconcileReport, aggregate_directory, reconcile_files};
use crate::md::aggregate::discover_files;
use crate::molecule::{ColumnProjector, IdentityMerger, IngestReport, MergeReport, ProjectionSummary};
use crate::table::{read_csv, write_csv};

/// Create the project directory layout. Returns the directories created
/// or confirmed.
pub fn setup_directories(config: &NovaConfig) -> Result<Vec<PathBuf>> {
    let dirs = config.scaffold_dirs();
    for dir in &dirs {
        fs::create_dir_all(dir).map_err(|e| {
            NovaError::Setup(format!("cannot create directory '{}': {}", dir.display(), e))
        })?;
        tracing::debug!(dir = %dir.display(), "directory ready");
    }
    tracing::info!(root = %config.root.display(), count = dirs.len(), "project directories ready");
    Ok(dirs)
}

// =============================================================================
// MOLECULE PIPELINE
// =============================================================================

/// Reports of a full molecule run.
#[derive(Debug, Clone, Serialize)]
pub struct MoleculeRunReport {
    pub ingested: Vec<IngestReport>,
    pub merge: MergeReport,
    pub projection: ProjectionSummary,
}

/// Normalize every configured source into the pre-processed directory.
pub fn ingest_sources(config: &NovaConfig) -> Result<Vec<IngestReport>> {
    config
        .molecules
        .sources
        .iter()
        .map(|source| source.ingest(config))
        .collect()
}

/// Merge the normalized tables into `merged_raw.csv`.
pub fn merge_sources(config: &NovaConfig) -> Result<MergeReport> {
    let merger = IdentityMerger::new(config.molecules.processed_suffix.clone());
    let (_, report) = merger.merge_directory(&config.pre_processed_dir(), &config.merged_raw_path())?;
    Ok(report)
}

/// Project `merged_raw.csv` onto the allow-list and write `merged_selected.csv`.
pub fn select_columns(config: &NovaConfig) -> Result<ProjectionSummary> {
    let merged = read_csv(config.merged_raw_path())?;
    let projector = ColumnProjector::new(config.molecules.keep_columns.clone());
    let projection = projector.project(&merged);
    write_csv(&projection.table, config.selected_path())?;
    Ok(projection.summary())
}

/// Ingest, merge and project.
pub fn run_molecule_pipeline(config: &NovaConfig) -> Result<MoleculeRunReport> {
    let ingested = ingest_sources(config)?;
    let merge = merge_sources(config)?;
    let projection = select_columns(config)?;
    Ok(MoleculeRunReport {
        ingested,
        merge,
        projection,
    })
}

// =============================================================================
// MD PIPELINE
// =============================================================================

/// Reports of a full MD run.
#[derive(Debug, Clone, Serialize)]
pub struct MdRunReport {
    pub batches: Vec<BatchSummary>,
    pub reconcile: ReconcileReport,
}

/// Confirm every kind's input directory exists and holds at least one
/// matching file.
pub fn check_md_layout(config: &NovaConfig) -> Result<()> {
    for kind in AnalysisKind::ALL {
        let dir = config.md_data_dir(kind);
        if !dir.is_dir() {
            return Err(NovaError::Setup(format!(
                "missing {} input directory '{}'",
                kind,
                dir.display()
            )));
        }
        if discover_files(kind, &dir)?.is_empty() {
            return Err(NovaError::NoInputs {
                dir,
                pattern: format!("*{}", kind.extension()),
            });
        }
    }
    Ok(())
}

/// Summarize one kind and validate the artifact.
pub fn run_md_stage(config: &NovaConfig, kind: AnalysisKind) -> Result<BatchSummary> {
    let output = config.md_summary_path(kind);
    let batch = aggregate_directory(kind, &config.md_data_dir(kind), &output, config.md.summary_decimals)?;
    validate_output(&output)?;
    Ok(batch)
}

/// Reconcile the three summaries and validate the artifact.
pub fn run_md_merge(config: &NovaConfig) -> Result<ReconcileReport> {
    let output = config.md_merged_path();
    let report = reconcile_files(
        &config.md_summary_path(AnalysisKind::Rmsd),
        &config.md_summary_path(AnalysisKind::Rmsf),
        &config.md_summary_path(AnalysisKind::Mmpbsa),
        &output,
        config.md.merged_decimals,
    )?;
    validate_output(&output)?;
    Ok(report)
}

/// Layout check, the three summaries, then the merge.
pub fn run_md_pipeline(config: &NovaConfig) -> Result<MdRunReport> {
    check_md_layout(config)?;

    let mut batches = Vec::with_capacity(AnalysisKind::ALL.len());
    for kind in AnalysisKind::ALL {
        batches.push(run_md_stage(config, kind)?);
    }
    let reconcile = run_md_merge(config)?;

    Ok(MdRunReport { batches, reconcile })
}

/// Re-read an artifact; fails if it is missing or has no data rows.
pub fn validate_output(path: &Path) -> Result<usize> {
    if !path.is_file() {
        return Err(NovaError::EmptyData(format!(
            "expected output '{}' was not written",
            path.display()
        )));
    }
    let table = read_csv(path)?;
    if table.is_empty() {
        return Err(NovaError::EmptyData(format!("output '{}' has no rows", path.display())));
    }
    tracing::debug!(path = %path.display(), rows = table.row_count(), "validated output");
    Ok(table.row_count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_setup_creates_layout() {
        let dir = TempDir::new().unwrap();
        let config = NovaConfig::with_root(dir.path());
        let created = setup_directories(&config).unwrap();

        for name in ["base", "pre_processed", "merged", "processed", "results", "models", "logs"] {
            assert!(dir.path().join("data").join(name).is_dir(), "{name}");
        }
        assert_eq!(created.len(), 7);
        // Idempotent.
        setup_directories(&config).unwrap();
    }

    #[test]
    fn test_setup_failure_is_setup_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("data"), "not a directory").unwrap();
        let config = NovaConfig::with_root(dir.path());
        assert!(matches!(setup_directories(&config), Err(NovaError::Setup(_))));
    }

    #[test]
    fn test_md_layout_requires_every_kind() {
        let dir = TempDir::new().unwrap();
        let config = NovaConfig::with_root(dir.path());
        fs::create_dir_all(config.md_data_dir(AnalysisKind::Rmsd)).unwrap();
        fs::write(config.md_data_dir(AnalysisKind::Rmsd).join("a-p-rmsd.xvg"), "0 1\n").unwrap();

        let err = check_md_layout(&config).unwrap_err();
        assert!(matches!(err, NovaError::Setup(_)));

        fs::create_dir_all(config.md_data_dir(AnalysisKind::Rmsf)).unwrap();
        let err = check_md_layout(&config).unwrap_err();
        assert!(matches!(err, NovaError::NoInputs { .. }));
    }

    #[test]
    fn test_validate_output() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        assert!(validate_output(&path).is_err());

        fs::write(&path, "a,b\n").unwrap();
        assert!(matches!(validate_output(&path), Err(NovaError::EmptyData(_))));

        fs::write(&path, "a,b\n1,2\n").unwrap();
        assert_eq!(validate_output(&path).unwrap(), 1);
    }
}
