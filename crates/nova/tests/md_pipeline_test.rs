//! End-to-end tests for the MD summary pipeline.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use nova::md::reconcile_files;
use nova::table::read_csv;
use nova::{AnalysisKind, NovaConfig, NovaError, pipeline};

/// Helper to create a file, creating its parent directory.
fn create_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create directory");
    }
    fs::write(path, content).expect("Failed to write file");
}

fn energy_csv(rows: &str) -> String {
    format!(
        "GENERALIZED BORN:\nComplex Energy Terms\nFrame #,BOND\n0,1.0\n\n\
         Delta Energy Terms\nFrame #,VDWAALS,EEL,EGB,ESURF,TOTAL\n{rows}\n\
         Receptor Energy Terms\nFrame #,BOND\n0,2.0\n"
    )
}

/// Three ligands per kind; the second RMSD file has no data rows.
fn project() -> (TempDir, NovaConfig) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = NovaConfig::with_root(dir.path());

    let rmsd = config.md_data_dir(AnalysisKind::Rmsd);
    create_file(
        &rmsd.join("lig1-protA-rmsd.xvg"),
        "# GROMACS output\n@    title \"RMSD\"\n@ s0 legend \"backbone\"\n0.000 0.1\n10.00 0.3\n",
    );
    create_file(&rmsd.join("lig2-protA-rmsd.xvg"), "# truncated run\n@ title \"RMSD\"\n");
    create_file(&rmsd.join("lig3-protA-rmsd.xvg"), "0 1.23456\n1 1.23456\n");

    let rmsf = config.md_data_dir(AnalysisKind::Rmsf);
    create_file(&rmsf.join("lig1-protA-rmsf.xvg"), "1 0.5\n2 0.5\n");
    create_file(&rmsf.join("lig2-protA-rmsf.xvg"), "1 0.2\n2 0.4\n");
    create_file(&rmsf.join("lig3-protA-rmsf.xvg"), "1 1\n");

    let mmpbsa = config.md_data_dir(AnalysisKind::Mmpbsa);
    create_file(
        &mmpbsa.join("lig1-protA_RESULTS_MMPBSA.csv"),
        &energy_csv("0,-10,-5,8,-1,-8\n1,-12,-7,10,-1,-10\n"),
    );
    create_file(
        &mmpbsa.join("lig2-protA_RESULTS_MMPBSA.csv"),
        &energy_csv("0,-20,-4,6,-2,-20\n"),
    );
    create_file(
        &mmpbsa.join("lig3-protA_RESULTS_MMPBSA.csv"),
        &energy_csv("0,-1,-1,1,0,-1\n1,-3,-1,1,0,-3\n"),
    );

    (dir, config)
}

// =============================================================================
// Per-Kind Summaries
// =============================================================================

#[test]
fn test_bad_file_degrades_without_aborting() {
    let (_dir, config) = project();

    let batch = pipeline::run_md_stage(&config, AnalysisKind::Rmsd).expect("stage failed");
    assert_eq!(batch.outcomes.len(), 3);
    assert!(!batch.outcomes[0].is_degraded());
    assert!(batch.outcomes[1].is_degraded());
    assert!(!batch.outcomes[2].is_degraded());
    assert_eq!(batch.degraded(), 1);

    let summary = read_csv(config.md_summary_path(AnalysisKind::Rmsd)).unwrap();
    assert_eq!(summary.headers, vec!["protein", "ligand", "RMSD_mean", "RMSD_std"]);
    assert_eq!(summary.rows[0], vec!["protA", "lig1", "0.2", "0.1"]);
    assert_eq!(summary.rows[1], vec!["protA", "lig2", "", ""]);
    assert_eq!(summary.rows[2], vec!["protA", "lig3", "1.2346", "0"]);
}

#[test]
fn test_non_numeric_value_degrades_only_that_file() {
    let (_dir, config) = project();
    create_file(
        &config.md_data_dir(AnalysisKind::Rmsd).join("lig2-protA-rmsd.xvg"),
        "@ title \"RMSD\"\n0 0.1\n1 abc\n",
    );

    let batch = pipeline::run_md_stage(&config, AnalysisKind::Rmsd).expect("stage failed");
    assert_eq!(batch.degraded(), 1);
    let diagnostic = batch.outcomes[1].diagnostic.as_deref().unwrap();
    assert!(diagnostic.contains("abc"), "{diagnostic}");

    let summary = read_csv(config.md_summary_path(AnalysisKind::Rmsd)).unwrap();
    assert_eq!(summary.row_count(), 3);
    assert_eq!(summary.rows[0], vec!["protA", "lig1", "0.2", "0.1"]);
    assert_eq!(summary.rows[1], vec!["protA", "lig2", "", ""]);
    assert_eq!(summary.rows[2], vec!["protA", "lig3", "1.2346", "0"]);
}

#[test]
fn test_mmpbsa_summary_reads_delta_section() {
    let (_dir, config) = project();

    pipeline::run_md_stage(&config, AnalysisKind::Mmpbsa).unwrap();
    let summary = read_csv(config.md_summary_path(AnalysisKind::Mmpbsa)).unwrap();

    assert_eq!(summary.column_count(), 12);
    assert_eq!(summary.get_by_name(0, "VDWAALS_mean"), Some("-11"));
    assert_eq!(summary.get_by_name(0, "VDWAALS_std"), Some("1"));
    assert_eq!(summary.get_by_name(0, "TOTAL_mean"), Some("-9"));
    assert_eq!(summary.get_by_name(1, "TOTAL_std"), Some("0"));
}

// =============================================================================
// Full Pipeline
// =============================================================================

#[test]
fn test_full_md_pipeline() {
    let (_dir, config) = project();

    let report = pipeline::run_md_pipeline(&config).expect("pipeline failed");
    assert_eq!(report.batches.len(), 3);
    assert_eq!(report.reconcile.rows, 3);

    let merged = read_csv(config.md_merged_path()).unwrap();
    assert_eq!(merged.headers, nova::md::REQUIRED_COLUMNS.to_vec());
    assert_eq!(
        merged.rows[0],
        vec!["lig1", "0.2", "0.1", "0.5", "0", "-11", "1", "-6", "1", "9", "1", "-1", "0", "-9", "1"]
    );

    // The degraded RMSD record survives the join with empty statistics.
    assert_eq!(merged.get_by_name(1, "ligand"), Some("lig2"));
    assert_eq!(merged.get_by_name(1, "RMSD_mean"), Some(""));
    assert_eq!(merged.get_by_name(1, "RMSF_mean"), Some("0.3"));
}

#[test]
fn test_missing_input_directory_is_fatal() {
    let (_dir, config) = project();
    fs::remove_dir_all(config.md_data_dir(AnalysisKind::Rmsf)).unwrap();

    let err = pipeline::run_md_pipeline(&config).unwrap_err();
    assert!(matches!(err, NovaError::Setup(_)));
    assert!(!config.md_summary_path(AnalysisKind::Rmsd).exists());
}

// =============================================================================
// Required Columns
// =============================================================================

#[test]
fn test_missing_required_column_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let rmsd = dir.path().join("rmsd_summary.csv");
    let rmsf = dir.path().join("rmsf_summary.csv");
    let mmpbsa = dir.path().join("mmpbsa_summary.csv");
    let output = dir.path().join("data_summary.csv");

    create_file(&rmsd, "protein,ligand,RMSD_mean,RMSD_std\np,lig1,0.2,0.1\n");
    create_file(&rmsf, "protein,ligand,RMSF_mean,RMSF_std\np,lig1,0.5,0\n");
    create_file(
        &mmpbsa,
        "protein,ligand,VDWAALS_mean,VDWAALS_std,EEL_mean,EEL_std,EGB_mean,EGB_std,ESURF_mean,ESURF_std,TOTAL_mean\n\
         p,lig1,-11,1,-6,1,9,1,-1,0,-9\n",
    );

    let err = reconcile_files(&rmsd, &rmsf, &mmpbsa, &output, 6).unwrap_err();
    match err {
        NovaError::MissingColumns { columns } => assert_eq!(columns, vec!["TOTAL_std"]),
        other => panic!("expected MissingColumns, got {other:?}"),
    }
    assert!(!output.exists());
}

#[test]
fn test_legacy_column_names_are_renamed() {
    let dir = TempDir::new().unwrap();
    let rmsd = dir.path().join("rmsd_summary.csv");
    let rmsf = dir.path().join("rmsf_summary.csv");
    let mmpbsa = dir.path().join("mmpbsa_summary.csv");
    let output = dir.path().join("data_summary.csv");

    create_file(&rmsd, "ligand,Media RMSD (nm),Desv. Est. (nm)\nlig1-rmsd,0.1234567,0.01\n");
    create_file(&rmsf, "ligand,mean_rmsf,std_rmsf\nlig1-rmsf,0.5,0.05\n");
    create_file(
        &mmpbsa,
        "ligand,VDWAALS_avg,VDWAALS_sd,EEL_avg,EEL_sd,EGB_avg,EGB_sd,ESURF_avg,ESURF_sd,TOTAL_avg,TOTAL_sd\n\
         lig1_RESULTS_MMPBSA,-11,1,-6,1,9,1,-1,0,-9,1\n",
    );

    let report = reconcile_files(&rmsd, &rmsf, &mmpbsa, &output, 6).unwrap();
    assert_eq!(report.rows, 1);

    let merged = read_csv(&output).unwrap();
    assert_eq!(merged.get_by_name(0, "ligand"), Some("lig1"));
    assert_eq!(merged.get_by_name(0, "RMSD_mean"), Some("0.123457"));
    assert_eq!(merged.get_by_name(0, "RMSF_std"), Some("0.05"));
    assert_eq!(merged.get_by_name(0, "TOTAL_std"), Some("1"));
}
