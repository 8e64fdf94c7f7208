//! MD command - summarize RMSD, RMSF and MMPBSA outputs and merge them.

use colored::Colorize;
use nova::{AnalysisKind, BatchSummary, NovaConfig, ReconcileReport, pipeline};

use crate::cli::MdStage;

pub fn run(config: &NovaConfig, stage: MdStage) -> Result<(), Box<dyn std::error::Error>> {
    println!("{} {}", "MD pipeline:".cyan().bold(), stage.to_string().white());

    match stage {
        MdStage::Rmsd => print_batch(&pipeline::run_md_stage(config, AnalysisKind::Rmsd)?),
        MdStage::Rmsf => print_batch(&pipeline::run_md_stage(config, AnalysisKind::Rmsf)?),
        MdStage::Mmpbsa => print_batch(&pipeline::run_md_stage(config, AnalysisKind::Mmpbsa)?),
        MdStage::Merge => print_reconcile(&pipeline::run_md_merge(config)?),
        MdStage::All => {
            let report = pipeline::run_md_pipeline(config)?;
            for batch in &report.batches {
                print_batch(batch);
            }
            print_reconcile(&report.reconcile);
        }
    }

    Ok(())
}

fn print_batch(batch: &BatchSummary) {
    println!();
    println!(
        "{} {} files, {} degraded",
        format!("{}:", batch.kind.name().to_uppercase()).yellow().bold(),
        batch.outcomes.len().to_string().white().bold(),
        if batch.degraded() > 0 {
            batch.degraded().to_string().red()
        } else {
            batch.degraded().to_string().green()
        }
    );
    for outcome in batch.outcomes.iter().filter(|o| o.is_degraded()) {
        println!(
            "  {} {}: {}",
            "degraded".red(),
            outcome.path.display(),
            outcome.diagnostic.as_deref().unwrap_or_default()
        );
    }
    println!("  {} {}", "Wrote".green(), batch.output.display());
}

fn print_reconcile(report: &ReconcileReport) {
    println!();
    println!(
        "{} {} ligands, {} columns",
        "Merged:".yellow().bold(),
        report.rows.to_string().white().bold(),
        report.columns.len()
    );
    println!("  {} {}", "Wrote".green(), report.output.display());
}
