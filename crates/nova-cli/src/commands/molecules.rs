//! Molecules command - normalize, merge and project molecule sources.

use colored::Colorize;
use nova::molecule::{IngestReport, ProjectionSummary};
use nova::{MergeReport, NovaConfig, pipeline};

use crate::cli::MoleculeStage;

pub fn run(config: &NovaConfig, stage: MoleculeStage) -> Result<(), Box<dyn std::error::Error>> {
    println!("{} {}", "Molecule pipeline:".cyan().bold(), stage.to_string().white());

    match stage {
        MoleculeStage::Ingest => print_ingest(&pipeline::ingest_sources(config)?),
        MoleculeStage::Merge => print_merge(&pipeline::merge_sources(config)?),
        MoleculeStage::Select => print_projection(&pipeline::select_columns(config)?),
        MoleculeStage::All => {
            let report = pipeline::run_molecule_pipeline(config)?;
            print_ingest(&report.ingested);
            print_merge(&report.merge);
            print_projection(&report.projection);
        }
    }

    Ok(())
}

fn print_ingest(reports: &[IngestReport]) {
    println!();
    println!("{}", "Sources:".yellow().bold());
    for report in reports {
        let skipped = if report.skipped > 0 {
            format!(" ({} skipped)", report.skipped).red().to_string()
        } else {
            String::new()
        };
        println!(
            "  {:12} {:>8} rows{}  -> {}",
            report.name,
            report.rows.to_string().white().bold(),
            skipped,
            report.output.display()
        );
    }
}

fn print_merge(report: &MergeReport) {
    println!();
    println!("{}", "Merge:".yellow().bold());
    for (name, rows) in &report.inputs {
        println!("  {:12} {:>8} rows", name, rows);
    }
    for path in &report.skipped {
        println!("  {} {}", "skipped".red(), path.display());
    }
    println!(
        "  {} rows in, {} rows out, {} duplicates removed",
        report.rows_in.to_string().white(),
        report.rows_out.to_string().white().bold(),
        report.duplicates_removed.to_string().yellow()
    );
    if let Some(output) = &report.output {
        println!("  {} {}", "Wrote".green(), output.display());
    }
}

fn print_projection(summary: &ProjectionSummary) {
    println!();
    println!("{}", "Selection:".yellow().bold());
    println!(
        "  {} rows, columns: {}",
        summary.rows.to_string().white().bold(),
        summary.columns.join(", ")
    );
    if !summary.missing.is_empty() {
        println!(
            "  {} {}",
            "Missing columns dropped:".yellow(),
            summary.missing.join(", ")
        );
    }
}
