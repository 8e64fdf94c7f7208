//! Status command - show an artifact's shape and schema.

use std::path::PathBuf;

use colored::Colorize;
use nova::{NovaConfig, StatusReport, artifact_status};

pub fn run(
    config: &NovaConfig,
    file: Option<PathBuf>,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = file.unwrap_or_else(|| config.selected_path());
    let status = artifact_status(&path);

    if json_output {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    match status {
        StatusReport::Ready {
            rows,
            columns,
            schema,
        } => {
            println!(
                "{} {}",
                "Status for".cyan().bold(),
                path.display().to_string().white()
            );
            println!();
            println!(
                "  {} rows, {} columns",
                rows.to_string().white().bold(),
                columns.len().to_string().white().bold()
            );
            println!();
            println!("{}", "Schema:".yellow().bold());
            for (name, column_type) in &schema {
                println!("  {:24} {}", name, column_type.to_string().blue());
            }
            Ok(())
        }
        StatusReport::Failed { error } => Err(error.into()),
    }
}
