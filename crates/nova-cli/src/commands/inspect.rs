//! Inspect command - profile normalized sources and the merged table.

use colored::Colorize;
use nova::{NovaConfig, inspect};

pub fn run(config: &NovaConfig, json_output: bool) -> Result<(), Box<dyn std::error::Error>> {
    let report = inspect(config)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", "Source tables:".cyan().bold());
    println!();
    for source in &report.sources {
        if let Some(error) = &source.error {
            println!("  {:12} {}", source.name, error.red());
            continue;
        }
        println!(
            "  {:12} {:>8} rows  {:>8} with SMILES  {:>6} dropped  {:>6.1}% complete",
            source.name,
            source.rows.to_string().white().bold(),
            source.rows_with_smiles,
            source.dropped_null_smiles.to_string().yellow(),
            source.complete_percentage
        );
    }

    println!();
    match &report.merged {
        Some(profile) => {
            println!(
                "{} {} rows, {} columns, {:.1}% complete rows",
                "Merged table:".cyan().bold(),
                profile.rows.to_string().white().bold(),
                profile.columns,
                profile.complete_percentage()
            );
            for (name, column_type) in &profile.schema {
                let non_null = profile.non_null.get(name).copied().unwrap_or(0);
                println!(
                    "  {:24} {:10} {} non-null",
                    name,
                    column_type.to_string().blue(),
                    non_null
                );
            }
        }
        None => println!(
            "{} not produced yet. Run {} first.",
            "Merged table:".cyan().bold(),
            "nova molecules --stage merge".cyan()
        ),
    }

    Ok(())
}
