//! Mmpbsa command - run gmx_MMPBSA over every complex directory.

use colored::Colorize;
use nova::NovaConfig;
use nova::tools::MmpbsaDriver;

pub fn run(config: &NovaConfig, extract_summary: bool) -> Result<(), Box<dyn std::error::Error>> {
    let driver = MmpbsaDriver::new(config)?;

    println!(
        "{} {}",
        "Running gmx_MMPBSA in".cyan().bold(),
        driver.base_dir().display().to_string().white()
    );

    let runs = driver.run_all(extract_summary)?;

    println!();
    for run in &runs {
        match &run.skipped {
            Some(reason) => println!(
                "  {} {} ({})",
                "skipped".yellow(),
                run.directory.display(),
                reason
            ),
            None => println!("  {} {}", "done".green(), run.results.display()),
        }
        if let Some(summary) = &run.summary {
            println!("    {} {}", "summary".blue(), summary.display());
        }
    }

    let completed = runs.iter().filter(|r| r.skipped.is_none()).count();
    println!();
    println!(
        "{} of {} directories completed",
        completed.to_string().white().bold(),
        runs.len()
    );
    Ok(())
}
