//! Init command - create the project directory layout.

use colored::Colorize;
use nova::{NovaConfig, pipeline};

pub fn run(config: &NovaConfig) -> Result<(), Box<dyn std::error::Error>> {
    let dirs = pipeline::setup_directories(config)?;

    println!(
        "{} {}",
        "Initialized project at".green().bold(),
        config.root.display().to_string().white()
    );
    for dir in &dirs {
        println!("  {}", dir.display());
    }
    Ok(())
}
