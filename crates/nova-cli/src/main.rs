//! Nova CLI - molecule dataset and MD summary pipelines.

mod cli;
mod commands;
mod logging;

use std::path::PathBuf;

use clap::Parser;
use cli::{Cli, Commands};
use colored::Colorize;
use logging::{LogConfig, init_logging};
use nova::NovaConfig;

const DEFAULT_CONFIG_FILE: &str = "nova.toml";

fn main() {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            std::process::exit(1);
        }
    };

    let log_file = cli.log_file.clone().unwrap_or_else(|| config.log_path());
    let log_config = LogConfig::from_verbosity(cli.verbose)
        .with_format(cli.log_format)
        .with_log_file(Some(log_file));
    if let Err(e) = init_logging(&log_config) {
        eprintln!("{} cannot open log file: {}", "warning:".yellow().bold(), e);
    }

    let result = match cli.command {
        Commands::Init => commands::init::run(&config),
        Commands::Molecules { stage } => commands::molecules::run(&config, stage),
        Commands::Md { stage } => commands::md::run(&config, stage),
        Commands::Status { file, json } => commands::status::run(&config, file, json),
        Commands::Inspect { json } => commands::inspect::run(&config, json),
        Commands::Mmpbsa { extract_summary } => commands::mmpbsa::run(&config, extract_summary),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "command failed");
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

/// Build the run configuration: an explicit `--config`, else `nova.toml`
/// under the root when present, else defaults. `--root` always wins.
fn load_config(cli: &Cli) -> nova::Result<NovaConfig> {
    let root = cli.root.clone().unwrap_or_else(|| PathBuf::from("."));

    let mut config = match &cli.config {
        Some(path) => NovaConfig::load(path)?,
        None => {
            let default = root.join(DEFAULT_CONFIG_FILE);
            if default.is_file() {
                NovaConfig::load(&default)?
            } else {
                NovaConfig::with_root(&root)
            }
        }
    };

    if cli.root.is_some() {
        config.root = root;
    }
    Ok(config)
}
