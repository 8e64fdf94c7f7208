//! CLI argument definitions using clap.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use crate::logging::LogFormat;

/// Nova: molecule dataset merging and MD summary pipelines
#[derive(Parser)]
#[command(name = "nova")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Project root (default: current directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Configuration file (default: <root>/nova.toml when present)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace); also logs to stderr
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Log file (default: data/logs/nova.log under the root)
    #[arg(long, global = true, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the project directory layout
    Init,

    /// Run the molecule dataset pipeline
    Molecules {
        /// Stage to run
        #[arg(short, long, default_value = "all")]
        stage: MoleculeStage,
    },

    /// Run the MD summary pipeline
    Md {
        /// Stage to run
        #[arg(short, long, default_value = "all")]
        stage: MdStage,
    },

    /// Show shape and schema of an artifact
    Status {
        /// Artifact to report on (default: data/processed/merged_selected.csv)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Profile the normalized source tables and the merged table
    Inspect {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run gmx_MMPBSA over every complex directory
    Mmpbsa {
        /// Also extract the delta summary from the compact results
        #[arg(long)]
        extract_summary: bool,
    },
}

/// Molecule pipeline stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MoleculeStage {
    Ingest,
    Merge,
    Select,
    #[default]
    All,
}

impl std::str::FromStr for MoleculeStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ingest" | "readers" => Ok(MoleculeStage::Ingest),
            "merge" => Ok(MoleculeStage::Merge),
            "select" | "project" => Ok(MoleculeStage::Select),
            "all" => Ok(MoleculeStage::All),
            _ => Err(format!(
                "Unknown stage: {}. Use: ingest, merge, select, or all.",
                s
            )),
        }
    }
}

impl std::fmt::Display for MoleculeStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MoleculeStage::Ingest => write!(f, "ingest"),
            MoleculeStage::Merge => write!(f, "merge"),
            MoleculeStage::Select => write!(f, "select"),
            MoleculeStage::All => write!(f, "all"),
        }
    }
}

/// MD pipeline stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MdStage {
    Rmsd,
    Rmsf,
    Mmpbsa,
    Merge,
    #[default]
    All,
}

impl std::str::FromStr for MdStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rmsd" => Ok(MdStage::Rmsd),
            "rmsf" => Ok(MdStage::Rmsf),
            "mmpbsa" => Ok(MdStage::Mmpbsa),
            "merge" => Ok(MdStage::Merge),
            "all" => Ok(MdStage::All),
            _ => Err(format!(
                "Unknown stage: {}. Use: rmsd, rmsf, mmpbsa, merge, or all.",
                s
            )),
        }
    }
}

impl std::fmt::Display for MdStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MdStage::Rmsd => write!(f, "rmsd"),
            MdStage::Rmsf => write!(f, "rmsf"),
            MdStage::Mmpbsa => write!(f, "mmpbsa"),
            MdStage::Merge => write!(f, "merge"),
            MdStage::All => write!(f, "all"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_md_stage() {
        let cli = Cli::try_parse_from(["nova", "md", "--stage", "rmsf"]).unwrap();
        match cli.command {
            Commands::Md { stage } => assert_eq!(stage, MdStage::Rmsf),
            _ => panic!("expected md command"),
        }
    }

    #[test]
    fn test_default_stage_is_all() {
        let cli = Cli::try_parse_from(["nova", "molecules"]).unwrap();
        match cli.command {
            Commands::Molecules { stage } => assert_eq!(stage, MoleculeStage::All),
            _ => panic!("expected molecules command"),
        }
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from(["nova", "status", "--json", "-vv", "--log-format", "json"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.log_format, LogFormat::Json);
    }

    #[test]
    fn test_unknown_stage_rejected() {
        assert!(Cli::try_parse_from(["nova", "md", "--stage", "dock"]).is_err());
    }
}
