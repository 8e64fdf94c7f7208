//! Run configuration.
//!
//! A [`NovaConfig`] is built once (defaults, optionally overlaid by a TOML
//! file) and passed by reference to every stage. All paths are relative to
//! [`NovaConfig::root`] unless absolute.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{NovaError, Result};
use crate::md::AnalysisKind;
use crate::molecule::MoleculeSource;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NovaConfig {
    /// Project root all relative paths resolve against.
    pub root: PathBuf,
    /// Shared append-only log file.
    pub log_file: PathBuf,
    /// Model artifacts directory (created by setup only).
    pub models_dir: PathBuf,
    /// Molecule dataset pipeline settings.
    pub molecules: MoleculeConfig,
    /// MD summary pipeline settings.
    pub md: MdConfig,
    /// External MMPBSA driver settings. Only required by the driver.
    pub mmpbsa: Option<MmpbsaConfig>,
}

impl Default for NovaConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            log_file: PathBuf::from("data/logs/nova.log"),
            models_dir: PathBuf::from("data/models"),
            molecules: MoleculeConfig::default(),
            md: MdConfig::default(),
            mmpbsa: None,
        }
    }
}

/// Molecule pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MoleculeConfig {
    /// Raw source files.
    pub base_dir: PathBuf,
    /// Per-source normalized tables.
    pub pre_processed_dir: PathBuf,
    /// Merged table directory.
    pub merged_dir: PathBuf,
    /// Projected table directory.
    pub processed_dir: PathBuf,
    /// Pre-analysis reports directory.
    pub reports_dir: PathBuf,
    /// Delimiter of header-less list sources.
    pub delimiter: char,
    /// Positional column names of header-less list sources.
    pub column_names: Vec<String>,
    /// Suffix appended to a source name for its normalized table.
    pub processed_suffix: String,
    /// Columns kept by the final projection, in output order.
    pub keep_columns: Vec<String>,
    /// Raw sources, ingested in order.
    pub sources: Vec<MoleculeSource>,
}

impl Default for MoleculeConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("data/base"),
            pre_processed_dir: PathBuf::from("data/pre_processed"),
            merged_dir: PathBuf::from("data/merged"),
            processed_dir: PathBuf::from("data/processed"),
            reports_dir: PathBuf::from("data/results"),
            delimiter: '\t',
            column_names: vec!["SMILES".to_string(), "ID".to_string()],
            processed_suffix: "_processed".to_string(),
            keep_columns: vec!["uid".to_string(), "SMILES".to_string(), "source".to_string()],
            sources: MoleculeSource::defaults(),
        }
    }
}

/// MD summary pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MdConfig {
    /// Parent of the `<kind>_data` input directories.
    pub data_dir: PathBuf,
    /// Summary output directory.
    pub results_dir: PathBuf,
    /// Decimal places of per-kind summaries.
    pub summary_decimals: u32,
    /// Decimal places of the combined summary.
    pub merged_decimals: u32,
}

impl Default for MdConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            results_dir: PathBuf::from("results"),
            summary_decimals: 4,
            merged_decimals: 6,
        }
    }
}

/// External `gmx_MMPBSA` driver settings.
///
/// Every parameter the command line references is a required field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MmpbsaConfig {
    /// Directory whose sub-directories are processed, one complex each.
    pub base_dir: PathBuf,
    /// MPI process count.
    pub np: u32,
    /// Frame interval written into `mmpbsa.in`.
    pub interval: u32,
    /// Receptor and ligand index groups.
    pub groups: Vec<u32>,
    /// Appended to `sdm-<dir>` to name the run input (`.tpr`) file.
    pub tpr_suffix: String,
    /// Appended to `sdm-<dir>` to name the trajectory (`.xtc`) file.
    pub xtc_suffix: String,
    /// Appended to `<dir>` to name the topology file.
    pub top_suffix: String,
    #[serde(default = "default_true")]
    pub nogui: bool,
    #[serde(default = "default_true")]
    pub clean: bool,
    #[serde(default = "default_program")]
    pub program: String,
    #[serde(default = "default_launcher")]
    pub launcher: String,
}

fn default_true() -> bool {
    true
}

fn default_program() -> String {
    "gmx_MMPBSA".to_string()
}

fn default_launcher() -> String {
    "mpirun".to_string()
}

impl NovaConfig {
    /// Default configuration rooted at `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Load configuration from a TOML file.
    ///
    /// Missing keys take their defaults. A relative `root` in the file is
    /// resolved against the file's directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| NovaError::io(path, e))?;
        let mut config = Self::from_toml(&text)?;

        if config.root.is_relative() {
            if let Some(parent) = path.parent() {
                config.root = parent.join(&config.root);
            }
        }
        tracing::debug!(path = %path.display(), root = %config.root.display(), "loaded configuration");
        Ok(config)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: NovaConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values serde cannot.
    pub fn validate(&self) -> Result<()> {
        self.delimiter_byte()?;

        if self.molecules.column_names.is_empty() {
            return Err(NovaError::Config(
                "molecules.column_names must not be empty".to_string(),
            ));
        }

        let mut names: Vec<&str> = self.molecules.sources.iter().map(|s| s.name()).collect();
        names.sort_unstable();
        if let Some(pair) = names.windows(2).find(|w| w[0] == w[1]) {
            return Err(NovaError::Config(format!(
                "duplicate molecule source name '{}'",
                pair[0]
            )));
        }

        if let Some(mmpbsa) = &self.mmpbsa {
            if mmpbsa.groups.len() != 2 {
                return Err(NovaError::Config(format!(
                    "mmpbsa.groups must name exactly two groups, got {}",
                    mmpbsa.groups.len()
                )));
            }
            if mmpbsa.np == 0 {
                return Err(NovaError::Config("mmpbsa.np must be at least 1".to_string()));
            }
        }

        Ok(())
    }

    /// Resolve a configured path against the root.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// The list-source delimiter as a single byte.
    pub fn delimiter_byte(&self) -> Result<u8> {
        let c = self.molecules.delimiter;
        if c.is_ascii() {
            Ok(c as u8)
        } else {
            Err(NovaError::Config(format!(
                "molecules.delimiter must be an ASCII character, got '{}'",
                c
            )))
        }
    }

    pub fn base_dir(&self) -> PathBuf {
        self.resolve(&self.molecules.base_dir)
    }

    pub fn pre_processed_dir(&self) -> PathBuf {
        self.resolve(&self.molecules.pre_processed_dir)
    }

    pub fn merged_dir(&self) -> PathBuf {
        self.resolve(&self.molecules.merged_dir)
    }

    pub fn processed_dir(&self) -> PathBuf {
        self.resolve(&self.molecules.processed_dir)
    }

    /// `<merged>/merged_raw.csv`
    pub fn merged_raw_path(&self) -> PathBuf {
        self.merged_dir().join("merged_raw.csv")
    }

    /// `<processed>/merged_selected.csv`
    pub fn selected_path(&self) -> PathBuf {
        self.processed_dir().join("merged_selected.csv")
    }

    /// Normalized table path for a source name.
    pub fn processed_path(&self, source_name: &str) -> PathBuf {
        self.pre_processed_dir()
            .join(format!("{}{}.csv", source_name, self.molecules.processed_suffix))
    }

    pub fn log_path(&self) -> PathBuf {
        self.resolve(&self.log_file)
    }

    /// Input directory of an MD analysis kind.
    pub fn md_data_dir(&self, kind: AnalysisKind) -> PathBuf {
        self.resolve(&self.md.data_dir).join(kind.data_dir_name())
    }

    pub fn md_results_dir(&self) -> PathBuf {
        self.resolve(&self.md.results_dir)
    }

    /// `<results>/<kind>_summary.csv`
    pub fn md_summary_path(&self, kind: AnalysisKind) -> PathBuf {
        self.md_results_dir().join(kind.summary_file_name())
    }

    /// `<results>/data_summary.csv`
    pub fn md_merged_path(&self) -> PathBuf {
        self.md_results_dir().join("data_summary.csv")
    }

    /// Directories created by project setup.
    pub fn scaffold_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = vec![
            self.base_dir(),
            self.pre_processed_dir(),
            self.merged_dir(),
            self.processed_dir(),
            self.resolve(&self.molecules.reports_dir),
            self.resolve(&self.models_dir),
        ];
        if let Some(parent) = self.log_path().parent() {
            dirs.push(parent.to_path_buf());
        }
        dirs
    }

    /// The MMPBSA section, or a configuration error if absent.
    pub fn mmpbsa(&self) -> Result<&MmpbsaConfig> {
        self.mmpbsa
            .as_ref()
            .ok_or_else(|| NovaError::Config("missing [mmpbsa] section".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = NovaConfig::with_root("/project");
        assert_eq!(config.molecules.keep_columns, vec!["uid", "SMILES", "source"]);
        assert_eq!(config.molecules.column_names, vec!["SMILES", "ID"]);
        assert_eq!(config.delimiter_byte().unwrap(), b'\t');
        assert_eq!(
            config.merged_raw_path(),
            PathBuf::from("/project/data/merged/merged_raw.csv")
        );
        assert_eq!(
            config.processed_path("lotus"),
            PathBuf::from("/project/data/pre_processed/lotus_processed.csv")
        );
        assert_eq!(
            config.md_summary_path(AnalysisKind::Rmsf),
            PathBuf::from("/project/results/rmsf_summary.csv")
        );
        assert_eq!(config.log_path(), PathBuf::from("/project/data/logs/nova.log"));
        assert_eq!(config.molecules.sources.len(), 3);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = NovaConfig::from_toml(
            r#"
            [molecules]
            keep_columns = ["uid", "SMILES"]

            [md]
            results_dir = "out"
            "#,
        )
        .unwrap();

        assert_eq!(config.molecules.keep_columns, vec!["uid", "SMILES"]);
        assert_eq!(config.molecules.base_dir, PathBuf::from("data/base"));
        assert_eq!(config.md.results_dir, PathBuf::from("out"));
        assert_eq!(config.md.summary_decimals, 4);
        assert!(config.mmpbsa.is_none());
    }

    #[test]
    fn test_mmpbsa_requires_every_suffix() {
        let err = NovaConfig::from_toml(
            r#"
            [mmpbsa]
            base_dir = "runs"
            np = 4
            interval = 250
            groups = [1, 13]
            tpr_suffix = ".tpr"
            xtc_suffix = "-noPBC.xtc"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, NovaError::Toml(_)));
        assert!(err.to_string().contains("top_suffix"));
    }

    #[test]
    fn test_mmpbsa_optional_fields_default() {
        let config = NovaConfig::from_toml(
            r#"
            [mmpbsa]
            base_dir = "runs"
            np = 4
            interval = 250
            groups = [1, 13]
            tpr_suffix = ".tpr"
            xtc_suffix = "-noPBC.xtc"
            top_suffix = ".top"
            "#,
        )
        .unwrap();
        let mmpbsa = config.mmpbsa().unwrap();
        assert!(mmpbsa.nogui);
        assert!(mmpbsa.clean);
        assert_eq!(mmpbsa.program, "gmx_MMPBSA");
        assert_eq!(mmpbsa.launcher, "mpirun");
    }

    #[test]
    fn test_rejects_bad_groups() {
        let err = NovaConfig::from_toml(
            r#"
            [mmpbsa]
            base_dir = "runs"
            np = 4
            interval = 250
            groups = [1]
            tpr_suffix = ".tpr"
            xtc_suffix = ".xtc"
            top_suffix = ".top"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, NovaError::Config(_)));
    }

    #[test]
    fn test_sources_from_toml() {
        let config = NovaConfig::from_toml(
            r#"
            [[molecules.sources]]
            format = "tabular"
            name = "coconut"
            file = "coconut.csv"
            "#,
        )
        .unwrap();
        assert_eq!(config.molecules.sources.len(), 1);
        assert_eq!(config.molecules.sources[0].name(), "coconut");
    }

    #[test]
    fn test_load_resolves_root_against_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nova.toml");
        fs::write(&path, "root = \"project\"\n").unwrap();

        let config = NovaConfig::load(&path).unwrap();
        assert_eq!(config.root, dir.path().join("project"));
    }
}
