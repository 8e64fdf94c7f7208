//! Batch driver for `gmx_MMPBSA`.
//!
//! Each sub-directory of the configured base directory holds one complex.
//! For every directory the driver creates the input file, sets the frame
//! interval, and runs the decomposition under the MPI launcher. Commands
//! block until the tool exits; a non-zero exit stops the batch.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::config::{MmpbsaConfig, NovaConfig};
use crate::error::{NovaError, Result};

// =============================================================================
// LAZY STATIC PATTERNS
// =============================================================================

static INTERVAL_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*interval").expect("valid interval pattern"));

static DASH_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-+$").expect("valid dash pattern"));

/// Input file written by `--create_input`.
pub const INPUT_FILE: &str = "mmpbsa.in";

/// Line that opens the summary block in the compact results.
pub const SUMMARY_MARKER: &str = "Delta (Complex - Receptor - Ligand):";

/// Compact results file produced per run.
pub const COMPACT_RESULTS_FILE: &str = "COMPACT_MMXSA_RESULTS.mmxsa";

/// Outcome of one directory.
#[derive(Debug, Clone, Serialize)]
pub struct DirectoryRun {
    pub directory: PathBuf,
    pub results: PathBuf,
    /// Set when the run was skipped rather than executed.
    pub skipped: Option<String>,
    /// Extracted summary, when requested and available.
    pub summary: Option<PathBuf>,
}

/// Runs `gmx_MMPBSA` over every complex directory.
#[derive(Debug, Clone)]
pub struct MmpbsaDriver {
    config: MmpbsaConfig,
    base_dir: PathBuf,
}

impl MmpbsaDriver {
    /// Build a driver from the `[mmpbsa]` section.
    pub fn new(config: &NovaConfig) -> Result<Self> {
        let mmpbsa = config.mmpbsa()?.clone();
        let base_dir = config.resolve(&mmpbsa.base_dir);
        Ok(Self {
            config: mmpbsa,
            base_dir,
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Results file name for a complex directory.
    pub fn results_file(dir_name: &str) -> String {
        format!("{}_RESULTS_MMPBSA.dat", dir_name)
    }

    /// Command that writes a default `mmpbsa.in`.
    pub fn create_input_command(&self) -> Vec<String> {
        vec![self.config.program.clone(), "--create_input".to_string()]
    }

    /// Full launcher command line for one complex directory.
    pub fn build_command(&self, dir_name: &str) -> Vec<String> {
        let c = &self.config;
        let groups = c
            .groups
            .iter()
            .map(|g| g.to_string())
            .collect::<Vec<_>>()
            .join(",");

        let mut argv = vec![
            c.launcher.clone(),
            "-np".to_string(),
            c.np.to_string(),
            c.program.clone(),
        ];
        if c.nogui {
            argv.push("-nogui".to_string());
        }
        argv.extend([
            "-O".to_string(),
            "-i".to_string(),
            INPUT_FILE.to_string(),
            "-cs".to_string(),
            format!("sdm-{}{}", dir_name, c.tpr_suffix),
            "-ci".to_string(),
            "index.ndx".to_string(),
            "-cg".to_string(),
            groups,
            "-ct".to_string(),
            format!("sdm-{}{}", dir_name, c.xtc_suffix),
            "-o".to_string(),
            Self::results_file(dir_name),
            "-eo".to_string(),
            format!("{}_ENERGY_MMPBSA.dat", dir_name),
            "-pf".to_string(),
            format!("{}{}", dir_name, c.top_suffix),
        ]);
        if c.clean {
            argv.push("--clean".to_string());
        }
        argv
    }

    /// Complex directories under the base directory, sorted by name.
    pub fn directories(&self) -> Result<Vec<PathBuf>> {
        let entries = fs::read_dir(&self.base_dir).map_err(|e| NovaError::io(&self.base_dir, e))?;
        let mut dirs = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| NovaError::io(&self.base_dir, e))?.path();
            if path.is_dir() {
                dirs.push(path);
            }
        }
        dirs.sort();
        Ok(dirs)
    }

    /// Process one complex directory.
    pub fn run_directory(&self, dir: &Path, extract: bool) -> Result<DirectoryRun> {
        let dir_name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut run = DirectoryRun {
            directory: dir.to_path_buf(),
            results: dir.join(Self::results_file(&dir_name)),
            skipped: None,
            summary: None,
        };

        tracing::info!(directory = %dir.display(), "processing complex");
        run_command(&self.create_input_command(), dir)?;

        let input = dir.join(INPUT_FILE);
        if !input.is_file() {
            tracing::warn!(directory = %dir.display(), "no {} created, skipping", INPUT_FILE);
            run.skipped = Some(format!("{} not found", INPUT_FILE));
            return Ok(run);
        }
        edit_interval(&input, self.config.interval)?;

        run_command(&self.build_command(&dir_name), dir)?;

        if extract {
            let compact = dir.join(COMPACT_RESULTS_FILE);
            if compact.is_file() {
                let output = dir.join(format!("{}_MMPBSA_SUMMARY.txt", dir_name));
                extract_summary(&compact, &output)?;
                run.summary = Some(output);
            } else {
                tracing::warn!(path = %compact.display(), "compact results not found, no summary extracted");
            }
        }

        Ok(run)
    }

    /// Process every complex directory in order. Stops at the first failure.
    pub fn run_all(&self, extract: bool) -> Result<Vec<DirectoryRun>> {
        let dirs = self.directories()?;
        if dirs.is_empty() {
            return Err(NovaError::NoInputs {
                dir: self.base_dir.clone(),
                pattern: "*/".to_string(),
            });
        }
        dirs.iter().map(|dir| self.run_directory(dir, extract)).collect()
    }
}

/// Run a command in `cwd`, returning its stdout.
fn run_command(argv: &[String], cwd: &Path) -> Result<String> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| NovaError::Config("empty command".to_string()))?;
    let command_line = argv.join(" ");
    tracing::debug!(command = %command_line, cwd = %cwd.display(), "running external command");

    let output = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .output()
        .map_err(|e| NovaError::ExternalTool {
            command: command_line.clone(),
            status: "spawn failure".to_string(),
            stderr: e.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        tracing::error!(command = %command_line, status = %output.status, stderr = %stderr, "external command failed");
        return Err(NovaError::ExternalTool {
            command: command_line,
            status: output.status.to_string(),
            stderr,
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Rewrite every line starting with `interval` to `interval = N`.
///
/// Returns the number of lines replaced. A missing file is fatal.
pub fn edit_interval(path: &Path, interval: u32) -> Result<usize> {
    let text = fs::read_to_string(path).map_err(|e| NovaError::io(path, e))?;

    let mut replaced = 0;
    let mut out = String::with_capacity(text.len());
    for line in text.lines() {
        if INTERVAL_LINE.is_match(line) {
            out.push_str(&format!("interval = {}", interval));
            replaced += 1;
        } else {
            out.push_str(line);
        }
        out.push('\n');
    }

    fs::write(path, out).map_err(|e| NovaError::io(path, e))?;
    tracing::debug!(path = %path.display(), interval, replaced, "updated frame interval");
    Ok(replaced)
}

/// Copy the summary block of a compact results file to `output`.
///
/// Copies from the marker line through the second consecutive dash-only
/// line. Returns the number of lines written; a missing marker writes an
/// empty file.
pub fn extract_summary(compact: &Path, output: &Path) -> Result<usize> {
    let text = fs::read_to_string(compact).map_err(|e| NovaError::io(compact, e))?;

    let mut lines = Vec::new();
    let mut capturing = false;
    let mut dashes = 0;
    for line in text.lines() {
        if !capturing {
            if line.contains(SUMMARY_MARKER) {
                capturing = true;
                lines.push(line);
            }
            continue;
        }
        lines.push(line);
        if DASH_LINE.is_match(line.trim()) {
            dashes += 1;
            if dashes == 2 {
                break;
            }
        } else {
            dashes = 0;
        }
    }

    if lines.is_empty() {
        tracing::warn!(path = %compact.display(), "summary marker not found");
    }

    let mut body = lines.join("\n");
    if !body.is_empty() {
        body.push('\n');
    }
    fs::write(output, body).map_err(|e| NovaError::io(output, e))?;
    Ok(lines.len())
}
