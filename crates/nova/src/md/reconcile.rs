//! Reconcile the per-kind summaries into one table keyed by ligand.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{NovaError, Result};
use crate::table::{DataTable, read_csv, write_csv};
use super::aggregate::AnalysisKind;
use super::mmpbsa::ENERGY_TERMS;
use super::stats::round_to;

/// Join key.
pub const LIGAND_COLUMN: &str = "ligand";

/// Suffix for right-hand non-key columns that collide with the left.
const COLLISION_SUFFIX: &str = "_right";

/// Columns of the combined summary, in output order.
pub const REQUIRED_COLUMNS: [&str; 15] = [
    "ligand",
    "RMSD_mean",
    "RMSD_std",
    "RMSF_mean",
    "RMSF_std",
    "VDWAALS_mean",
    "VDWAALS_std",
    "EEL_mean",
    "EEL_std",
    "EGB_mean",
    "EGB_std",
    "ESURF_mean",
    "ESURF_std",
    "TOTAL_mean",
    "TOTAL_std",
];

/// Outcome of a reconcile run.
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileReport {
    pub rows: usize,
    pub columns: Vec<String>,
    pub output: PathBuf,
}

/// Legacy column names mapped to canonical ones, per kind.
pub fn rename_map(kind: AnalysisKind) -> Vec<(String, String)> {
    let pairs = |list: &[(&str, &str)]| -> Vec<(String, String)> {
        list.iter()
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect()
    };

    match kind {
        AnalysisKind::Rmsd => pairs(&[
            ("Media RMSD (nm)", "RMSD_mean"),
            ("Desv. Est. RMSD (nm)", "RMSD_std"),
            ("Desv. Est. (nm)", "RMSD_std"),
            ("mean_rmsd", "RMSD_mean"),
            ("std_rmsd", "RMSD_std"),
        ]),
        AnalysisKind::Rmsf => pairs(&[
            ("mean_rmsf", "RMSF_mean"),
            ("std_rmsf", "RMSF_std"),
            ("Media RMSF (nm)", "RMSF_mean"),
            ("Desv. Est. RMSF (nm)", "RMSF_std"),
        ]),
        AnalysisKind::Mmpbsa => ENERGY_TERMS
            .iter()
            .flat_map(|term| {
                let lower = term.to_lowercase();
                [
                    (format!("mean_{}", lower), format!("{}_mean", term)),
                    (format!("{}_avg", term), format!("{}_mean", term)),
                    (format!("std_{}", lower), format!("{}_std", term)),
                    (format!("{}_sd", term), format!("{}_std", term)),
                ]
            })
            .collect(),
    }
}

/// Apply renames present in the table; unknown columns pass through.
///
/// A rename whose target already exists is skipped with a warning.
pub fn apply_renames(table: &mut DataTable, renames: &[(String, String)]) {
    for (from, to) in renames {
        if !table.has_column(from) {
            continue;
        }
        if table.has_column(to) {
            tracing::warn!(from = %from, to = %to, "rename target already present, keeping both columns");
            continue;
        }
        table.rename_column(from, to);
    }
}

/// Strip kind tags and surrounding whitespace from a ligand name.
pub fn normalize_ligand(name: &str) -> String {
    name.replace("-rmsd", "")
        .replace("-rmsf", "")
        .replace("_RESULTS_MMPBSA", "")
        .trim()
        .to_string()
}

/// Normalize every `ligand` cell. Tables without the column are untouched.
pub fn normalize_ligands(table: &mut DataTable) {
    if let Some(index) = table.column_index(LIGAND_COLUMN) {
        for row in &mut table.rows {
            row[index] = normalize_ligand(&row[index]);
        }
    }
}

/// Full outer join on `key`.
///
/// Left rows keep their order, followed by right-only rows. Right non-key
/// columns that collide with left names get a `_right` suffix. Duplicate
/// keys within one side keep their first row.
pub fn outer_join(left: &DataTable, right: &DataTable, key: &str) -> Result<DataTable> {
    if !left.has_column(key) || !right.has_column(key) {
        return Err(NovaError::MissingColumns {
            columns: vec![key.to_string()],
        });
    }

    let left = first_per_key(left, key);
    let right = first_per_key(right, key);
    let left_key = left.column_index(key).unwrap_or(0);
    let right_key = right.column_index(key).unwrap_or(0);

    let right_cols: Vec<usize> = (0..right.column_count()).filter(|&i| i != right_key).collect();
    let mut headers = left.headers.clone();
    for &i in &right_cols {
        let mut name = right.headers[i].clone();
        while headers.contains(&name) {
            name.push_str(COLLISION_SUFFIX);
        }
        headers.push(name);
    }

    let right_index: HashMap<&str, usize> = right
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| (row[right_key].as_str(), i))
        .collect();

    let mut result = DataTable::with_headers(headers);
    let mut matched = vec![false; right.row_count()];

    for row in &left.rows {
        let mut out = row.clone();
        match right_index.get(row[left_key].as_str()) {
            Some(&r) => {
                matched[r] = true;
                out.extend(right_cols.iter().map(|&i| right.rows[r][i].clone()));
            }
            None => out.extend(right_cols.iter().map(|_| String::new())),
        }
        result.rows.push(out);
    }

    for (r, row) in right.rows.iter().enumerate() {
        if matched[r] {
            continue;
        }
        let mut out = vec![String::new(); left.column_count()];
        out[left_key] = row[right_key].clone();
        out.extend(right_cols.iter().map(|&i| row[i].clone()));
        result.rows.push(out);
    }

    Ok(result)
}

fn first_per_key(table: &DataTable, key: &str) -> DataTable {
    let (deduped, removed) = crate::molecule::dedupe_first(table, key);
    if removed > 0 {
        tracing::warn!(column = key, removed, "duplicate keys in join input, keeping first row");
    }
    deduped
}

/// Reconcile the three summaries into the combined table.
///
/// Fails with [`NovaError::MissingColumns`] naming every required column
/// absent after the joins.
pub fn reconcile(
    rmsd: &DataTable,
    rmsf: &DataTable,
    mmpbsa: &DataTable,
    decimals: u32,
) -> Result<DataTable> {
    let mut inputs = [rmsd.clone(), rmsf.clone(), mmpbsa.clone()];
    for (table, kind) in inputs.iter_mut().zip(AnalysisKind::ALL) {
        normalize_ligands(table);
        apply_renames(table, &rename_map(kind));
    }
    let [rmsd, rmsf, mmpbsa] = inputs;

    let merged = outer_join(&rmsd, &rmsf, LIGAND_COLUMN)
        .and_then(|m| outer_join(&m, &mmpbsa, LIGAND_COLUMN));
    let merged = match merged {
        Ok(m) => m,
        Err(e) => {
            log_input_columns(&rmsd, &rmsf, &mmpbsa);
            return Err(e);
        }
    };

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| !merged.has_column(c))
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        log_input_columns(&rmsd, &rmsf, &mmpbsa);
        return Err(NovaError::MissingColumns { columns: missing });
    }

    let mut result = merged.select(&REQUIRED_COLUMNS);
    result.rows.sort_by(|a, b| a[0].cmp(&b[0]));
    round_numeric_cells(&mut result, decimals);
    Ok(result)
}

fn log_input_columns(rmsd: &DataTable, rmsf: &DataTable, mmpbsa: &DataTable) {
    tracing::error!(columns = ?rmsd.headers, "RMSD summary columns");
    tracing::error!(columns = ?rmsf.headers, "RMSF summary columns");
    tracing::error!(columns = ?mmpbsa.headers, "MMPBSA summary columns");
}

/// Round every numeric non-key cell; other cells are left as they are.
fn round_numeric_cells(table: &mut DataTable, decimals: u32) {
    for row in &mut table.rows {
        for cell in row.iter_mut().skip(1) {
            if DataTable::is_null_value(cell) {
                cell.clear();
                continue;
            }
            if let Ok(value) = cell.trim().parse::<f64>() {
                *cell = round_to(value, decimals).to_string();
            }
        }
    }
}

/// Read the three summary files, reconcile and write `output`.
///
/// Nothing is written on failure.
pub fn reconcile_files(
    rmsd_path: &Path,
    rmsf_path: &Path,
    mmpbsa_path: &Path,
    output: &Path,
    decimals: u32,
) -> Result<ReconcileReport> {
    let rmsd = read_csv(rmsd_path)?;
    let rmsf = read_csv(rmsf_path)?;
    let mmpbsa = read_csv(mmpbsa_path)?;

    let merged = reconcile(&rmsd, &rmsf, &mmpbsa, decimals)?;
    write_csv(&merged, output)?;

    tracing::info!(rows = merged.row_count(), output = %output.display(), "wrote combined MD summary");
    Ok(ReconcileReport {
        rows: merged.row_count(),
        columns: merged.headers.clone(),
        output: output.to_path_buf(),
    })
}
