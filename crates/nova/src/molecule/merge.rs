//! Identity merge of per-source molecule tables.
//!
//! Tables are concatenated with relaxed diagonal alignment, deduplicated on
//! `SMILES` keeping the first-seen row, and stamped with `source` and `uid`.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexSet;
use serde::Serialize;

use crate::error::{NovaError, Result};
use crate::table::{DataTable, read_csv, write_csv};
use super::identity::assign_uids;
use super::{SMILES_COLUMN, SOURCE_COLUMN};

/// Column renamed to `SMILES` before concatenation.
pub const CANONICAL_SMILES_COLUMN: &str = "canonical_smiles";

/// Summary of one merge run.
#[derive(Debug, Clone, Serialize)]
pub struct MergeReport {
    /// Loaded inputs as `(source, rows)` in merge order.
    pub inputs: Vec<(String, usize)>,
    /// Inputs that could not be read.
    pub skipped: Vec<PathBuf>,
    pub rows_in: usize,
    pub rows_out: usize,
    pub duplicates_removed: usize,
    pub columns: Vec<String>,
    pub output: Option<PathBuf>,
}

/// Merges normalized source tables on structural identity.
#[derive(Debug, Clone)]
pub struct IdentityMerger {
    suffix: String,
}

impl IdentityMerger {
    /// Create a merger for tables named `<source><suffix>.csv`.
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }

    /// Glob-style description of the discovered files.
    pub fn pattern(&self) -> String {
        format!("*{}.csv", self.suffix)
    }

    /// Source name from a normalized table's path: the stem without the
    /// normalization suffix.
    pub fn source_name(&self, path: &Path) -> String {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        match stem.strip_suffix(self.suffix.as_str()) {
            Some(name) => name.to_string(),
            None => stem,
        }
    }

    /// Normalized tables in `dir`, sorted by file name.
    pub fn discover(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let ending = format!("{}.csv", self.suffix);
        let entries = fs::read_dir(dir).map_err(|e| NovaError::io(dir, e))?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| NovaError::io(dir, e))?;
            let path = entry.path();
            let matches = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(&ending));
            if matches && path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }

    /// Merge in-memory tables given as `(source, table)` pairs.
    pub fn merge_tables(&self, inputs: Vec<(String, DataTable)>) -> Result<(DataTable, MergeReport)> {
        if inputs.is_empty() {
            return Err(NovaError::EmptyData("no datasets to merge".to_string()));
        }

        let mut report = MergeReport {
            inputs: Vec::with_capacity(inputs.len()),
            skipped: Vec::new(),
            rows_in: 0,
            rows_out: 0,
            duplicates_removed: 0,
            columns: Vec::new(),
            output: None,
        };

        let mut tables = Vec::with_capacity(inputs.len());
        for (source, mut table) in inputs {
            unify_identity_columns(&mut table);
            table.fill_column(SOURCE_COLUMN, &source);
            report.rows_in += table.row_count();
            report.inputs.push((source, table.row_count()));
            tables.push(table);
        }

        let combined = concat_diagonal(&tables);
        if !combined.has_column(SMILES_COLUMN) {
            return Err(NovaError::MissingColumns {
                columns: vec![SMILES_COLUMN.to_string()],
            });
        }

        let (mut merged, removed) = dedupe_first(&combined, SMILES_COLUMN);
        assign_uids(&mut merged);

        report.rows_out = merged.row_count();
        report.duplicates_removed = removed;
        report.columns = merged.headers.clone();
        Ok((merged, report))
    }

    /// Merge every normalized table in `dir` and write the result to `output`.
    ///
    /// Unreadable files are logged and skipped; finding none, or loading
    /// none, is fatal.
    pub fn merge_directory(&self, dir: &Path, output: &Path) -> Result<(DataTable, MergeReport)> {
        let paths = self.discover(dir)?;
        if paths.is_empty() {
            return Err(NovaError::NoInputs {
                dir: dir.to_path_buf(),
                pattern: self.pattern(),
            });
        }

        let mut inputs = Vec::new();
        let mut skipped = Vec::new();
        for path in paths {
            match read_csv(&path) {
                Ok(table) => {
                    let source = self.source_name(&path);
                    tracing::info!(source = %source, rows = table.row_count(), "loaded normalized table");
                    inputs.push((source, table));
                }
                Err(e) => {
                    tracing::error!(path = %path.display(), error = %e, "skipping unreadable table");
                    skipped.push(path);
                }
            }
        }

        if inputs.is_empty() {
            return Err(NovaError::EmptyData(format!(
                "no readable datasets in '{}'",
                dir.display()
            )));
        }

        let (merged, mut report) = self.merge_tables(inputs)?;
        write_csv(&merged, output)?;

        report.skipped = skipped;
        report.output = Some(output.to_path_buf());
        tracing::info!(
            rows_in = report.rows_in,
            rows_out = report.rows_out,
            duplicates = report.duplicates_removed,
            output = %output.display(),
            "merged molecule tables"
        );
        Ok((merged, report))
    }
}

/// Rename `canonical_smiles` to `SMILES`. When both exist, `canonical_smiles`
/// fills the empty `SMILES` cells and is then dropped.
fn unify_identity_columns(table: &mut DataTable) {
    if !table.has_column(SMILES_COLUMN) {
        table.rename_column(CANONICAL_SMILES_COLUMN, SMILES_COLUMN);
        return;
    }
    let (Some(canonical), Some(index)) = (
        table.remove_column(CANONICAL_SMILES_COLUMN),
        table.column_index(SMILES_COLUMN),
    ) else {
        return;
    };
    for (row, value) in table.rows.iter_mut().zip(canonical) {
        if row[index].trim().is_empty() {
            row[index] = value;
        }
    }
}

/// Concatenate tables over the union of their columns.
///
/// Columns appear in first-seen order; cells a table lacks are null.
pub fn concat_diagonal(tables: &[DataTable]) -> DataTable {
    let mut columns: IndexSet<String> = IndexSet::new();
    for table in tables {
        for header in &table.headers {
            columns.insert(header.clone());
        }
    }

    let mut result = DataTable::with_headers(columns.iter().cloned());
    for table in tables {
        let positions: Vec<usize> = table
            .headers
            .iter()
            .map(|h| columns.get_index_of(h).unwrap_or(0))
            .collect();
        for row in &table.rows {
            let mut out = vec![String::new(); columns.len()];
            for (value, &pos) in row.iter().zip(&positions) {
                out[pos] = value.clone();
            }
            result.rows.push(out);
        }
    }
    result
}

/// Keep the first row for each distinct value of `column`.
///
/// Null counts as one value. Returns the deduplicated table and the number
/// of rows removed. A missing column leaves the table unchanged.
pub fn dedupe_first(table: &DataTable, column: &str) -> (DataTable, usize) {
    let Some(index) = table.column_index(column) else {
        return (table.clone(), 0);
    };

    let mut seen: HashSet<&str> = HashSet::new();
    let rows: Vec<Vec<String>> = table
        .rows
        .iter()
        .filter(|row| seen.insert(row[index].as_str()))
        .cloned()
        .collect();

    let removed = table.row_count() - rows.len();
    (
        DataTable {
            headers: table.headers.clone(),
            rows,
        },
        removed,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::molecule::compute_uid;

    fn table(headers: &[&str], rows: &[&[&str]]) -> DataTable {
        DataTable::new(
            headers.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn test_source_name_strips_suffixes() {
        let merger = IdentityMerger::new("_processed");
        assert_eq!(merger.source_name(Path::new("/x/lotus_processed.csv")), "lotus");
        assert_eq!(merger.source_name(Path::new("other.csv")), "other");
    }

    #[test]
    fn test_concat_diagonal_union_of_columns() {
        let a = table(&["SMILES", "ID"], &[&["CCO", "a1"]]);
        let b = table(&["SMILES", "score"], &[&["C", "0.5"]]);
        let c = concat_diagonal(&[a, b]);

        assert_eq!(c.headers, vec!["SMILES", "ID", "score"]);
        assert_eq!(c.rows[0], vec!["CCO", "a1", ""]);
        assert_eq!(c.rows[1], vec!["C", "", "0.5"]);
    }

    #[test]
    fn test_merge_keeps_first_seen_and_stamps_source() {
        let merger = IdentityMerger::new("_processed");
        let inputs = vec![
            ("a".to_string(), table(&["SMILES", "ID"], &[&["CCO", "1"], &["C", "2"]])),
            (
                "b".to_string(),
                table(&["canonical_smiles", "ID", "source"], &[&["CCO", "3", "stale"]]),
            ),
        ];
        let (merged, report) = merger.merge_tables(inputs).unwrap();

        assert_eq!(merged.headers, vec!["SMILES", "ID", "source", "uid"]);
        assert_eq!(merged.row_count(), 2);
        assert_eq!(merged.get_by_name(0, "ID"), Some("1"));
        assert_eq!(merged.get_by_name(0, "source"), Some("a"));
        assert_eq!(merged.get_by_name(0, "uid"), Some(compute_uid("CCO").as_str()));
        assert_eq!(report.rows_in, 3);
        assert_eq!(report.duplicates_removed, 1);
    }

    #[test]
    fn test_canonical_smiles_folds_into_existing_smiles() {
        let merger = IdentityMerger::new("_processed");
        let inputs = vec![(
            "a".to_string(),
            table(
                &["SMILES", "canonical_smiles", "ID"],
                &[&["CCO", "OCC", "1"], &["", "CCN", "2"]],
            ),
        )];
        let (merged, _) = merger.merge_tables(inputs).unwrap();

        assert_eq!(merged.headers, vec!["SMILES", "ID", "source", "uid"]);
        assert_eq!(merged.get_by_name(0, "SMILES"), Some("CCO"));
        assert_eq!(merged.get_by_name(1, "SMILES"), Some("CCN"));
    }

    #[test]
    fn test_null_smiles_counts_once() {
        let (deduped, removed) = dedupe_first(
            &table(&["SMILES"], &[&[""], &["C"], &[""]]),
            "SMILES",
        );
        assert_eq!(deduped.row_count(), 2);
        assert_eq!(removed, 1);
    }

    #[test]
    fn test_merge_without_smiles_column_fails() {
        let merger = IdentityMerger::new("_processed");
        let err = merger
            .merge_tables(vec![("a".to_string(), table(&["ID"], &[&["1"]]))])
            .unwrap_err();
        assert!(matches!(err, NovaError::MissingColumns { .. }));
    }

    #[test]
    fn test_merge_directory_without_inputs() {
        let dir = tempfile::TempDir::new().unwrap();
        let merger = IdentityMerger::new("_processed");
        let err = merger
            .merge_directory(dir.path(), &dir.path().join("out.csv"))
            .unwrap_err();
        assert!(matches!(err, NovaError::NoInputs { .. }));
        assert!(!dir.path().join("out.csv").exists());
    }
}
