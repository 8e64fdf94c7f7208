//! Allow-list column projection.

use serde::Serialize;

use crate::table::DataTable;

/// Keeps an ordered allow-list of columns.
#[derive(Debug, Clone)]
pub struct ColumnProjector {
    keep: Vec<String>,
}

/// Projected table plus the allow-listed names that were absent.
#[derive(Debug, Clone)]
pub struct Projection {
    pub table: DataTable,
    pub missing: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectionSummary {
    pub rows: usize,
    pub columns: Vec<String>,
    pub missing: Vec<String>,
}

impl Projection {
    pub fn summary(&self) -> ProjectionSummary {
        ProjectionSummary {
            rows: self.table.row_count(),
            columns: self.table.headers.clone(),
            missing: self.missing.clone(),
        }
    }
}

impl ColumnProjector {
    pub fn new(keep: Vec<String>) -> Self {
        Self { keep }
    }

    pub fn columns(&self) -> &[String] {
        &self.keep
    }

    /// Select the allow-listed columns that exist, in allow-list order.
    ///
    /// Absent columns are dropped with a warning, never an error.
    pub fn project(&self, table: &DataTable) -> Projection {
        let missing: Vec<String> = self
            .keep
            .iter()
            .filter(|name| !table.has_column(name))
            .cloned()
            .collect();
        if !missing.is_empty() {
            tracing::warn!(missing = ?missing, "projection columns not present in table");
        }

        let names: Vec<&str> = self.keep.iter().map(String::as_str).collect();
        let projected = table.select(&names);
        tracing::info!(columns = ?projected.headers, rows = projected.row_count(), "projected columns");

        Projection {
            table: projected,
            missing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_in_allow_list_order() {
        let table = DataTable::new(
            vec!["SMILES".into(), "ID".into(), "uid".into(), "source".into()],
            vec![vec!["CCO".into(), "1".into(), "u".into(), "a".into()]],
        );
        let projector = ColumnProjector::new(vec!["uid".into(), "SMILES".into(), "source".into()]);
        let projection = projector.project(&table);

        assert_eq!(projection.table.headers, vec!["uid", "SMILES", "source"]);
        assert_eq!(projection.table.rows[0], vec!["u", "CCO", "a"]);
        assert!(projection.missing.is_empty());
    }

    #[test]
    fn test_missing_columns_are_reported_not_fatal() {
        let table = DataTable::new(vec!["SMILES".into()], vec![vec!["C".into()]]);
        let projector = ColumnProjector::new(vec!["uid".into(), "SMILES".into()]);
        let projection = projector.project(&table);

        assert_eq!(projection.table.headers, vec!["SMILES"]);
        assert_eq!(projection.missing, vec!["uid"]);
        assert_eq!(projection.summary().rows, 1);
    }
}
