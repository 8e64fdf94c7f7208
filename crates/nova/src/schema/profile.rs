//! Column type inference and whole-table profiles.

use indexmap::IndexMap;
use serde::Serialize;

use crate::table::DataTable;
use super::types::ColumnType;

/// Summary of a table's shape and inferred schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableProfile {
    /// Number of data rows.
    pub rows: usize,
    /// Number of columns.
    pub columns: usize,
    /// Inferred type per column, in column order.
    pub schema: IndexMap<String, ColumnType>,
    /// Non-null cell count per column.
    pub non_null: IndexMap<String, usize>,
    /// Rows with no null cell.
    pub complete_rows: usize,
}

impl TableProfile {
    /// Percentage of rows with no null cell (0 for an empty table).
    pub fn complete_percentage(&self) -> f64 {
        if self.rows == 0 {
            0.0
        } else {
            self.complete_rows as f64 * 100.0 / self.rows as f64
        }
    }
}

/// Profile a table: shape, per-column type, null counts.
pub fn profile_table(table: &DataTable) -> TableProfile {
    let mut schema = IndexMap::new();
    let mut non_null = IndexMap::new();

    for (index, name) in table.headers.iter().enumerate() {
        schema.insert(name.clone(), infer_column_type(table.column_values(index)));
        let count = table.column_values(index).filter(|v| !is_null(v)).count();
        non_null.insert(name.clone(), count);
    }

    let complete_rows = table
        .rows
        .iter()
        .filter(|row| row.iter().all(|v| !is_null(v)))
        .count();

    TableProfile {
        rows: table.row_count(),
        columns: table.column_count(),
        schema,
        non_null,
        complete_rows,
    }
}

/// Infer a single type that every non-null value in the column satisfies.
///
/// Integer widens to float; any other mix falls back to string.
pub fn infer_column_type<'a>(values: impl Iterator<Item = &'a str>) -> ColumnType {
    let mut inferred = ColumnType::Null;

    for value in values {
        if is_null(value) {
            continue;
        }
        let detected = detect_value_type(value);
        inferred = match (inferred, detected) {
            (ColumnType::Null, t) => t,
            (a, b) if a == b => a,
            (ColumnType::Integer, ColumnType::Float) | (ColumnType::Float, ColumnType::Integer) => {
                ColumnType::Float
            }
            _ => return ColumnType::String,
        };
    }

    inferred
}

/// Detect the type of a single value.
fn detect_value_type(value: &str) -> ColumnType {
    let trimmed = value.trim();

    if trimmed.eq_ignore_ascii_case("true") || trimmed.eq_ignore_ascii_case("false") {
        return ColumnType::Boolean;
    }

    if trimmed.parse::<i64>().is_ok() {
        return ColumnType::Integer;
    }

    if trimmed.parse::<f64>().is_ok() {
        return ColumnType::Float;
    }

    ColumnType::String
}

fn is_null(value: &str) -> bool {
    value.trim().is_empty()
}
