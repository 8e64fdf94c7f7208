//! `gmx_MMPBSA` per-frame energy CSV reader.
//!
//! The exported CSV holds several sections; the per-frame delta terms follow
//! a line containing `Delta Energy Terms`. The section's first line is the
//! header and it ends at the first blank line.

use crate::error::{NovaError, Result};
use crate::table::{CsvReader, DataTable};

/// Line that precedes the delta-terms header.
pub const DELTA_MARKER: &str = "Delta Energy Terms";

/// Energy terms summarized per file, in output order.
pub const ENERGY_TERMS: [&str; 5] = ["VDWAALS", "EEL", "EGB", "ESURF", "TOTAL"];

/// The delta-terms section as a table.
#[derive(Debug, Clone)]
pub struct EnergyTable {
    pub table: DataTable,
    /// False when the marker was absent and parsing started at line 0.
    pub marker_found: bool,
}

impl EnergyTable {
    /// Numeric values of a term column, or `None` if the column is absent.
    ///
    /// Null cells are skipped; any other non-numeric cell is an error.
    pub fn term_values(&self, term: &str) -> Result<Option<Vec<f64>>> {
        let Some(index) = self.table.column_index(term) else {
            return Ok(None);
        };

        let mut values = Vec::with_capacity(self.table.row_count());
        for (row, cell) in self.table.column_values(index).enumerate() {
            if DataTable::is_null_value(cell) {
                continue;
            }
            let value = cell.trim().parse::<f64>().map_err(|_| NovaError::Parse {
                row: row + 1,
                column: index + 1,
                message: format!("non-numeric {} value '{}'", term, cell),
            })?;
            values.push(value);
        }
        Ok(Some(values))
    }
}

/// Extract and parse the delta-terms section.
pub fn parse_energy_terms(text: &str) -> Result<EnergyTable> {
    let lines: Vec<&str> = text.lines().collect();
    let marker = lines.iter().position(|l| l.contains(DELTA_MARKER));
    let start = marker.map(|i| i + 1).unwrap_or(0);

    let mut section = String::new();
    for (offset, line) in lines.iter().skip(start).enumerate() {
        if offset > 0 && line.trim().is_empty() {
            break;
        }
        section.push_str(line);
        section.push('\n');
    }

    let mut table = CsvReader::new().read_bytes(section.as_bytes())?;
    table.headers = table
        .headers
        .iter()
        .map(|h| h.trim().replace('#', "").trim().to_string())
        .collect();

    if table.is_empty() {
        return Err(NovaError::EmptyData("no energy rows".to_string()));
    }

    Ok(EnergyTable {
        table,
        marker_found: marker.is_some(),
    })
}
