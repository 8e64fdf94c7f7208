//! Content-addressed molecule identifiers.

use sha2::{Digest, Sha256};

use crate::table::DataTable;
use super::{SMILES_COLUMN, UID_COLUMN};

/// Lowercase hex SHA-256 of the SMILES string's UTF-8 bytes.
pub fn compute_uid(smiles: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(smiles.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Compute `uid` for every row from its `SMILES` cell.
///
/// Existing `uid` values are overwritten. Rows with a null `SMILES` get a
/// null `uid`. Tables without a `SMILES` column get an all-null `uid`.
pub fn assign_uids(table: &mut DataTable) {
    let uids: Vec<String> = match table.column_index(SMILES_COLUMN) {
        Some(index) => table
            .column_values(index)
            .map(|smiles| {
                if smiles.is_empty() {
                    String::new()
                } else {
                    compute_uid(smiles)
                }
            })
            .collect(),
        None => vec![String::new(); table.row_count()],
    };
    table.set_column(UID_COLUMN, uids);
}
