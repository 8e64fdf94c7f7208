//! CSV writer with atomic replacement of the target file.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{NovaError, Result};
use super::data::DataTable;

/// Write a table as comma-separated values with a header row.
///
/// The parent directory is created if needed. Data goes to a sibling
/// temporary file first and is renamed over `path` once complete, so a
/// failed write never leaves a partial artifact behind.
pub fn write_csv(table: &DataTable, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| NovaError::io(parent, e))?;
        }
    }

    let tmp = temp_path(path);
    if let Err(e) = write_to(table, &tmp) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }

    fs::rename(&tmp, path).map_err(|e| NovaError::io(path, e))?;
    tracing::debug!(
        path = %path.display(),
        rows = table.row_count(),
        columns = table.column_count(),
        "wrote table"
    );
    Ok(())
}

fn write_to(table: &DataTable, path: &Path) -> Result<()> {
    let file = fs::File::create(path).map_err(|e| NovaError::io(path, e))?;
    let mut writer = csv::Writer::from_writer(file);

    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer.flush().map_err(|e| NovaError::io(path, e))?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::read_csv;
    use tempfile::TempDir;

    #[test]
    fn test_write_then_read_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("out.csv");

        let table = DataTable::new(
            vec!["SMILES".into(), "ID".into()],
            vec![
                vec!["CCO".into(), "a,b".into()],
                vec!["".into(), "x".into()],
            ],
        );
        write_csv(&table, &path).unwrap();

        let back = read_csv(&path).unwrap();
        assert_eq!(back, table);
        assert!(!dir.path().join("nested").join("out.csv.tmp").exists());
    }

    #[test]
    fn test_write_overwrites_existing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        fs::write(&path, "old,content\n1,2\n3,4\n").unwrap();

        let table = DataTable::new(vec!["a".into()], vec![vec!["1".into()]]);
        write_csv(&table, &path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "a\n1\n");
    }
}
