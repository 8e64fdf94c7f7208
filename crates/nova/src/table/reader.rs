//! CSV/TSV reader.

use std::fs;
use std::path::Path;

use crate::error::{NovaError, Result};
use super::data::DataTable;

/// Reader configuration.
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Field delimiter.
    pub delimiter: u8,
    /// Whether the file has a header row.
    pub has_header: bool,
    /// Column names for header-less input (positional).
    pub column_names: Option<Vec<String>>,
    /// Quote character.
    pub quote: u8,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_header: true,
            column_names: None,
            quote: b'"',
        }
    }
}

/// Reads delimited text files into a [`DataTable`].
pub struct CsvReader {
    config: ReaderConfig,
}

impl CsvReader {
    /// Create a reader for comma-separated files with a header row.
    pub fn new() -> Self {
        Self {
            config: ReaderConfig::default(),
        }
    }

    /// Create a reader with custom configuration.
    pub fn with_config(config: ReaderConfig) -> Self {
        Self { config }
    }

    /// Read a file from disk.
    pub fn read_file(&self, path: impl AsRef<Path>) -> Result<DataTable> {
        let path = path.as_ref();
        let contents = fs::read(path).map_err(|e| NovaError::io(path, e))?;
        self.read_bytes(&contents)
    }

    /// Parse bytes directly.
    pub fn read_bytes(&self, bytes: &[u8]) -> Result<DataTable> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.config.delimiter)
            .has_headers(self.config.has_header)
            .quote(self.config.quote)
            .flexible(true)
            .from_reader(bytes);

        let mut headers: Vec<String> = if self.config.has_header {
            reader.headers()?.iter().map(|s| s.to_string()).collect()
        } else {
            self.config.column_names.clone().unwrap_or_default()
        };

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            rows.push(record.iter().map(|s| s.to_string()).collect::<Vec<String>>());
        }

        if headers.is_empty() {
            // Header-less input without configured names.
            let width = rows.iter().map(Vec::len).max().unwrap_or(0);
            if width == 0 {
                return Err(NovaError::EmptyData("No columns found".to_string()));
            }
            headers = (0..width).map(|i| format!("column_{}", i + 1)).collect();
        }

        Ok(DataTable::new(headers, rows))
    }
}

impl Default for CsvReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Read a comma-separated file with a header row.
pub fn read_csv(path: impl AsRef<Path>) -> Result<DataTable> {
    CsvReader::new().read_file(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_csv_with_header() {
        let reader = CsvReader::new();
        let table = reader
            .read_bytes(b"SMILES,ID\nCCO,ethanol\nC,methane\n")
            .unwrap();

        assert_eq!(table.headers, vec!["SMILES", "ID"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.get(1, 1), Some("methane"));
    }

    #[test]
    fn test_read_headerless_with_names() {
        let reader = CsvReader::with_config(ReaderConfig {
            delimiter: b'\t',
            has_header: false,
            column_names: Some(vec!["SMILES".into(), "ID".into()]),
            ..ReaderConfig::default()
        });
        let table = reader
            .read_bytes(b"CCO\tLTS0001\textra\nCN\n")
            .unwrap();

        assert_eq!(table.headers, vec!["SMILES", "ID"]);
        assert_eq!(table.get(0, 1), Some("LTS0001"));
        assert_eq!(table.rows[0].len(), 2);
        assert_eq!(table.get(1, 1), Some(""));
    }

    #[test]
    fn test_read_headerless_generates_names() {
        let reader = CsvReader::with_config(ReaderConfig {
            has_header: false,
            ..ReaderConfig::default()
        });
        let table = reader.read_bytes(b"a,b,c\n").unwrap();
        assert_eq!(table.headers, vec!["column_1", "column_2", "column_3"]);
    }

    #[test]
    fn test_header_only_file_is_empty_table() {
        let table = CsvReader::new().read_bytes(b"SMILES,ID\n").unwrap();
        assert_eq!(table.column_count(), 2);
        assert!(table.is_empty());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = read_csv("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, NovaError::Io { .. }));
    }
}
