//! GROMACS `.xvg` time-series reader.
//!
//! Lines whose first non-blank character is `#` or `@` are comments, and
//! any text after an inline `#` or `@` is discarded. Remaining lines are
//! whitespace-separated numeric columns; every row must have the same
//! width.

use crate::error::{NovaError, Result};

/// Numeric rows of an xvg file.
#[derive(Debug, Clone, PartialEq)]
pub struct XvgData {
    pub rows: Vec<Vec<f64>>,
}

impl XvgData {
    /// Values of one column (zero-based).
    pub fn column(&self, index: usize) -> Result<Vec<f64>> {
        let width = self.rows.first().map(Vec::len).unwrap_or(0);
        if index >= width {
            return Err(NovaError::Parse {
                row: 1,
                column: index + 1,
                message: format!("expected at least {} columns, found {}", index + 1, width),
            });
        }
        Ok(self.rows.iter().map(|r| r[index]).collect())
    }
}

/// Parse xvg text. Fails on non-numeric fields, ragged rows, or no data.
pub fn parse_xvg(text: &str) -> Result<XvgData> {
    let mut rows: Vec<Vec<f64>> = Vec::new();

    for (line_no, line) in text.lines().enumerate() {
        let content = match line.find(['#', '@']) {
            Some(pos) => &line[..pos],
            None => line,
        };
        if content.trim().is_empty() {
            continue;
        }

        let row = content
            .split_whitespace()
            .enumerate()
            .map(|(col, field)| {
                field.parse::<f64>().map_err(|_| NovaError::Parse {
                    row: line_no + 1,
                    column: col + 1,
                    message: format!("invalid number '{}'", field),
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        if let Some(first) = rows.first() {
            if first.len() != row.len() {
                return Err(NovaError::Parse {
                    row: line_no + 1,
                    column: row.len(),
                    message: format!("expected {} columns, found {}", first.len(), row.len()),
                });
            }
        }
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(NovaError::EmptyData("no data rows in xvg file".to_string()));
    }
    Ok(XvgData { rows })
}

/// The signal column of an RMSD/RMSF file (second column).
pub fn signal(text: &str) -> Result<Vec<f64>> {
    parse_xvg(text)?.column(1)
}
