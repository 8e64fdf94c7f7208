//! Tabular data model and CSV input/output.

mod data;
mod reader;
mod writer;

pub use data::DataTable;
pub use reader::{CsvReader, ReaderConfig, read_csv};
pub use writer::write_csv;
