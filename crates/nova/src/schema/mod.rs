//! Schema inference and table profiling.

mod profile;
mod types;

pub use profile::{TableProfile, infer_column_type, profile_table};
pub use types::ColumnType;
