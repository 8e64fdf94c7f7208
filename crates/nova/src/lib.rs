//! Nova: batch pipelines for a drug-discovery data workflow.
//!
//! Two independent pipelines share one configuration, one logging setup
//! and one CSV table layer:
//!
//! - **Molecules**: normalize heterogeneous molecule sources (delimited
//!   lists, SDF containers, CSV tables) to a common `SMILES`/`ID` layout,
//!   merge them by structural identity with a content-addressed `uid`, and
//!   project the merged table onto a column allow-list.
//! - **MD summaries**: reduce per-ligand RMSD, RMSF and MMPBSA outputs to
//!   mean/standard-deviation records and reconcile them into one table.
//!
//! # Example
//!
//! ```no_run
//! use nova::{NovaConfig, pipeline};
//!
//! let config = NovaConfig::with_root("project");
//! pipeline::setup_directories(&config).unwrap();
//! let report = pipeline::run_molecule_pipeline(&config).unwrap();
//!
//! println!("Merged rows: {}", report.merge.rows_out);
//! ```

pub mod config;
pub mod error;
pub mod md;
pub mod molecule;
pub mod pipeline;
pub mod schema;
pub mod status;
pub mod table;
pub mod tools;

pub use config::{MdConfig, MmpbsaConfig, MoleculeConfig, NovaConfig};
pub use error::{NovaError, Result};
pub use md::{AnalysisKind, BatchSummary, LigandKey, ReconcileReport, Summary};
pub use molecule::{IdentityMerger, MergeReport, MoleculeSource, compute_uid};
pub use schema::{ColumnType, TableProfile};
pub use status::{InspectReport, StatusReport, artifact_status, inspect};
pub use table::DataTable;
