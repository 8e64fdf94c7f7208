//! Molecular-dynamics summary pipeline.
//!
//! Per-ligand analysis files (RMSD and RMSF time series, MMPBSA energy
//! decompositions) are reduced to mean/standard-deviation records, one
//! summary table per kind, then reconciled into a single table keyed by
//! ligand.

pub mod aggregate;
pub mod mmpbsa;
pub mod naming;
pub mod reconcile;
pub mod stats;
pub mod xvg;

pub use aggregate::{AnalysisKind, BatchSummary, FileOutcome, SummaryRecord, aggregate_directory, aggregate_file};
pub use naming::{LigandKey, UNKNOWN_PROTEIN, parse_file_name};
pub use reconcile::{REQUIRED_COLUMNS, ReconcileReport, reconcile, reconcile_files};
pub use stats::{Summary, round_to};
