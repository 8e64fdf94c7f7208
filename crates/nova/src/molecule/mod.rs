//! Molecule dataset pipeline: source readers, identity merge, projection.

mod aromaticity;
pub mod identity;
pub mod merge;
pub mod projection;
pub mod sdf;
pub mod smiles;
pub mod source;
mod stereo;

pub use identity::{assign_uids, compute_uid};
pub use merge::{IdentityMerger, MergeReport, concat_diagonal, dedupe_first};
pub use projection::{ColumnProjector, Projection, ProjectionSummary};
pub use source::{IngestReport, MoleculeSource};

/// Structural identity column.
pub const SMILES_COLUMN: &str = "SMILES";
/// Source-local accession column.
pub const ID_COLUMN: &str = "ID";
/// Origin dataset column attached during merge.
pub const SOURCE_COLUMN: &str = "source";
/// Content-addressed identifier column.
pub const UID_COLUMN: &str = "uid";
