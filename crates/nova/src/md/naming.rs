//! Ligand/protein keys derived from analysis file names.

use serde::Serialize;

/// Protein name used when a file name has no `-` separator.
pub const UNKNOWN_PROTEIN: &str = "unknown";

/// Identity of an analysis file: `<ligand>-<protein><tag>.<ext>`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct LigandKey {
    pub protein: String,
    pub ligand: String,
}

/// Derive the key from a file name.
///
/// The extension is removed, then the kind tag if present; the remainder
/// is split on the first `-`.
pub fn parse_file_name(file_name: &str, extension: &str, tag: &str) -> LigandKey {
    let stem = file_name.strip_suffix(extension).unwrap_or(file_name);
    let stem = stem.strip_suffix(tag).unwrap_or(stem);

    match stem.split_once('-') {
        Some((ligand, protein)) => LigandKey {
            protein: protein.to_string(),
            ligand: ligand.to_string(),
        },
        None => LigandKey {
            protein: UNKNOWN_PROTEIN.to_string(),
            ligand: stem.to_string(),
        },
    }
}
