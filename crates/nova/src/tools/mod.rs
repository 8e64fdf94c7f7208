//! Drivers for external simulation tooling.

pub mod gmx_mmpbsa;

pub use gmx_mmpbsa::{DirectoryRun, MmpbsaDriver, edit_interval, extract_summary};
