//! CLI command implementations.

pub mod init;
pub mod inspect;
pub mod md;
pub mod mmpbsa;
pub mod molecules;
pub mod status;
