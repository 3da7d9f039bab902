//! Storage module for persisting the genome store.
//!
//! The archive captures every stored genome plus the ID generator so that a
//! restarted process continues handing out fresh IDs.

mod archive;

pub use archive::{ArchivedGenome, GenomeArchive};
