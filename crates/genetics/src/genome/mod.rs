//! Genome records, the content-addressed genome store, and genome handles.
//!
//! A [`GenomeRecord`] is immutable once built. Records are deduplicated by
//! their content hash in a [`GenomeStore`], and client code only touches them
//! through [`Genome`] handles.

mod handle;
mod record;
mod store;

pub use handle::{Genome, GenomeAllele};
pub use record::{barcode_hash, sequence_hash, GenomeRecord, HASH_SEED};
pub use store::{GenomeIdGenerator, GenomeStore};
