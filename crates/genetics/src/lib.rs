//! # Parasite Genetics Crate
//!
//! The `genetics` crate models the genetic state of malaria parasites as
//! fixed-length marker sequences. It includes the chromosome layout, the
//! registry of tracked genome locations, a content-addressed genome store
//! with reference-counted handles, and the meiotic recombination engine
//! used when two parasite genomes combine inside a mosquito.

pub mod base;
pub mod errors;
pub mod evolution;
pub mod genetics;
pub mod genome;
pub mod layout;
pub mod prelude;
pub mod storage;

pub use base::{Nucleotide, RandomSource};
pub use genetics::ParasiteGenetics;
pub use genome::{Genome, GenomeRecord, GenomeStore};
