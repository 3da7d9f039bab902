//! Base types for allele representation and random draws.
//!
//! This module provides the foundational allele codes used by every genome
//! sequence and the random-number capability consumed by the stochastic parts
//! of the library.

mod nucleotide;
mod random;

pub use nucleotide::{parse_allele_string, Nucleotide, WILDCARD, WILDCARD_VALUE};
pub use random::RandomSource;
