//! Commonly used imports for convenience.
//!
//! This prelude module provides a convenient way to import the most commonly
//! used types and traits in the plasmogen genetics library.
//!
//! # Example
//!
//! ```
//! use plasmogen_genetics::prelude::*;
//!
//! let config = GeneticsConfig {
//!     barcode_locations: vec![100_000, 200_000, 700_000],
//!     var_gene_randomness: VarGeneRandomness::AllRandom,
//!     ..GeneticsConfig::default()
//! };
//! let genetics = ParasiteGenetics::new(&config).unwrap();
//! assert_eq!(genetics.registry().num_base_pairs(), 3);
//! ```

pub use crate::base::{Nucleotide, RandomSource};
pub use crate::errors::{self, ArchiveError, ConfigError, GenomeError};
pub use crate::evolution::{Crossover, RecombinationEngine};
pub use crate::genetics::{
    Configurable, GeneticsConfig, GenomeLocationRegistry, LocationType, ParasiteGenetics,
    VarGeneRandomness,
};
pub use crate::genome::{Genome, GenomeAllele, GenomeRecord, GenomeStore};
