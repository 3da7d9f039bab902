//! Evolution module providing meiotic recombination.
//!
//! When two gametocyte genomes meet in the mosquito midgut they recombine
//! into four descendant genomes:
//! - **Crossover**: one obligate crossover per chromosome plus gamma-spaced
//!   secondary crossovers
//! - **Independent assortment**: one of 24 redistributions of each
//!   chromosome among the four products

pub mod recombination;

pub use recombination::{
    assortment_kind, find_crossovers, AssortmentKind, Chromatids, Crossover, CrossoverModel,
    RecombinationEngine, ASSORTMENTS, BP_PER_CENTIMORGAN,
};
