//! Error types for configuration, genome construction and archives.

use thiserror::Error;

/// Errors raised while validating the genetics configuration.
///
/// Every variant names the offending parameter(s) so the caller can fix the
/// input and try again.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Two tracked locations share the same genomic position.
    #[error(
        "Invalid configuration for parameters '{first}' and '{second}' - duplicate values.\n\
         {first}[ {first_index} ] = {second}[ {second_index} ] = {position}"
    )]
    DuplicateLocation {
        first: &'static str,
        first_index: usize,
        second: &'static str,
        second_index: usize,
        position: i32,
    },

    /// A genomic position lies outside `[1, MAX_LOCATIONS]`.
    #[error("'{param}'[ {index} ] = {position} is invalid; genome locations must be in [1, {max}]")]
    LocationOutOfRange {
        param: &'static str,
        index: usize,
        position: i32,
        max: i32,
    },

    /// The PfEMP1-major list does not hold the required number of locations.
    #[error("'PfEMP1_Variants_Genome_Locations' must define exactly {expected} locations, found {found}.")]
    WrongPfEmp1LocationCount { expected: usize, found: usize },

    /// More locations are tracked than the genome can address.
    #[error("The total number of genome locations ({count}) exceeds the maximum of {max}.")]
    TooManyLocations { count: usize, max: i32 },

    /// A neighborhood is wider than the variant space it samples from.
    #[error("'{neighborhood_param}' = {neighborhood} must be <= '{variants_param}' = {variants}")]
    NeighborhoodTooLarge {
        neighborhood_param: &'static str,
        neighborhood: i32,
        variants_param: &'static str,
        variants: i32,
    },

    /// A numeric parameter is outside its allowed range.
    #[error("'{param}' = {value} is out of range [{min}, {max}]")]
    OutOfRange {
        param: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// The configuration document could not be parsed.
    #[error("Failed to parse genetics configuration: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

/// Errors raised by the genome-construction paths.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenomeError {
    /// A character does not name an allele.
    #[error("The character '{character}' in the parameter '{param}' is invalid.\nValid values are: 'A', 'C', 'G', 'T'")]
    InvalidAlleleChar { param: String, character: char },

    /// An allele string does not match the number of configured locations.
    #[error(
        "The '{param}' = '{value}' is invalid.\n\
         It has {found} characters and '{location_param}' says you must have {expected}."
    )]
    WrongAlleleStringLength {
        param: String,
        value: String,
        found: usize,
        location_param: &'static str,
        expected: usize,
    },

    /// An allele string used for lookups contains only wildcards.
    #[error("The '{param}' = '{value}' is invalid.\nIt must contain at least one of 'A', 'C', 'G', 'T'.")]
    AllWildcards { param: String, value: String },

    /// An allele lookup was requested for a category with no locations.
    #[error("'{location_param}' has no locations; '{param}' cannot be used.")]
    NoLocations {
        param: String,
        location_param: &'static str,
    },

    /// A frequency table has the wrong number of rows.
    #[error("Invalid number of frequency sets in '{param}': found {found}, expected {expected} (one per location).")]
    WrongFrequencySetCount {
        param: String,
        found: usize,
        expected: usize,
    },

    /// A frequency row does not hold four values.
    #[error("'{param}'[ {row} ] has {found} values. Each set of frequencies must have four values.")]
    WrongFrequencyWidth {
        param: String,
        row: usize,
        found: usize,
    },

    /// A frequency row does not sum to one.
    #[error("'{param}'[ {row} ] sums to {sum}. Each set of frequencies must add up to 1.0.")]
    FrequenciesDoNotSumToOne { param: String, row: usize, sum: f32 },

    /// An explicit epitope value is outside its variant space.
    #[error("'{param}' = {value} is out of range [0, {max}]")]
    ValueOutOfRange {
        param: &'static str,
        value: i32,
        max: i32,
    },

    /// Ancestry roots do not cover every tracked position.
    #[error("Genome has {expected} positions but {found} allele roots were given.")]
    WrongRootCount { found: usize, expected: usize },

    /// The wrong number of explicit PfEMP1-major values was supplied.
    #[error("'{param}' must have exactly {expected} values, found {found}.")]
    WrongValueCount {
        param: &'static str,
        found: usize,
        expected: usize,
    },

    /// The construction path is not available in the configured randomness mode.
    #[error("'{operation}' requires 'Var_Gene_Randomness_Type' = {required}, but it is {actual}.")]
    NotAllowedInMode {
        operation: &'static str,
        required: String,
        actual: String,
    },
}

/// Errors raised while writing or restoring a genome archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Archive I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive encoding error: {0}")]
    Encoding(#[from] bincode::Error),

    /// A restored record does not fit the configured genome.
    #[error("Archived genome {id} has {found} positions, the configured genome has {expected}")]
    LengthMismatch { id: u32, found: usize, expected: usize },

    /// A restored record's content does not hash to its stored key.
    #[error("Archived genome {id} is stored under hash {stored} but its content hashes to {computed}")]
    HashMismatch { id: u32, stored: i64, computed: i64 },
}
