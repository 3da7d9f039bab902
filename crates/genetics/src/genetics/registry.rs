//! Registry of the genome locations tracked by every parasite genome.
//!
//! The registry is built once from a [`GeneticsConfig`]. It validates the
//! configured locations, sorts them by genomic position to assign sequence
//! indexes, and buckets them per chromosome so that crossover positions can
//! be converted to sequence indexes with a binary search.

use core::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::config::{check_range, GeneticsConfig, VarGeneRandomness};
use super::var_genes::CLONAL_PFEMP1_VARIANTS;
use super::vector::VectorParameters;
use super::Configurable;
use crate::base::RandomSource;
use crate::errors::ConfigError;
use crate::evolution::CrossoverModel;
use crate::layout::{self, MAX_LOCATIONS, NUM_CHROMOSOMES};

/// Upper bound for `Falciparum_MSP_Variants` and `Neighborhood_Size_MSP`.
pub const MAX_MSP_VARIANTS: i32 = 1000;

/// Upper bound for `Falciparum_PfEMP1_Variants` and `Neighborhood_Size_PfEMP1`.
pub const MAX_PFEMP1_VARIANTS: i32 = 100_000;

/// Category of a tracked genome location.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum LocationType {
    Barcode,
    DrugResistance,
    Hrp,
    Msp,
    PfEmp1Major,
}

impl LocationType {
    /// Name of the configuration parameter holding this category's locations.
    pub const fn parameter_name(self) -> &'static str {
        match self {
            Self::Barcode => "Barcode_Genome_Locations",
            Self::DrugResistance => "Drug_Resistant_Genome_Locations",
            Self::Hrp => "HRP_Genome_Locations",
            Self::Msp => "MSP_Genome_Location",
            Self::PfEmp1Major => "PfEMP1_Variants_Genome_Locations",
        }
    }
}

impl fmt::Display for LocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Barcode => "BARCODE",
            Self::DrugResistance => "DRUG_RESISTANCE",
            Self::Hrp => "HRP",
            Self::Msp => "MSP",
            Self::PfEmp1Major => "PfEMP1_MAJOR",
        };
        f.write_str(name)
    }
}

/// A tracked genome location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenomeLocation {
    pub location_type: LocationType,
    pub position: i32,
}

/// Tracked locations of one chromosome. Sequence indexes on a chromosome are
/// contiguous, starting at `first_index`.
#[derive(Debug, Clone, Default, PartialEq)]
struct ChromosomeLocations {
    positions: Vec<i32>,
    first_index: usize,
}

/// Validated set of tracked genome locations plus the model parameters that
/// depend on them.
#[derive(Debug, Clone)]
pub struct GenomeLocationRegistry {
    similarity_to_base: bool,
    randomness: VarGeneRandomness,

    msp_variants: i32,
    pfemp1_variants: i32,
    neighborhood_size_msp: i32,
    neighborhood_size_pfemp1: i32,

    locations: Vec<GenomeLocation>,
    indexes_barcode: Vec<usize>,
    indexes_drug: Vec<usize>,
    indexes_hrp: Vec<usize>,
    indexes_major: Vec<usize>,
    index_msp: Option<usize>,
    chromosomes: Vec<ChromosomeLocations>,

    crossover: CrossoverModel,
    vector: VectorParameters,
}

impl Configurable for GenomeLocationRegistry {
    type Config = GeneticsConfig;

    /// Validate the configuration and build the sequence-index map.
    ///
    /// # Errors
    /// Returns an error for out-of-range parameters, locations outside the
    /// genome, duplicate locations, a wrong number of PfEMP1-major locations,
    /// too many locations, or neighborhoods wider than the variant space.
    fn configure(config: &GeneticsConfig) -> Result<Self, ConfigError> {
        let similarity_to_base = config.similarity_to_base;
        let mut randomness = config.var_gene_randomness;
        let mut majors = config.pfemp1_major_locations.as_slice();
        if similarity_to_base {
            randomness = VarGeneRandomness::AllRandom;
            majors = &[];
        }
        let random_msp = is_random_msp(similarity_to_base, randomness);
        let random_pfemp1 = is_random_pfemp1(similarity_to_base, randomness);

        check_range(
            "Falciparum_MSP_Variants",
            f64::from(config.msp_variants),
            1.0,
            f64::from(MAX_MSP_VARIANTS),
        )?;
        check_range(
            "Falciparum_PfEMP1_Variants",
            f64::from(config.pfemp1_variants),
            1.0,
            f64::from(MAX_PFEMP1_VARIANTS),
        )?;
        check_range(
            "Neighborhood_Size_MSP",
            f64::from(config.neighborhood_size_msp),
            0.0,
            f64::from(MAX_MSP_VARIANTS),
        )?;
        check_range(
            "Neighborhood_Size_PfEMP1",
            f64::from(config.neighborhood_size_pfemp1),
            0.0,
            f64::from(MAX_PFEMP1_VARIANTS),
        )?;
        check_range("Num_Tasks", f64::from(config.num_tasks), 1.0, f64::from(u32::MAX))?;
        check_range(
            "Rank",
            f64::from(config.rank),
            0.0,
            f64::from(config.num_tasks) - 1.0,
        )?;

        if !random_pfemp1 && majors.len() != CLONAL_PFEMP1_VARIANTS {
            return Err(ConfigError::WrongPfEmp1LocationCount {
                expected: CLONAL_PFEMP1_VARIANTS,
                found: majors.len(),
            });
        }

        let msp = [config.msp_location];
        let mut categories: Vec<(LocationType, &[i32])> = vec![
            (LocationType::Barcode, config.barcode_locations.as_slice()),
            (LocationType::DrugResistance, config.drug_resistant_locations.as_slice()),
            (LocationType::Hrp, config.hrp_locations.as_slice()),
        ];
        if !random_msp {
            categories.push((LocationType::Msp, &msp));
        }
        if !random_pfemp1 {
            categories.push((LocationType::PfEmp1Major, majors));
        }

        let num_base_pairs: usize = categories.iter().map(|(_, list)| list.len()).sum();
        if num_base_pairs > MAX_LOCATIONS as usize {
            return Err(ConfigError::TooManyLocations {
                count: num_base_pairs,
                max: MAX_LOCATIONS,
            });
        }

        for (location_type, list) in &categories {
            for (index, &position) in list.iter().enumerate() {
                if !(1..=MAX_LOCATIONS).contains(&position) {
                    return Err(ConfigError::LocationOutOfRange {
                        param: location_type.parameter_name(),
                        index,
                        position,
                        max: MAX_LOCATIONS,
                    });
                }
            }
        }
        check_for_duplicates(&categories)?;

        let mut registry = Self {
            similarity_to_base,
            randomness,
            msp_variants: config.msp_variants,
            pfemp1_variants: config.pfemp1_variants,
            neighborhood_size_msp: config.neighborhood_size_msp,
            neighborhood_size_pfemp1: config.neighborhood_size_pfemp1,
            locations: Vec::with_capacity(num_base_pairs),
            indexes_barcode: Vec::new(),
            indexes_drug: Vec::new(),
            indexes_hrp: Vec::new(),
            indexes_major: Vec::new(),
            index_msp: None,
            chromosomes: vec![ChromosomeLocations::default(); NUM_CHROMOSOMES],
            crossover: CrossoverModel::new(config.crossover_gamma_k, config.crossover_gamma_theta)?,
            vector: VectorParameters::configure(config)?,
        };
        registry.organize(&categories);

        if !random_msp && registry.neighborhood_size_msp > registry.msp_variants {
            return Err(ConfigError::NeighborhoodTooLarge {
                neighborhood_param: "Neighborhood_Size_MSP",
                neighborhood: registry.neighborhood_size_msp,
                variants_param: "Falciparum_MSP_Variants",
                variants: registry.msp_variants,
            });
        }
        if !random_pfemp1 && registry.neighborhood_size_pfemp1 > registry.pfemp1_variants {
            return Err(ConfigError::NeighborhoodTooLarge {
                neighborhood_param: "Neighborhood_Size_PfEMP1",
                neighborhood: registry.neighborhood_size_pfemp1,
                variants_param: "Falciparum_PfEMP1_Variants",
                variants: registry.pfemp1_variants,
            });
        }

        debug!(
            num_base_pairs = registry.num_base_pairs(),
            barcode = registry.indexes_barcode.len(),
            drug = registry.indexes_drug.len(),
            hrp = registry.indexes_hrp.len(),
            randomness = %registry.randomness,
            "configured genome locations"
        );
        Ok(registry)
    }
}

fn is_random_msp(similarity_to_base: bool, randomness: VarGeneRandomness) -> bool {
    similarity_to_base || randomness == VarGeneRandomness::AllRandom
}

fn is_random_pfemp1(similarity_to_base: bool, randomness: VarGeneRandomness) -> bool {
    similarity_to_base || randomness != VarGeneRandomness::FixedNeighborhood
}

/// Reject any genomic position used twice, within or across categories.
fn check_for_duplicates(categories: &[(LocationType, &[i32])]) -> Result<(), ConfigError> {
    let mut all: Vec<(i32, LocationType, usize)> = categories
        .iter()
        .flat_map(|&(location_type, list)| {
            list.iter()
                .enumerate()
                .map(move |(index, &position)| (position, location_type, index))
        })
        .collect();
    all.sort_unstable();

    for pair in all.windows(2) {
        let (position, first_type, first_index) = pair[0];
        let (next_position, second_type, second_index) = pair[1];
        if position == next_position {
            return Err(ConfigError::DuplicateLocation {
                first: first_type.parameter_name(),
                first_index,
                second: second_type.parameter_name(),
                second_index,
                position,
            });
        }
    }
    Ok(())
}

impl GenomeLocationRegistry {
    fn organize(&mut self, categories: &[(LocationType, &[i32])]) {
        self.locations = categories
            .iter()
            .flat_map(|&(location_type, list)| {
                list.iter().map(move |&position| GenomeLocation {
                    location_type,
                    position,
                })
            })
            .collect();
        self.locations.sort_unstable_by_key(|loc| loc.position);

        for (index, loc) in self.locations.iter().enumerate() {
            match loc.location_type {
                LocationType::Barcode => self.indexes_barcode.push(index),
                LocationType::DrugResistance => self.indexes_drug.push(index),
                LocationType::Hrp => self.indexes_hrp.push(index),
                LocationType::Msp => self.index_msp = Some(index),
                LocationType::PfEmp1Major => self.indexes_major.push(index),
            }

            // positions were range-checked, so every location has a chromosome
            if let Some(chromosome) = layout::find_chromosome(loc.position) {
                let bucket = &mut self.chromosomes[chromosome];
                if bucket.positions.is_empty() {
                    bucket.first_index = index;
                }
                bucket.positions.push(loc.position);
            }
        }
    }

    /// Number of positions in every genome sequence.
    #[inline]
    pub fn num_base_pairs(&self) -> usize {
        self.locations.len()
    }

    /// All tracked locations, sorted by genomic position. The position in this
    /// slice is the sequence index.
    #[inline]
    pub fn locations(&self) -> &[GenomeLocation] {
        &self.locations
    }

    /// Genetics runs only as a stand-in for the non-genetic base model.
    #[inline]
    pub fn is_similarity_to_base(&self) -> bool {
        self.similarity_to_base
    }

    /// Effective randomness mode (forced to `ALL_RANDOM` in base-model mode).
    #[inline]
    pub fn var_gene_randomness(&self) -> VarGeneRandomness {
        self.randomness
    }

    /// MSP values are drawn at random instead of being tracked.
    #[inline]
    pub fn is_random_msp(&self) -> bool {
        is_random_msp(self.similarity_to_base, self.randomness)
    }

    /// PfEMP1-major values are drawn at random instead of being tracked.
    #[inline]
    pub fn is_random_pfemp1_major(&self) -> bool {
        is_random_pfemp1(self.similarity_to_base, self.randomness)
    }

    #[inline]
    pub fn msp_variants(&self) -> i32 {
        self.msp_variants
    }

    #[inline]
    pub fn pfemp1_variants(&self) -> i32 {
        self.pfemp1_variants
    }

    #[inline]
    pub fn neighborhood_size_msp(&self) -> i32 {
        self.neighborhood_size_msp
    }

    #[inline]
    pub fn neighborhood_size_pfemp1_major(&self) -> i32 {
        self.neighborhood_size_pfemp1
    }

    /// Sequence indexes of a category, in genomic-position order.
    pub fn indexes(&self, location_type: LocationType) -> &[usize] {
        match location_type {
            LocationType::Barcode => &self.indexes_barcode,
            LocationType::DrugResistance => &self.indexes_drug,
            LocationType::Hrp => &self.indexes_hrp,
            LocationType::PfEmp1Major => &self.indexes_major,
            LocationType::Msp => self.index_msp.as_slice(),
        }
    }

    #[inline]
    pub fn indexes_barcode(&self) -> &[usize] {
        &self.indexes_barcode
    }

    #[inline]
    pub fn indexes_drug_resistant(&self) -> &[usize] {
        &self.indexes_drug
    }

    #[inline]
    pub fn indexes_hrp(&self) -> &[usize] {
        &self.indexes_hrp
    }

    #[inline]
    pub fn indexes_pfemp1_major(&self) -> &[usize] {
        &self.indexes_major
    }

    /// Sequence index of the MSP location, if MSP is tracked.
    #[inline]
    pub fn index_msp(&self) -> Option<usize> {
        self.index_msp
    }

    /// Name of the configuration parameter holding a category's locations.
    #[inline]
    pub fn location_parameter_name(&self, location_type: LocationType) -> &'static str {
        location_type.parameter_name()
    }

    /// Sequence index of the first tracked location at or after `location` on
    /// the same chromosome.
    ///
    /// Returns `None` when `location` is outside the genome, before the
    /// chromosome's first tracked location, or after its last.
    pub fn convert_location_to_index(&self, location: i32) -> Option<usize> {
        let chromosome = layout::find_chromosome(location)?;
        self.convert_crossover_location_to_index(chromosome, location)
    }

    /// Convert a crossover position on `chromosome` to the sequence index of
    /// the first tracked location at or after it.
    ///
    /// Returns `None` if the position is outside the chromosome, the
    /// chromosome has no tracked locations, or the position lies before the
    /// first or after the last tracked location. Nothing needs to be swapped
    /// in any of those cases.
    pub fn convert_crossover_location_to_index(
        &self,
        chromosome: usize,
        location: i32,
    ) -> Option<usize> {
        if chromosome >= NUM_CHROMOSOMES {
            return None;
        }
        let (start, end) = layout::chromosome_span(chromosome);
        if location < start || location > end {
            return None;
        }
        let bucket = &self.chromosomes[chromosome];
        let (&first, &last) = (bucket.positions.first()?, bucket.positions.last()?);
        if location < first || location > last {
            return None;
        }
        let offset = bucket.positions.partition_point(|&p| p < location);
        Some(bucket.first_index + offset)
    }

    /// The chromosome has at least one tracked location.
    #[inline]
    pub fn chromosome_has_locations(&self, chromosome: usize) -> bool {
        self.chromosomes
            .get(chromosome)
            .is_some_and(|bucket| !bucket.positions.is_empty())
    }

    /// Sequence index of the chromosome's first tracked location.
    pub fn first_index_on_chromosome(&self, chromosome: usize) -> Option<usize> {
        self.chromosome_has_locations(chromosome)
            .then(|| self.chromosomes[chromosome].first_index)
    }

    /// Sequence index of the chromosome's last tracked location.
    pub fn last_index_on_chromosome(&self, chromosome: usize) -> Option<usize> {
        self.chromosome_has_locations(chromosome).then(|| {
            let bucket = &self.chromosomes[chromosome];
            bucket.first_index + bucket.positions.len() - 1
        })
    }

    /// Tracked positions on a chromosome, ascending.
    pub fn chromosome_locations(&self, chromosome: usize) -> &[i32] {
        self.chromosomes
            .get(chromosome)
            .map_or(&[], |bucket| bucket.positions.as_slice())
    }

    /// Crossover-distance model.
    #[inline]
    pub fn crossover_model(&self) -> &CrossoverModel {
        &self.crossover
    }

    /// Mosquito-side draw parameters.
    #[inline]
    pub fn vector(&self) -> &VectorParameters {
        &self.vector
    }

    /// Distance in base pairs to the next secondary crossover.
    pub fn secondary_crossover_distance<R: RandomSource + ?Sized>(&self, rng: &mut R) -> i32 {
        self.crossover.secondary_distance(rng)
    }

    /// See [`VectorParameters::num_sporozoites_in_bite`].
    pub fn num_sporozoites_in_bite<R: RandomSource + ?Sized>(&self, rng: &mut R) -> u32 {
        self.vector.num_sporozoites_in_bite(rng)
    }

    /// See [`VectorParameters::num_oocysts_from_bite`].
    pub fn num_oocysts_from_bite<R: RandomSource + ?Sized>(&self, rng: &mut R) -> u32 {
        self.vector.num_oocysts_from_bite(rng)
    }
}
