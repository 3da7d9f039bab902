//! Genetics context: configuration, the location registry and genome
//! construction.
//!
//! [`ParasiteGenetics`] owns the validated [`GenomeLocationRegistry`] and the
//! [`GenomeStore`]. It is constructed once and passed by reference to every
//! genome operation. It has no internal synchronization; callers serialize
//! access.

pub mod config;
pub mod registry;
pub mod var_genes;
pub mod vector;

pub use config::{DistributionKind, GeneticsConfig, VarGeneRandomness};
pub use registry::{GenomeLocation, GenomeLocationRegistry, LocationType};
pub use vector::{SporozoitesPerOocyst, VectorParameters};

use crate::base::{parse_allele_string, RandomSource, WILDCARD_VALUE};
use crate::errors::{ConfigError, GenomeError};
use crate::genome::{
    barcode_hash, Genome, GenomeAllele, GenomeIdGenerator, GenomeRecord, GenomeStore, HASH_SEED,
};
use var_genes::{assign_var_genes, barcode_distance, CLONAL_PFEMP1_VARIANTS};

/// Types that are built from a raw configuration and validate it on the way.
pub trait Configurable: Sized {
    type Config;

    /// Validate `config` and build `Self`.
    ///
    /// # Errors
    /// Returns a `ConfigError` naming the offending parameter.
    fn configure(config: &Self::Config) -> Result<Self, ConfigError>;
}

/// Owner of the genome registry and the genome store.
#[derive(Debug)]
pub struct ParasiteGenetics {
    registry: GenomeLocationRegistry,
    store: GenomeStore,
}

impl Configurable for ParasiteGenetics {
    type Config = GeneticsConfig;

    fn configure(config: &GeneticsConfig) -> Result<Self, ConfigError> {
        let registry = GenomeLocationRegistry::configure(config)?;
        let store = GenomeStore::new(GenomeIdGenerator::new(config.rank, config.num_tasks));
        Ok(Self { registry, store })
    }
}

impl ParasiteGenetics {
    /// Validate `config` and build an empty genetics context.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn new(config: &GeneticsConfig) -> Result<Self, ConfigError> {
        Self::configure(config)
    }

    /// Parse and validate a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Self::configure(&GeneticsConfig::from_json_str(json)?)
    }

    #[inline]
    pub fn registry(&self) -> &GenomeLocationRegistry {
        &self.registry
    }

    #[inline]
    pub fn store(&self) -> &GenomeStore {
        &self.store
    }

    #[inline]
    pub fn store_mut(&mut self) -> &mut GenomeStore {
        &mut self.store
    }

    /// Number of genomes in the store.
    #[inline]
    pub fn genome_count(&self) -> usize {
        self.store.len()
    }

    /// Remove every stored genome that no handle refers to.
    pub fn compact(&mut self) -> usize {
        self.store.compact()
    }

    /// Drop every stored genome.
    pub fn clear_genomes(&mut self) {
        self.store.clear();
    }

    /// Handle over the stored genome with this content hash.
    pub fn genome_by_hash(&self, hash: i64) -> Option<Genome> {
        self.store.get(hash).cloned().map(Genome::new)
    }

    fn new_record(&mut self, sequence: Vec<i32>, roots: Vec<u32>) -> GenomeRecord {
        let id = self.store.next_id();
        GenomeRecord::new(id, sequence, roots, self.registry.indexes_barcode())
    }

    /// Build a record with a fresh ID and deduplicate it through the store.
    pub(crate) fn insert_genome(&mut self, sequence: Vec<i32>, roots: Vec<u32>) -> Genome {
        let record = self.new_record(sequence, roots);
        Genome::new(self.store.insert(record))
    }

    /// Write the barcode, drug-resistance and HRP strings into `sequence`.
    /// Returns the barcode values.
    fn fill_allele_strings(
        &self,
        sequence: &mut [i32],
        barcode: &str,
        drug: &str,
        hrp: &str,
    ) -> Result<Vec<i32>, GenomeError> {
        let registry = &self.registry;
        let barcode_values = parse_allele_string(
            "Barcode_String",
            barcode,
            LocationType::Barcode.parameter_name(),
            registry.indexes_barcode().len(),
            false,
        )?;
        let drug_values = parse_allele_string(
            "Drug_Resistant_String",
            drug,
            LocationType::DrugResistance.parameter_name(),
            registry.indexes_drug_resistant().len(),
            false,
        )?;
        let hrp_values = parse_allele_string(
            "HRP_String",
            hrp,
            LocationType::Hrp.parameter_name(),
            registry.indexes_hrp().len(),
            false,
        )?;

        scatter(sequence, registry.indexes_barcode(), &barcode_values);
        scatter(sequence, registry.indexes_drug_resistant(), &drug_values);
        scatter(sequence, registry.indexes_hrp(), &hrp_values);
        Ok(barcode_values)
    }

    /// Build an unrooted genome from allele strings. MSP and PfEMP1-major
    /// epitopes, when tracked, are derived from the barcode.
    ///
    /// The genome gets a fresh ID but is not entered in the store; use
    /// [`create_genome_with_root`](Self::create_genome_with_root) when an
    /// infection starts.
    ///
    /// # Errors
    /// Returns an error if a string has the wrong length or an invalid
    /// character.
    pub fn create_genome_from_barcode<R: RandomSource + ?Sized>(
        &mut self,
        rng: &mut R,
        barcode: &str,
        drug: &str,
        hrp: &str,
    ) -> Result<Genome, GenomeError> {
        let mut sequence = vec![0; self.registry.num_base_pairs()];
        let barcode_values = self.fill_allele_strings(&mut sequence, barcode, drug, hrp)?;
        let distance = barcode_distance(barcode_values);
        assign_var_genes(rng, &self.registry, &mut sequence, distance);
        Ok(Genome::standalone(self.new_record(sequence, Vec::new())))
    }

    /// Build an unrooted genome from allele strings and explicit MSP and
    /// PfEMP1-major values.
    ///
    /// # Errors
    /// Returns an error unless the randomness mode is `FIXED_NEIGHBORHOOD`,
    /// if a string is invalid, if `msp` is outside `[0, Falciparum_MSP_Variants]`,
    /// or if `pfemp1_major` does not hold exactly 50 values in
    /// `[0, Falciparum_PfEMP1_Variants]`.
    pub fn create_genome_from_sequence(
        &mut self,
        barcode: &str,
        drug: &str,
        hrp: &str,
        msp: i32,
        pfemp1_major: &[i32],
    ) -> Result<Genome, GenomeError> {
        let mode = self.registry.var_gene_randomness();
        if mode != VarGeneRandomness::FixedNeighborhood {
            return Err(GenomeError::NotAllowedInMode {
                operation: "create_genome_from_sequence",
                required: VarGeneRandomness::FixedNeighborhood.to_string(),
                actual: mode.to_string(),
            });
        }
        let msp_variants = self.registry.msp_variants();
        if !(0..=msp_variants).contains(&msp) {
            return Err(GenomeError::ValueOutOfRange {
                param: "MSP",
                value: msp,
                max: msp_variants,
            });
        }
        if pfemp1_major.len() != CLONAL_PFEMP1_VARIANTS {
            return Err(GenomeError::WrongValueCount {
                param: "PfEMP1_Major",
                found: pfemp1_major.len(),
                expected: CLONAL_PFEMP1_VARIANTS,
            });
        }
        let pfemp1_variants = self.registry.pfemp1_variants();
        if let Some(&value) = pfemp1_major
            .iter()
            .find(|v| !(0..=pfemp1_variants).contains(*v))
        {
            return Err(GenomeError::ValueOutOfRange {
                param: "PfEMP1_Major",
                value,
                max: pfemp1_variants,
            });
        }

        let mut sequence = vec![0; self.registry.num_base_pairs()];
        self.fill_allele_strings(&mut sequence, barcode, drug, hrp)?;
        if let Some(index) = self.registry.index_msp() {
            sequence[index] = msp;
        }
        scatter(&mut sequence, self.registry.indexes_pfemp1_major(), pfemp1_major);
        Ok(Genome::standalone(self.new_record(sequence, Vec::new())))
    }

    /// Build an unrooted genome by sampling every tracked allele from a
    /// per-location frequency table (four values, for `A`, `C`, `G`, `T`,
    /// summing to 1).
    ///
    /// # Errors
    /// Returns an error if a table does not have one row per location, a row
    /// does not have four values, or a row does not sum to 1.
    pub fn create_genome_from_allele_frequencies<R: RandomSource + ?Sized>(
        &mut self,
        rng: &mut R,
        barcode_frequencies: &[Vec<f32>],
        drug_frequencies: &[Vec<f32>],
        hrp_frequencies: &[Vec<f32>],
    ) -> Result<Genome, GenomeError> {
        let tables = [
            (
                "Barcode_Allele_Frequencies_Per_Genome_Location",
                barcode_frequencies,
                self.registry.indexes_barcode(),
            ),
            (
                "Drug_Resistant_Allele_Frequencies_Per_Genome_Location",
                drug_frequencies,
                self.registry.indexes_drug_resistant(),
            ),
            (
                "HRP_Allele_Frequencies_Per_Genome_Location",
                hrp_frequencies,
                self.registry.indexes_hrp(),
            ),
        ];
        for (param, table, indexes) in &tables {
            check_frequency_table(param, table, indexes.len())?;
        }

        let mut sequence = vec![0; self.registry.num_base_pairs()];
        let mut barcode_values = Vec::with_capacity(barcode_frequencies.len());
        for (table_number, (_, table, indexes)) in tables.iter().enumerate() {
            for (row, &index) in table.iter().zip(indexes.iter()) {
                let value = sample_allele(rng, row);
                sequence[index] = value;
                if table_number == 0 {
                    barcode_values.push(value);
                }
            }
        }

        let distance = barcode_distance(barcode_values);
        assign_var_genes(rng, &self.registry, &mut sequence, distance);
        Ok(Genome::standalone(self.new_record(sequence, Vec::new())))
    }

    /// Stored copy of `genome` with every ancestry root set to `infection_id`.
    /// Used when a new infection starts.
    pub fn create_genome_with_root(&mut self, genome: &Genome, infection_id: u32) -> Genome {
        let sequence = genome.nucleotide_sequence().to_vec();
        let roots = vec![infection_id; sequence.len()];
        self.insert_genome(sequence, roots)
    }

    /// Stored genome with the given barcode and roots. Other positions are 0.
    ///
    /// # Errors
    /// Returns an error if the barcode is invalid or `roots` does not hold
    /// one root per position.
    pub fn create_genome(&mut self, barcode: &str, roots: Vec<u32>) -> Result<Genome, GenomeError> {
        let num_base_pairs = self.registry.num_base_pairs();
        if roots.len() != num_base_pairs {
            return Err(GenomeError::WrongRootCount {
                found: roots.len(),
                expected: num_base_pairs,
            });
        }
        let values = parse_allele_string(
            "Barcode_String",
            barcode,
            LocationType::Barcode.parameter_name(),
            self.registry.indexes_barcode().len(),
            false,
        )?;
        let mut sequence = vec![0; num_base_pairs];
        scatter(&mut sequence, self.registry.indexes_barcode(), &values);
        Ok(self.insert_genome(sequence, roots))
    }

    /// Barcode hashes of every barcode matching `barcode`, where `*` matches
    /// any allele.
    ///
    /// # Errors
    /// Returns an error if the barcode has the wrong length or an invalid
    /// character.
    pub fn find_possible_barcode_hashcodes(
        &self,
        param: &str,
        barcode: &str,
    ) -> Result<Vec<i64>, GenomeError> {
        let values = parse_allele_string(
            param,
            barcode,
            LocationType::Barcode.parameter_name(),
            self.registry.indexes_barcode().len(),
            true,
        )?;

        let mut hashes = vec![HASH_SEED];
        for value in values {
            if value == WILDCARD_VALUE {
                let existing = hashes.len();
                for alternative in 1..=3 {
                    for i in 0..existing {
                        let h = hashes[i].wrapping_mul(31).wrapping_add(alternative);
                        hashes.push(h);
                    }
                }
                for h in &mut hashes[..existing] {
                    *h = h.wrapping_mul(31);
                }
            } else {
                for h in &mut hashes {
                    *h = h.wrapping_mul(31).wrapping_add(i64::from(value));
                }
            }
        }
        Ok(hashes)
    }

    /// Barcode hash of a barcode string without wildcards.
    pub fn barcode_string_hash(&self, barcode: &str) -> Result<i64, GenomeError> {
        let values = parse_allele_string(
            "Barcode_String",
            barcode,
            LocationType::Barcode.parameter_name(),
            self.registry.indexes_barcode().len(),
            false,
        )?;
        let indexes: Vec<usize> = (0..values.len()).collect();
        Ok(barcode_hash(&values, &indexes))
    }

    /// Alleles named by a drug-resistance string; `*` positions are skipped.
    ///
    /// # Errors
    /// Returns an error if no drug-resistance locations are configured, the
    /// string is invalid, or it holds only wildcards.
    pub fn alleles_for_drug_resistant_string(
        &self,
        drug: &str,
    ) -> Result<Vec<GenomeAllele>, GenomeError> {
        self.alleles_for_string("Drug_Resistant_String", drug, LocationType::DrugResistance)
    }

    /// Alleles named by an HRP string; `*` positions are skipped.
    ///
    /// # Errors
    /// Same conditions as
    /// [`alleles_for_drug_resistant_string`](Self::alleles_for_drug_resistant_string)
    /// for the HRP locations.
    pub fn alleles_for_hrp_string(&self, hrp: &str) -> Result<Vec<GenomeAllele>, GenomeError> {
        self.alleles_for_string("HRP_String", hrp, LocationType::Hrp)
    }

    fn alleles_for_string(
        &self,
        param: &str,
        alleles: &str,
        location_type: LocationType,
    ) -> Result<Vec<GenomeAllele>, GenomeError> {
        let indexes = self.registry.indexes(location_type);
        if indexes.is_empty() {
            return Err(GenomeError::NoLocations {
                param: param.to_string(),
                location_param: location_type.parameter_name(),
            });
        }
        let values = parse_allele_string(
            param,
            alleles,
            location_type.parameter_name(),
            indexes.len(),
            true,
        )?;

        let collection: Vec<GenomeAllele> = values
            .iter()
            .zip(indexes)
            .filter(|(value, _)| **value != WILDCARD_VALUE)
            .map(|(&value, &index)| GenomeAllele {
                location_type,
                genome_location: self.registry.locations()[index].position,
                sequence_index: index,
                value,
            })
            .collect();

        if collection.is_empty() {
            return Err(GenomeError::AllWildcards {
                param: param.to_string(),
                value: alleles.to_string(),
            });
        }
        Ok(collection)
    }
}

fn scatter(sequence: &mut [i32], indexes: &[usize], values: &[i32]) {
    for (&index, &value) in indexes.iter().zip(values) {
        sequence[index] = value;
    }
}

fn check_frequency_table(
    param: &str,
    table: &[Vec<f32>],
    expected: usize,
) -> Result<(), GenomeError> {
    if table.len() != expected {
        return Err(GenomeError::WrongFrequencySetCount {
            param: param.to_string(),
            found: table.len(),
            expected,
        });
    }
    for (row, frequencies) in table.iter().enumerate() {
        if frequencies.len() != 4 {
            return Err(GenomeError::WrongFrequencyWidth {
                param: param.to_string(),
                row,
                found: frequencies.len(),
            });
        }
        let sum: f32 = frequencies.iter().sum();
        if (sum - 1.0).abs() > f32::EPSILON {
            return Err(GenomeError::FrequenciesDoNotSumToOne {
                param: param.to_string(),
                row,
                sum,
            });
        }
    }
    Ok(())
}

/// Inverse sampling against the cumulative frequencies with one uniform draw.
fn sample_allele<R: RandomSource + ?Sized>(rng: &mut R, frequencies: &[f32]) -> i32 {
    let draw = rng.unit() as f32;
    let mut cumulative = 0.0f32;
    for (value, &frequency) in frequencies.iter().enumerate() {
        cumulative += frequency;
        if draw <= cumulative && frequency > 0.0 {
            return value as i32;
        }
    }
    // rounding left the draw above the last cumulative sum
    frequencies.iter().rposition(|&f| f > 0.0).unwrap_or(0) as i32
}
