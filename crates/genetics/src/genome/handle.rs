//! Reference-counted genome handles.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::GenomeRecord;
use crate::base::Nucleotide;
use crate::genetics::{GenomeLocationRegistry, LocationType};

/// One allele value at one tracked location, as used by reports and drug
/// resistance lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenomeAllele {
    pub location_type: LocationType,
    pub genome_location: i32,
    pub sequence_index: usize,
    pub value: i32,
}

/// Handle over zero or one genome record.
///
/// Cloning a handle shares the record; the record stays alive while any
/// handle (or the store) holds it. Two handles are equal when their records
/// have the same content hash. `Genome::default()` is the null handle.
#[derive(Debug, Clone, Default)]
pub struct Genome {
    record: Option<Arc<GenomeRecord>>,
}

impl Genome {
    pub fn new(record: Arc<GenomeRecord>) -> Self {
        Self {
            record: Some(record),
        }
    }

    /// Handle over a record that is not kept in any store.
    pub fn standalone(record: GenomeRecord) -> Self {
        Self::new(Arc::new(record))
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        self.record.is_none()
    }

    #[inline]
    pub fn record(&self) -> Option<&GenomeRecord> {
        self.record.as_deref()
    }

    /// Number of holders of the record (handles plus the store).
    pub fn holders(&self) -> usize {
        self.record.as_ref().map_or(0, Arc::strong_count)
    }

    pub(crate) fn inner(&self) -> &GenomeRecord {
        self.record
            .as_deref()
            .expect("genome accessor called on a null genome handle")
    }

    #[inline]
    pub fn id(&self) -> u32 {
        self.inner().id()
    }

    #[inline]
    pub fn hash_code(&self) -> i64 {
        self.inner().hash_code()
    }

    #[inline]
    pub fn barcode_hash_code(&self) -> i64 {
        self.inner().barcode_hash_code()
    }

    #[inline]
    pub fn nucleotide_sequence(&self) -> &[i32] {
        self.inner().sequence()
    }

    #[inline]
    pub fn allele_roots(&self) -> &[u32] {
        self.inner().roots()
    }

    #[inline]
    pub fn has_allele_roots(&self) -> bool {
        self.inner().has_roots()
    }

    fn letters(&self, indexes: &[usize]) -> String {
        let sequence = self.nucleotide_sequence();
        indexes
            .iter()
            .map(|&i| Nucleotide::char_for_value(sequence[i]))
            .collect()
    }

    /// Barcode as an allele string.
    pub fn barcode(&self, registry: &GenomeLocationRegistry) -> String {
        self.letters(registry.indexes_barcode())
    }

    pub fn drug_resistant_string(&self, registry: &GenomeLocationRegistry) -> String {
        self.letters(registry.indexes_drug_resistant())
    }

    pub fn hrp_string(&self, registry: &GenomeLocationRegistry) -> String {
        self.letters(registry.indexes_hrp())
    }

    /// True when no HRP locations are tracked or any HRP allele is `A`.
    pub fn has_hrp_marker(&self, registry: &GenomeLocationRegistry) -> bool {
        let indexes = registry.indexes_hrp();
        let sequence = self.nucleotide_sequence();
        indexes.is_empty() || indexes.iter().any(|&i| sequence[i] == Nucleotide::A.value())
    }

    /// MSP epitope, when MSP is tracked in the genome.
    pub fn msp(&self, registry: &GenomeLocationRegistry) -> Option<i32> {
        registry.index_msp().map(|i| self.nucleotide_sequence()[i])
    }

    /// PfEMP1-major epitopes; empty when they are not tracked.
    pub fn pfemp1_epitopes_major(&self, registry: &GenomeLocationRegistry) -> Vec<i32> {
        let sequence = self.nucleotide_sequence();
        registry
            .indexes_pfemp1_major()
            .iter()
            .map(|&i| sequence[i])
            .collect()
    }

    /// The genome carries `allele`. Always false without drug-resistance
    /// locations.
    pub fn has_allele(&self, registry: &GenomeLocationRegistry, allele: &GenomeAllele) -> bool {
        !registry.indexes_drug_resistant().is_empty()
            && self.nucleotide_sequence()[allele.sequence_index] == allele.value
    }

    /// The genome carries every allele in `alleles`. Always false without
    /// drug-resistance locations.
    pub fn has_all_alleles(
        &self,
        registry: &GenomeLocationRegistry,
        alleles: &[GenomeAllele],
    ) -> bool {
        !registry.indexes_drug_resistant().is_empty()
            && alleles.iter().all(|a| self.has_allele(registry, a))
    }

    /// Identity-by-state and identity-by-descent fractions with `other`.
    ///
    /// IBS is the fraction of positions with the same allele value; IBD the
    /// fraction with the same ancestry root (0 when either genome has no
    /// roots).
    ///
    /// # Panics
    /// Panics if the genomes have different lengths.
    pub fn identity_fractions(&self, other: &Genome) -> (f64, f64) {
        let (a, b) = (self.inner(), other.inner());
        assert_eq!(a.len(), b.len(), "genomes {} and {} differ in length", a.id(), b.id());
        if a.is_empty() {
            return (0.0, 0.0);
        }
        let n = a.len() as f64;
        let ibs = a
            .sequence()
            .iter()
            .zip(b.sequence())
            .filter(|(x, y)| x == y)
            .count() as f64;
        let ibd = if a.has_roots() && b.has_roots() {
            a.roots().iter().zip(b.roots()).filter(|(x, y)| x == y).count() as f64
        } else {
            0.0
        };
        (ibs / n, ibd / n)
    }
}

impl From<Arc<GenomeRecord>> for Genome {
    fn from(record: Arc<GenomeRecord>) -> Self {
        Self::new(record)
    }
}

impl PartialEq for Genome {
    fn eq(&self, other: &Self) -> bool {
        match (&self.record, &other.record) {
            (None, None) => true,
            (Some(a), Some(b)) => a.hash_code() == b.hash_code(),
            _ => false,
        }
    }
}

impl Eq for Genome {}

impl Hash for Genome {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.record.as_ref().map(|r| r.hash_code()).hash(state);
    }
}
