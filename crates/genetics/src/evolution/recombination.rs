//! Meiotic recombination of two parasite genomes.
//!
//! Recombination follows the obligate-chiasma model: every chromosome gets
//! one crossover placed uniformly along it, and secondary crossovers are
//! added to its left and right at gamma-distributed distances until they run
//! off the chromosome. After the crossovers, whole chromosomes are
//! redistributed among the four products by one of 24 assortment
//! permutations.

use std::collections::VecDeque;
use std::ops::Range;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::base::RandomSource;
use crate::errors::ConfigError;
use crate::genetics::config::check_range;
use crate::genetics::{GenomeLocationRegistry, ParasiteGenetics};
use crate::genome::{sequence_hash, Genome, GenomeRecord};
use crate::layout::{self, NUM_CHROMOSOMES};

/// Base pairs per centiMorgan per generation for *P. falciparum*.
pub const BP_PER_CENTIMORGAN: f64 = 1_500_000.0;

/// Upper bound for both gamma parameters.
const MAX_GAMMA_PARAMETER: f64 = 10.0;

/// Slot of a chromatid among the four recombination products.
pub const FEMALE_0: usize = 0;
pub const FEMALE_1: usize = 1;
pub const MALE_0: usize = 2;
pub const MALE_1: usize = 3;

/// (female, male) chromatids taking part in a crossover, equally likely.
const CHROMATID_PAIRS: [(usize, usize); 4] = [(0, 0), (1, 0), (0, 1), (1, 1)];

/// The 24 permutations of the four chromatid slots, in lexicographic order.
/// After assortment, slot `i` holds what slot `ASSORTMENTS[k][i]` held before.
pub const ASSORTMENTS: [[usize; 4]; 24] = [
    [0, 1, 2, 3],
    [0, 1, 3, 2],
    [0, 2, 1, 3],
    [0, 2, 3, 1],
    [0, 3, 1, 2],
    [0, 3, 2, 1],
    [1, 0, 2, 3],
    [1, 0, 3, 2],
    [1, 2, 0, 3],
    [1, 2, 3, 0],
    [1, 3, 0, 2],
    [1, 3, 2, 0],
    [2, 0, 1, 3],
    [2, 0, 3, 1],
    [2, 1, 0, 3],
    [2, 1, 3, 0],
    [2, 3, 0, 1],
    [2, 3, 1, 0],
    [3, 0, 1, 2],
    [3, 0, 2, 1],
    [3, 1, 0, 2],
    [3, 1, 2, 0],
    [3, 2, 0, 1],
    [3, 2, 1, 0],
];

/// How an assortment permutation moves chromatid content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssortmentKind {
    /// Nothing moves
    Identity,
    /// Two slots swap
    Two,
    /// Two independent pairs swap
    TwoTwo,
    /// Three slots rotate
    Three,
    /// All four slots rotate
    Four,
}

/// Classify an assortment permutation by its cycle structure.
pub fn assortment_kind(index: usize) -> AssortmentKind {
    let permutation = &ASSORTMENTS[index];
    let mut visited = [false; 4];
    let mut cycles = Vec::with_capacity(2);
    for start in 0..4 {
        if visited[start] {
            continue;
        }
        let mut length = 0;
        let mut slot = start;
        while !visited[slot] {
            visited[slot] = true;
            slot = permutation[slot];
            length += 1;
        }
        if length > 1 {
            cycles.push(length);
        }
    }
    match cycles.as_slice() {
        [] => AssortmentKind::Identity,
        [2] => AssortmentKind::Two,
        [2, 2] => AssortmentKind::TwoTwo,
        [3] => AssortmentKind::Three,
        _ => AssortmentKind::Four,
    }
}

/// Gamma model of the distance between neighboring crossovers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrossoverModel {
    gamma_k: f64,
    gamma_theta: f64,
}

impl CrossoverModel {
    /// Create a crossover model with distances in centiMorgans drawn from
    /// `Gamma(gamma_k, gamma_theta)`.
    ///
    /// # Errors
    /// Returns an error unless both parameters are in `(0, 10]`.
    pub fn new(gamma_k: f64, gamma_theta: f64) -> Result<Self, ConfigError> {
        let epsilon = f64::from(f32::EPSILON);
        check_range("Crossover_Gamma_K", gamma_k, epsilon, MAX_GAMMA_PARAMETER)?;
        check_range("Crossover_Gamma_Theta", gamma_theta, epsilon, MAX_GAMMA_PARAMETER)?;
        Ok(Self {
            gamma_k,
            gamma_theta,
        })
    }

    #[inline]
    pub fn gamma_k(&self) -> f64 {
        self.gamma_k
    }

    #[inline]
    pub fn gamma_theta(&self) -> f64 {
        self.gamma_theta
    }

    /// Distance in base pairs to the next secondary crossover.
    pub fn secondary_distance<R: RandomSource + ?Sized>(&self, rng: &mut R) -> i32 {
        let centimorgans = rng.gamma(self.gamma_k, self.gamma_theta);
        (centimorgans * BP_PER_CENTIMORGAN) as i32
    }
}

/// A crossover between one female and one male chromatid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Crossover {
    /// Genome location of the crossover
    pub position: i32,
    /// Female chromatid (0 or 1)
    pub female: usize,
    /// Male chromatid (0 or 1)
    pub male: usize,
    pub obligate: bool,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Direction {
    Left,
    Right,
}

fn determine_crossover<R: RandomSource + ?Sized>(
    model: &CrossoverModel,
    rng: &mut R,
    min: i32,
    max: i32,
    obligate: bool,
    direction: Direction,
) -> Option<Crossover> {
    let position = if obligate {
        min + rng.uniform32((max - min + 1) as u32) as i32
    } else {
        let jump = model.secondary_distance(rng);
        let position = match direction {
            Direction::Left => max.saturating_sub(jump),
            Direction::Right => min.saturating_add(jump),
        };
        if position < min || position > max {
            return None;
        }
        position
    };

    let (female, male) = CHROMATID_PAIRS[rng.uniform16(CHROMATID_PAIRS.len() as u16) as usize];
    Some(Crossover {
        position,
        female,
        male,
        obligate,
    })
}

/// Draw the crossovers of one chromosome into `crossovers`, in ascending
/// position order. Exactly one of them is obligate.
pub fn find_crossovers<R: RandomSource + ?Sized>(
    model: &CrossoverModel,
    rng: &mut R,
    chromosome: usize,
    crossovers: &mut VecDeque<Crossover>,
) {
    crossovers.clear();
    let (start, end) = layout::chromosome_span(chromosome);

    let Some(obligate) = determine_crossover(model, rng, start, end, true, Direction::Right)
    else {
        return;
    };

    let mut max = obligate.position - 1;
    while let Some(crossover) =
        determine_crossover(model, rng, start, max, false, Direction::Left)
    {
        crossovers.push_front(crossover);
        max = crossover.position - 1;
    }

    crossovers.push_back(obligate);

    let mut min = obligate.position + 1;
    while let Some(crossover) =
        determine_crossover(model, rng, min, end, false, Direction::Right)
    {
        crossovers.push_back(crossover);
        min = crossover.position + 1;
    }
}

fn pair_mut<T>(items: &mut [T; 4], a: usize, b: usize) -> (&mut T, &mut T) {
    assert_ne!(a, b, "cannot pair a chromatid with itself");
    if a < b {
        let (low, high) = items.split_at_mut(b);
        (&mut low[a], &mut high[0])
    } else {
        let (low, high) = items.split_at_mut(a);
        (&mut high[0], &mut low[b])
    }
}

/// The four chromatids being recombined: female 0, female 1, male 0, male 1.
#[derive(Debug, Clone, Default)]
pub struct Chromatids {
    sequences: [Vec<i32>; 4],
    roots: [Vec<u32>; 4],
}

impl Chromatids {
    /// Copy the female genome into both female slots and the male genome into
    /// both male slots. Buffers are reused.
    ///
    /// # Panics
    /// Panics if the genomes differ in length or one has roots and the other
    /// does not.
    pub fn load(&mut self, female: &GenomeRecord, male: &GenomeRecord) {
        assert_eq!(
            female.len(),
            male.len(),
            "genomes {} and {} differ in length",
            female.id(),
            male.id()
        );
        assert_eq!(
            female.roots().len(),
            male.roots().len(),
            "genomes {} and {} differ in ancestry length",
            female.id(),
            male.id()
        );
        for (slot, parent) in [female, female, male, male].into_iter().enumerate() {
            self.sequences[slot].clear();
            self.sequences[slot].extend_from_slice(parent.sequence());
            self.roots[slot].clear();
            self.roots[slot].extend_from_slice(parent.roots());
        }
    }

    #[inline]
    pub fn sequence(&self, slot: usize) -> &[i32] {
        &self.sequences[slot]
    }

    #[inline]
    pub fn roots(&self, slot: usize) -> &[u32] {
        &self.roots[slot]
    }

    /// Exchange `range` between two slots.
    pub fn swap_range(&mut self, a: usize, b: usize, range: Range<usize>) {
        if range.is_empty() || a == b {
            return;
        }
        let (x, y) = pair_mut(&mut self.sequences, a, b);
        x[range.clone()].swap_with_slice(&mut y[range.clone()]);
        if !self.roots[a].is_empty() {
            let (x, y) = pair_mut(&mut self.roots, a, b);
            x[range.clone()].swap_with_slice(&mut y[range]);
        }
    }

    /// Apply `crossovers` (ascending) to one chromosome. Each crossover swaps
    /// everything from the chromosome's first tracked location up to the
    /// crossover between the chromatids it names.
    pub fn apply_crossovers(
        &mut self,
        registry: &GenomeLocationRegistry,
        chromosome: usize,
        crossovers: &[Crossover],
    ) {
        let Some(first) = registry.first_index_on_chromosome(chromosome) else {
            return;
        };
        for crossover in crossovers {
            if let Some(index) =
                registry.convert_crossover_location_to_index(chromosome, crossover.position)
            {
                self.swap_range(
                    FEMALE_0 + crossover.female,
                    MALE_0 + crossover.male,
                    first..index,
                );
            }
        }
    }

    /// Redistribute `range` among the slots so that slot `i` receives what
    /// slot `permutation[i]` held.
    pub fn assort(&mut self, range: Range<usize>, permutation: &[usize; 4]) {
        let mut visited = [false; 4];
        for start in 0..4 {
            let mut slot = start;
            while !visited[slot] {
                visited[slot] = true;
                let next = permutation[slot];
                if next == start {
                    break;
                }
                self.swap_range(slot, next, range.clone());
                slot = next;
            }
        }
    }

    /// Apply assortment number `assortment_index` (see [`ASSORTMENTS`]) to
    /// one chromosome.
    pub fn independent_assortment_with(
        &mut self,
        registry: &GenomeLocationRegistry,
        chromosome: usize,
        assortment_index: usize,
    ) {
        let (Some(first), Some(last)) = (
            registry.first_index_on_chromosome(chromosome),
            registry.last_index_on_chromosome(chromosome),
        ) else {
            return;
        };
        self.assort(first..last + 1, &ASSORTMENTS[assortment_index]);
    }
}

/// Recombines pairs of genomes. Holds scratch buffers that are reused across
/// calls.
#[derive(Debug, Default)]
pub struct RecombinationEngine {
    chromatids: Chromatids,
    crossovers: VecDeque<Crossover>,
}

impl RecombinationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recombine a female and a male genome into four descendants
    /// (female 0, female 1, male 0, male 1).
    ///
    /// Returns only the female genome when both parents are identical or
    /// genetics stands in for the base model. A descendant identical to its
    /// parent is returned as that parent; the others are deduplicated through
    /// the store.
    ///
    /// # Panics
    /// Panics if either handle is null or the genomes differ in length.
    pub fn recombine<R: RandomSource + ?Sized>(
        &mut self,
        genetics: &mut ParasiteGenetics,
        rng: &mut R,
        female: &Genome,
        male: &Genome,
    ) -> Vec<Genome> {
        if genetics.registry().is_similarity_to_base() || female == male {
            return vec![female.clone()];
        }

        self.chromatids.load(female.inner(), male.inner());

        let registry = genetics.registry();
        for chromosome in 0..NUM_CHROMOSOMES {
            if !registry.chromosome_has_locations(chromosome) {
                continue;
            }
            find_crossovers(registry.crossover_model(), rng, chromosome, &mut self.crossovers);
            trace!(chromosome, crossovers = ?self.crossovers, "crossovers");
            self.chromatids
                .apply_crossovers(registry, chromosome, self.crossovers.make_contiguous());

            let assortment = rng.uniform16(ASSORTMENTS.len() as u16) as usize;
            trace!(
                chromosome,
                assortment,
                kind = ?assortment_kind(assortment),
                "independent assortment"
            );
            self.chromatids
                .independent_assortment_with(registry, chromosome, assortment);
        }

        let mut offspring = Vec::with_capacity(4);
        for (slot, parent) in [female, female, male, male].into_iter().enumerate() {
            let sequence = self.chromatids.sequence(slot);
            let roots = self.chromatids.roots(slot);
            if sequence_hash(sequence, roots) == parent.hash_code() {
                offspring.push(parent.clone());
            } else {
                offspring.push(genetics.insert_genome(sequence.to_vec(), roots.to_vec()));
            }
        }
        assert_eq!(offspring.len(), 4, "recombination must produce four genomes");
        offspring
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genetics::{Configurable, GeneticsConfig, VarGeneRandomness};
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn registry(barcode: Vec<i32>) -> GenomeLocationRegistry {
        GenomeLocationRegistry::configure(&GeneticsConfig {
            barcode_locations: barcode,
            var_gene_randomness: VarGeneRandomness::AllRandom,
            ..GeneticsConfig::default()
        })
        .unwrap()
    }

    fn record(id: u32, value: i32, root: u32, len: usize) -> GenomeRecord {
        GenomeRecord::new(id, vec![value; len], vec![root; len], &[])
    }

    #[test]
    fn test_assortments_are_permutations() {
        assert_eq!(ASSORTMENTS[0], [0, 1, 2, 3]);
        for (i, permutation) in ASSORTMENTS.iter().enumerate() {
            let mut seen = [false; 4];
            for &slot in permutation {
                seen[slot] = true;
            }
            assert!(seen.iter().all(|&s| s), "assortment {i}");
            if i > 0 {
                assert!(ASSORTMENTS[i - 1] < *permutation);
            }
        }
    }

    #[test]
    fn test_assortment_kinds() {
        let count = |kind| (0..24).filter(|&i| assortment_kind(i) == kind).count();
        assert_eq!(assortment_kind(0), AssortmentKind::Identity);
        assert_eq!(assortment_kind(1), AssortmentKind::Two);
        assert_eq!(count(AssortmentKind::Two), 6);
        assert_eq!(count(AssortmentKind::TwoTwo), 3);
        assert_eq!(count(AssortmentKind::Three), 8);
        assert_eq!(count(AssortmentKind::Four), 6);
    }

    #[test]
    fn test_crossover_model_bounds() {
        assert!(CrossoverModel::new(2.0, 0.38).is_ok());
        assert!(CrossoverModel::new(0.0, 0.38).is_err());
        assert!(CrossoverModel::new(2.0, 10.01).is_err());
    }

    #[test]
    fn test_secondary_distance_in_base_pairs() {
        let model = CrossoverModel::new(2.0, 0.38).unwrap();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
        let n = 10_000;
        let mean = (0..n)
            .map(|_| f64::from(model.secondary_distance(&mut rng)))
            .sum::<f64>()
            / f64::from(n);
        // 0.76 cM * 1.5e6 bp/cM
        assert!((mean - 1_140_000.0).abs() < 40_000.0, "mean = {mean}");
    }

    #[test]
    fn test_find_crossovers_sorted_with_one_obligate() {
        let model = CrossoverModel::new(2.0, 0.38).unwrap();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
        let mut crossovers = VecDeque::new();
        for chromosome in 0..NUM_CHROMOSOMES {
            let (start, end) = layout::chromosome_span(chromosome);
            for _ in 0..50 {
                find_crossovers(&model, &mut rng, chromosome, &mut crossovers);
                assert_eq!(crossovers.iter().filter(|c| c.obligate).count(), 1);
                for pair in crossovers.make_contiguous().windows(2) {
                    assert!(pair[0].position < pair[1].position);
                }
                for c in &crossovers {
                    assert!((start..=end).contains(&c.position));
                    assert!(c.female < 2 && c.male < 2);
                }
            }
        }
    }

    #[test]
    fn test_short_gamma_gives_many_crossovers() {
        let model = CrossoverModel::new(1.0, 0.01).unwrap();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let mut crossovers = VecDeque::new();
        find_crossovers(&model, &mut rng, 13, &mut crossovers);
        // mean spacing 15 kb over 3.3 Mb
        assert!(crossovers.len() > 100, "{}", crossovers.len());
    }

    #[test]
    fn test_apply_crossover_swaps_prefix() {
        let registry = registry(vec![100_000, 200_000, 214_333, 311_500, 428_667, 700_000]);
        let mut chromatids = Chromatids::default();
        chromatids.load(&record(1, 0, 1, 6), &record(2, 3, 2, 6));

        let crossover = Crossover {
            position: 214_334,
            female: 1,
            male: 0,
            obligate: true,
        };
        chromatids.apply_crossovers(&registry, 0, &[crossover]);

        assert_eq!(chromatids.sequence(FEMALE_0), &[0, 0, 0, 0, 0, 0]);
        assert_eq!(chromatids.sequence(FEMALE_1), &[3, 3, 3, 0, 0, 0]);
        assert_eq!(chromatids.roots(FEMALE_1), &[2, 2, 2, 1, 1, 1]);
        assert_eq!(chromatids.sequence(MALE_0), &[0, 0, 0, 3, 3, 3]);
        assert_eq!(chromatids.sequence(MALE_1), &[3, 3, 3, 3, 3, 3]);
    }

    #[test]
    fn test_crossover_outside_tracked_span_is_ignored() {
        let registry = registry(vec![100_000, 200_000]);
        let mut chromatids = Chromatids::default();
        chromatids.load(&record(1, 0, 1, 2), &record(2, 3, 2, 2));

        let crossovers = [
            Crossover {
                position: 50_000,
                female: 0,
                male: 0,
                obligate: false,
            },
            Crossover {
                position: 600_000,
                female: 0,
                male: 0,
                obligate: true,
            },
        ];
        chromatids.apply_crossovers(&registry, 0, &crossovers);
        assert_eq!(chromatids.sequence(FEMALE_0), &[0, 0]);
        assert_eq!(chromatids.sequence(MALE_0), &[3, 3]);
    }

    #[test]
    fn test_successive_crossovers() {
        let registry = registry(vec![100_000, 200_000, 300_000]);
        let mut chromatids = Chromatids::default();
        chromatids.load(&record(1, 0, 1, 3), &record(2, 3, 2, 3));

        let crossovers = [
            Crossover {
                position: 150_000,
                female: 0,
                male: 0,
                obligate: false,
            },
            Crossover {
                position: 250_000,
                female: 0,
                male: 1,
                obligate: true,
            },
        ];
        chromatids.apply_crossovers(&registry, 0, &crossovers);
        // first swaps [0, 1) between f0 and m0, second swaps [0, 2) between f0 and m1
        assert_eq!(chromatids.sequence(FEMALE_0), &[3, 3, 0]);
        assert_eq!(chromatids.sequence(MALE_0), &[0, 3, 3]);
        assert_eq!(chromatids.sequence(MALE_1), &[3, 0, 3]);
        assert_eq!(chromatids.sequence(FEMALE_1), &[0, 0, 0]);
    }

    #[test]
    fn test_independent_assortment_swaps_male_chromatids() {
        let registry = registry(vec![100_000, 200_000, 700_000]);
        let mut chromatids = Chromatids::default();
        chromatids.load(&record(1, 0, 1, 3), &record(2, 3, 2, 3));
        chromatids.swap_range(MALE_0, MALE_1, 0..0);
        chromatids.swap_range(FEMALE_0, MALE_1, 0..3);

        // slots before: f0 = 3, f1 = 0, m0 = 3, m1 = 0
        chromatids.independent_assortment_with(&registry, 0, 1);
        assert_eq!(chromatids.sequence(MALE_0), &[0, 0, 3]);
        assert_eq!(chromatids.sequence(MALE_1), &[3, 3, 0]);
        // chromosome 1 is untouched
        assert_eq!(chromatids.sequence(FEMALE_0), &[3, 3, 3]);
    }

    #[test]
    fn test_assort_matches_permutation_for_every_pattern() {
        for (index, permutation) in ASSORTMENTS.iter().enumerate() {
            let mut chromatids = Chromatids::default();
            chromatids.load(&record(1, 0, 1, 2), &record(2, 0, 2, 2));
            for slot in 0..4 {
                chromatids.sequences[slot].fill(slot as i32);
            }
            let before: Vec<i32> = (0..4).map(|s| chromatids.sequence(s)[0]).collect();

            chromatids.assort(0..2, permutation);
            for slot in 0..4 {
                assert_eq!(
                    chromatids.sequence(slot)[0],
                    before[permutation[slot]],
                    "assortment {index}, slot {slot}"
                );
            }
        }
    }
}
