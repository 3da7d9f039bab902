//! Derivation of MSP and PfEMP1-major epitopes from the barcode.
//!
//! Genomes whose barcodes are close (by distance from the all-`A` barcode)
//! receive epitope values drawn from nearby neighborhoods of the variant
//! space, so near-identical barcodes carry near-identical epitopes.

use super::GenomeLocationRegistry;
use crate::base::RandomSource;

/// Number of PfEMP1-major epitopes carried by every genome.
pub const CLONAL_PFEMP1_VARIANTS: usize = 50;

/// Strides used to walk the PfEMP1 variant space.
const STRIDE_LENGTHS: [u32; 120] = [
    73, 79, 83, 89, 97, 101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167,
    173, 179, 181, 191, 193, 197, 199, 211, 223, 227, 229, 233, 239, 241, 251, 257, 263, 269,
    271, 277, 281, 283, 293, 307, 311, 313, 317, 331, 337, 347, 349, 353, 359, 367, 373, 379,
    383, 389, 397, 401, 409, 419, 421, 431, 433, 439, 443, 449, 457, 461, 463, 467, 479, 487,
    491, 499, 503, 509, 521, 523, 541, 547, 557, 563, 569, 571, 577, 587, 593, 599, 601, 607,
    613, 617, 619, 631, 641, 643, 647, 653, 659, 661, 673, 677, 683, 691, 701, 709, 719, 727,
    733, 739, 743, 751, 757, 761, 769, 773, 787, 797, 809,
];

/// Euclidean distance of barcode values from the all-`A` barcode, truncated
/// to an integer.
pub fn barcode_distance(values: impl IntoIterator<Item = i32>) -> i32 {
    let sum_of_squares: f64 = values
        .into_iter()
        .map(|v| {
            let v = f64::from(v);
            v * v
        })
        .sum();
    sum_of_squares.sqrt() as i32
}

/// Pick a variant from the `neighborhood` values starting just left of
/// `center`, keeping the neighborhood inside `[0, max_variant + neighborhood)`.
fn calculate_variant<R: RandomSource + ?Sized>(
    rng: &mut R,
    max_variant: i32,
    neighborhood: i32,
    center: i32,
) -> i32 {
    let min = (center - neighborhood / 2).max(0).min(max_variant.max(0));
    // 16-bit draws unless a PfEMP1 neighborhood exceeds u16
    let draw = match u16::try_from(neighborhood.max(0)) {
        Ok(n) => i32::from(rng.uniform16(n)),
        Err(_) => rng.uniform32(neighborhood as u32) as i32,
    };
    min + draw
}

/// Fill the tracked MSP and PfEMP1-major positions of `sequence` from the
/// barcode distance. Untracked categories are left untouched.
pub fn assign_var_genes<R: RandomSource + ?Sized>(
    rng: &mut R,
    registry: &GenomeLocationRegistry,
    sequence: &mut [i32],
    distance: i32,
) {
    let max_distance = (9.0 * registry.indexes_barcode().len() as f64).sqrt();
    let msp_variants = registry.msp_variants();
    let pfemp1_variants = registry.pfemp1_variants();
    let delta = f64::from(distance) - max_distance / 2.0;

    if let Some(msp_index) = registry.index_msp() {
        let ratio = f64::from(msp_variants) / max_distance;
        let offset = (ratio * delta).round() as i32;
        let center = (msp_variants / 2 + offset) % msp_variants;
        let neighborhood = registry.neighborhood_size_msp();
        sequence[msp_index] =
            calculate_variant(rng, msp_variants - neighborhood, neighborhood, center);
    }

    let major_indexes = registry.indexes_pfemp1_major();
    if !major_indexes.is_empty() {
        let ratio = f64::from(pfemp1_variants) / max_distance;
        // negative offsets wrap around the unsigned variant space
        let offset = (ratio * delta).round() as i32 as u32;
        let variants = pfemp1_variants as u32;
        let stride = STRIDE_LENGTHS[((offset / variants) % STRIDE_LENGTHS.len() as u32) as usize];
        let neighborhood = registry.neighborhood_size_pfemp1_major();

        let mut position = offset % variants;
        for &index in major_indexes {
            sequence[index] = calculate_variant(
                rng,
                pfemp1_variants - neighborhood,
                neighborhood,
                position as i32,
            );
            position = (position + stride) % variants;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genetics::{Configurable, GeneticsConfig, VarGeneRandomness};
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn registry(randomness: VarGeneRandomness) -> GenomeLocationRegistry {
        let pfemp1 = if randomness == VarGeneRandomness::FixedNeighborhood {
            (0..50).map(|i| 5_000_000 + i * 1_000).collect()
        } else {
            Vec::new()
        };
        GenomeLocationRegistry::configure(&GeneticsConfig {
            barcode_locations: (1..=24).map(|i| i * 10_000).collect(),
            msp_location: 1_000_000,
            pfemp1_major_locations: pfemp1,
            var_gene_randomness: randomness,
            ..GeneticsConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_barcode_distance() {
        assert_eq!(barcode_distance([0, 0, 0]), 0);
        assert_eq!(barcode_distance([3, 4]), 5);
        // 0+1+4+9+9+4+1+0 three times = 84, sqrt = 9.17
        let values = [0, 1, 2, 3, 3, 2, 1, 0].repeat(3);
        assert_eq!(barcode_distance(values), 9);
    }

    #[test]
    fn test_msp_neighborhood() {
        let registry = registry(VarGeneRandomness::FixedMsp);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
        let msp_index = registry.index_msp().unwrap();
        for _ in 0..200 {
            let mut sequence = vec![0; registry.num_base_pairs()];
            assign_var_genes(&mut rng, &registry, &mut sequence, 9);
            assert!((59..=62).contains(&sequence[msp_index]));
        }
    }

    #[test]
    fn test_variant_draws_sixteen_bits() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(5);
        for _ in 0..20 {
            let mut expected = rng.clone();
            let offset = i32::from(expected.uniform16(4));
            assert_eq!(calculate_variant(&mut rng, 96, 4, 61), 59 + offset);
        }
    }

    #[test]
    fn test_wide_neighborhood_is_not_truncated() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(5);
        let draws: Vec<i32> = (0..100)
            .map(|_| calculate_variant(&mut rng, 0, 100_000, 0))
            .collect();
        assert!(draws.iter().all(|v| (0..100_000).contains(v)));
        assert!(draws.iter().any(|&v| v > i32::from(u16::MAX)));
    }

    #[test]
    fn test_msp_clamped_at_zero() {
        let registry = registry(VarGeneRandomness::FixedMsp);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let msp_index = registry.index_msp().unwrap();
        // distance 0 -> center 50 - 50 = 0 -> neighborhood [0, 4)
        for _ in 0..100 {
            let mut sequence = vec![0; registry.num_base_pairs()];
            assign_var_genes(&mut rng, &registry, &mut sequence, 0);
            assert!((0..4).contains(&sequence[msp_index]));
        }
    }

    #[test]
    fn test_pfemp1_majors_walk_variant_space() {
        let registry = registry(VarGeneRandomness::FixedNeighborhood);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
        let mut sequence = vec![0; registry.num_base_pairs()];
        assign_var_genes(&mut rng, &registry, &mut sequence, 9);

        let majors: Vec<i32> = registry
            .indexes_pfemp1_major()
            .iter()
            .map(|&i| sequence[i])
            .collect();
        assert_eq!(majors.len(), CLONAL_PFEMP1_VARIANTS);
        for &value in &majors {
            assert!((0..1000).contains(&value));
        }
        let distinct: std::collections::HashSet<i32> = majors.iter().copied().collect();
        assert!(distinct.len() > 40);
    }

    #[test]
    fn test_untracked_categories_untouched() {
        let registry = registry(VarGeneRandomness::AllRandom);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
        let mut sequence = vec![7; registry.num_base_pairs()];
        assign_var_genes(&mut rng, &registry, &mut sequence, 9);
        assert!(sequence.iter().all(|&v| v == 7));
    }
}
