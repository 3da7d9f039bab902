//! Immutable genome records and the hashes that key them in the store.

/// Starting value of both genome hashes.
pub const HASH_SEED: i64 = 17;

const HASH_MULTIPLIER: i64 = 31;
const HASH_MULTIPLIER_2: i64 = HASH_MULTIPLIER * HASH_MULTIPLIER;
const HASH_MULTIPLIER_3: i64 = HASH_MULTIPLIER_2 * HASH_MULTIPLIER;
const HASH_MULTIPLIER_4: i64 = HASH_MULTIPLIER_3 * HASH_MULTIPLIER;

/// Content hash over a sequence and its ancestry roots.
///
/// With roots, each position folds in `31 * (31 * h + value) + root`.
/// Without roots only the values are hashed, four positions per step.
/// All arithmetic wraps.
pub fn sequence_hash(sequence: &[i32], roots: &[u32]) -> i64 {
    let mut h = HASH_SEED;
    if !roots.is_empty() && roots.len() == sequence.len() {
        for (&value, &root) in sequence.iter().zip(roots) {
            h = h
                .wrapping_mul(HASH_MULTIPLIER_2)
                .wrapping_add(i64::from(value).wrapping_mul(HASH_MULTIPLIER))
                .wrapping_add(i64::from(root));
        }
    } else {
        let mut chunks = sequence.chunks_exact(4);
        for chunk in &mut chunks {
            h = h
                .wrapping_mul(HASH_MULTIPLIER_4)
                .wrapping_add(i64::from(chunk[0]).wrapping_mul(HASH_MULTIPLIER_3))
                .wrapping_add(i64::from(chunk[1]).wrapping_mul(HASH_MULTIPLIER_2))
                .wrapping_add(i64::from(chunk[2]).wrapping_mul(HASH_MULTIPLIER))
                .wrapping_add(i64::from(chunk[3]));
        }
        for &value in chunks.remainder() {
            h = h.wrapping_mul(HASH_MULTIPLIER).wrapping_add(i64::from(value));
        }
    }
    h
}

/// Hash over the barcode positions of a sequence only.
pub fn barcode_hash(sequence: &[i32], barcode_indexes: &[usize]) -> i64 {
    barcode_indexes.iter().fold(HASH_SEED, |h, &index| {
        h.wrapping_mul(HASH_MULTIPLIER)
            .wrapping_add(i64::from(sequence[index]))
    })
}

/// An immutable genome: allele values, optional ancestry roots, and the
/// hashes derived from them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenomeRecord {
    id: u32,
    hash: i64,
    barcode_hash: i64,
    sequence: Box<[i32]>,
    roots: Box<[u32]>,
}

impl GenomeRecord {
    /// Build a record and compute its hashes.
    ///
    /// # Panics
    /// Panics if `roots` is neither empty nor the same length as `sequence`.
    pub fn new(id: u32, sequence: Vec<i32>, roots: Vec<u32>, barcode_indexes: &[usize]) -> Self {
        assert!(
            roots.is_empty() || roots.len() == sequence.len(),
            "genome {id}: ancestry has {} roots but the sequence has {} positions",
            roots.len(),
            sequence.len()
        );
        let hash = sequence_hash(&sequence, &roots);
        let barcode_hash = barcode_hash(&sequence, barcode_indexes);
        Self {
            id,
            hash,
            barcode_hash,
            sequence: sequence.into(),
            roots: roots.into(),
        }
    }

    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Hash over the full content (values and roots).
    #[inline]
    pub fn hash_code(&self) -> i64 {
        self.hash
    }

    #[inline]
    pub fn barcode_hash_code(&self) -> i64 {
        self.barcode_hash
    }

    /// Allele value per tracked location.
    #[inline]
    pub fn sequence(&self) -> &[i32] {
        &self.sequence
    }

    /// Ancestry root per tracked location; empty when unknown.
    #[inline]
    pub fn roots(&self) -> &[u32] {
        &self.roots
    }

    #[inline]
    pub fn has_roots(&self) -> bool {
        !self.roots.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Same values and roots, ignoring the ID.
    pub fn same_content(&self, other: &GenomeRecord) -> bool {
        self.sequence == other.sequence && self.roots == other.roots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_hash(sequence: &[i32], roots: &[u32]) -> i64 {
        let mut h = HASH_SEED;
        for (i, &value) in sequence.iter().enumerate() {
            h = h.wrapping_mul(31).wrapping_add(i64::from(value));
            if roots.len() == sequence.len() {
                h = h.wrapping_mul(31).wrapping_add(i64::from(roots[i]));
            }
        }
        h
    }

    #[test]
    fn test_barcode_hash_known_values() {
        let indexes: Vec<usize> = (0..24).collect();
        assert_eq!(barcode_hash(&[0; 24], &indexes), 5_572_157_665_409_572_113);

        let acgt: Vec<i32> = (0..24).map(|i| i % 4).collect();
        assert_eq!(barcode_hash(&acgt, &indexes), 4_326_324_628_502_345_245);
    }

    #[test]
    fn test_unrolled_hash_matches_reference() {
        for len in [0usize, 1, 3, 4, 5, 8, 24, 31] {
            let sequence: Vec<i32> = (0..len as i32).map(|i| (i * 7) % 4 + i).collect();
            assert_eq!(sequence_hash(&sequence, &[]), reference_hash(&sequence, &[]));

            let roots: Vec<u32> = (0..len as u32).map(|i| 1000 + i).collect();
            assert_eq!(
                sequence_hash(&sequence, &roots),
                reference_hash(&sequence, &roots)
            );
        }
    }

    #[test]
    fn test_roots_change_hash() {
        let sequence = vec![0, 1, 2, 3];
        let unrooted = GenomeRecord::new(1, sequence.clone(), vec![], &[0, 1]);
        let rooted = GenomeRecord::new(2, sequence.clone(), vec![5; 4], &[0, 1]);
        assert_ne!(unrooted.hash_code(), rooted.hash_code());
        assert_eq!(unrooted.barcode_hash_code(), rooted.barcode_hash_code());
        assert!(!unrooted.has_roots());
        assert!(rooted.has_roots());
        assert!(!unrooted.same_content(&rooted));
    }

    #[test]
    fn test_same_content_ignores_id() {
        let a = GenomeRecord::new(1, vec![1, 2], vec![3, 3], &[]);
        let b = GenomeRecord::new(9, vec![1, 2], vec![3, 3], &[]);
        assert!(a.same_content(&b));
        assert_eq!(a.hash_code(), b.hash_code());
        assert_ne!(a, b);
    }

    #[test]
    #[should_panic(expected = "ancestry has 1 roots")]
    fn test_root_length_mismatch_panics() {
        GenomeRecord::new(1, vec![0, 1, 2], vec![4], &[]);
    }
}
