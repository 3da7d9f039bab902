//! Chromosome layout of the *P. falciparum* genome.
//!
//! Genome locations are 1-based coordinates over the concatenation of the
//! 14 chromosomes. Chromosome `i` spans `[CHROMOSOME_ENDS[i-1] + 1,
//! CHROMOSOME_ENDS[i]]`, and chromosome 0 starts at 1.

/// Number of chromosomes in the parasite genome.
pub const NUM_CHROMOSOMES: usize = 14;

/// Length in base pairs of each chromosome.
pub const CHROMOSOME_LENGTHS: [i32; NUM_CHROMOSOMES] = [
    643_000, 947_000, 1_100_000, 1_200_000, 1_300_000, 1_400_000, 1_400_000, 1_300_000,
    1_500_000, 1_700_000, 2_000_000, 2_300_000, 2_700_000, 3_300_000,
];

/// Last genome location of each chromosome (cumulative lengths).
pub const CHROMOSOME_ENDS: [i32; NUM_CHROMOSOMES] = cumulative_ends();

/// Total number of addressable genome locations.
pub const MAX_LOCATIONS: i32 = CHROMOSOME_ENDS[NUM_CHROMOSOMES - 1];

const fn cumulative_ends() -> [i32; NUM_CHROMOSOMES] {
    let mut ends = [0; NUM_CHROMOSOMES];
    let mut total = 0;
    let mut i = 0;
    while i < NUM_CHROMOSOMES {
        total += CHROMOSOME_LENGTHS[i];
        ends[i] = total;
        i += 1;
    }
    ends
}

/// Return the chromosome holding `location`, or `None` when the location is
/// outside `[1, MAX_LOCATIONS]`.
///
/// The last base of chromosome `i` maps to `i`; the next base maps to `i + 1`.
pub fn find_chromosome(location: i32) -> Option<usize> {
    if !(1..=MAX_LOCATIONS).contains(&location) {
        return None;
    }
    Some(CHROMOSOME_ENDS.partition_point(|&end| end < location))
}

/// First genome location on a chromosome.
#[inline]
pub fn chromosome_start(chromosome: usize) -> i32 {
    if chromosome == 0 {
        1
    } else {
        CHROMOSOME_ENDS[chromosome - 1] + 1
    }
}

/// Last genome location on a chromosome.
#[inline]
pub fn chromosome_end(chromosome: usize) -> i32 {
    CHROMOSOME_ENDS[chromosome]
}

/// Inclusive `(start, end)` span of a chromosome.
#[inline]
pub fn chromosome_span(chromosome: usize) -> (i32, i32) {
    (chromosome_start(chromosome), chromosome_end(chromosome))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_locations() {
        assert_eq!(MAX_LOCATIONS, 22_790_000);
        assert_eq!(CHROMOSOME_ENDS[0], 643_000);
        assert_eq!(CHROMOSOME_ENDS[1], 1_590_000);
    }

    #[test]
    fn test_find_chromosome_boundaries() {
        assert_eq!(find_chromosome(1), Some(0));
        for (i, &end) in CHROMOSOME_ENDS.iter().enumerate() {
            assert_eq!(find_chromosome(end), Some(i));
            if i + 1 < NUM_CHROMOSOMES {
                assert_eq!(find_chromosome(end + 1), Some(i + 1));
            }
        }
    }

    #[test]
    fn test_find_chromosome_out_of_range() {
        assert_eq!(find_chromosome(0), None);
        assert_eq!(find_chromosome(-5), None);
        assert_eq!(find_chromosome(MAX_LOCATIONS + 1), None);
    }

    #[test]
    fn test_find_chromosome_monotonic() {
        let mut previous = 0;
        for location in (1..=MAX_LOCATIONS).step_by(9_973) {
            let chromosome = find_chromosome(location).unwrap();
            assert!(chromosome >= previous);
            previous = chromosome;
        }
        assert_eq!(previous, NUM_CHROMOSOMES - 1);
    }

    #[test]
    fn test_chromosome_span() {
        assert_eq!(chromosome_span(0), (1, 643_000));
        assert_eq!(chromosome_span(1), (643_001, 1_590_000));
        for i in 0..NUM_CHROMOSOMES {
            let (start, end) = chromosome_span(i);
            assert_eq!(end - start + 1, CHROMOSOME_LENGTHS[i]);
        }
    }
}
