use core::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::GenomeError;

/// Character accepted in report contexts to mean "any allele".
pub const WILDCARD: char = '*';

/// Sequence value produced for a [`WILDCARD`] character.
pub const WILDCARD_VALUE: i32 = 4;

/// A nucleotide allele at a tracked genome location.
///
/// The mapping of variants to integers is stable and is the value stored in
/// genome sequences (A=0, C=1, G=2, T=3). Positions that hold MSP or PfEMP1
/// epitope variants store larger integers and never round-trip through this
/// type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Nucleotide {
    A = 0,
    C = 1,
    G = 2,
    T = 3,
}

impl Nucleotide {
    /// All alleles in value order.
    pub const ALL: [Nucleotide; 4] = [Self::A, Self::C, Self::G, Self::T];

    /// Convert from a stored sequence value (0-3).
    #[inline(always)]
    pub const fn from_value(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::A),
            1 => Some(Self::C),
            2 => Some(Self::G),
            3 => Some(Self::T),
            _ => None,
        }
    }

    /// Convert to the stored sequence value (0-3).
    #[inline(always)]
    pub const fn value(self) -> i32 {
        self as i32
    }

    /// Convert from an uppercase allele character. Returns `None` for
    /// anything else, including lowercase letters.
    #[inline]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'A' => Some(Self::A),
            'C' => Some(Self::C),
            'G' => Some(Self::G),
            'T' => Some(Self::T),
            _ => None,
        }
    }

    /// Convert to an uppercase `char` representing this allele.
    #[inline(always)]
    pub const fn to_char(self) -> char {
        match self {
            Self::A => 'A',
            Self::C => 'C',
            Self::G => 'G',
            Self::T => 'T',
        }
    }

    /// Letter for a stored value, `'?'` when the value is not an allele.
    #[inline]
    pub fn char_for_value(value: i32) -> char {
        Self::from_value(value).map_or('?', Self::to_char)
    }
}

impl TryFrom<char> for Nucleotide {
    type Error = char;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        Self::from_char(c).ok_or(c)
    }
}

impl From<Nucleotide> for i32 {
    #[inline(always)]
    fn from(nuc: Nucleotide) -> i32 {
        nuc.value()
    }
}

impl From<Nucleotide> for char {
    #[inline(always)]
    fn from(nuc: Nucleotide) -> char {
        nuc.to_char()
    }
}

impl fmt::Display for Nucleotide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// Convert an allele string into sequence values.
///
/// # Arguments
/// * `param` - Name of the parameter the string came from (used in errors)
/// * `value` - The allele string
/// * `location_param` - Name of the location parameter that fixes the length
/// * `expected_len` - Number of configured locations for that category
/// * `allow_wildcard` - Accept `*` (mapped to [`WILDCARD_VALUE`]); only report
///   contexts may do this
///
/// # Errors
/// Returns an error if the length is wrong or a character is not an allele.
pub fn parse_allele_string(
    param: &str,
    value: &str,
    location_param: &'static str,
    expected_len: usize,
    allow_wildcard: bool,
) -> Result<Vec<i32>, GenomeError> {
    let found = value.chars().count();
    if found != expected_len {
        return Err(GenomeError::WrongAlleleStringLength {
            param: param.to_string(),
            value: value.to_string(),
            found,
            location_param,
            expected: expected_len,
        });
    }

    value
        .chars()
        .map(|c| match Nucleotide::from_char(c) {
            Some(nuc) => Ok(nuc.value()),
            None if allow_wildcard && c == WILDCARD => Ok(WILDCARD_VALUE),
            None => Err(GenomeError::InvalidAlleleChar {
                param: param.to_string(),
                character: c,
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nucleotide_from_value() {
        assert_eq!(Nucleotide::from_value(0), Some(Nucleotide::A));
        assert_eq!(Nucleotide::from_value(1), Some(Nucleotide::C));
        assert_eq!(Nucleotide::from_value(2), Some(Nucleotide::G));
        assert_eq!(Nucleotide::from_value(3), Some(Nucleotide::T));
        assert_eq!(Nucleotide::from_value(4), None);
        assert_eq!(Nucleotide::from_value(-1), None);
    }

    #[test]
    fn test_nucleotide_chars() {
        for nuc in Nucleotide::ALL {
            assert_eq!(Nucleotide::from_char(nuc.to_char()), Some(nuc));
            assert_eq!(char::from(nuc), nuc.to_char());
        }
        assert_eq!(Nucleotide::from_char('a'), None);
        assert_eq!(Nucleotide::try_from('X'), Err('X'));
        assert_eq!(Nucleotide::char_for_value(2), 'G');
        assert_eq!(Nucleotide::char_for_value(57), '?');
        assert_eq!(format!("{}", Nucleotide::T), "T");
    }

    #[test]
    fn test_parse_allele_string() {
        let values =
            parse_allele_string("Barcode_String", "ACGT", "Barcode_Genome_Locations", 4, false)
                .unwrap();
        assert_eq!(values, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_parse_allele_string_wrong_length() {
        let err = parse_allele_string("Barcode_String", "ACG", "Barcode_Genome_Locations", 4, false)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "The 'Barcode_String' = 'ACG' is invalid.\n\
             It has 3 characters and 'Barcode_Genome_Locations' says you must have 4."
        );
    }

    #[test]
    fn test_parse_allele_string_wildcard() {
        let err =
            parse_allele_string("Drug_String", "A*", "Drug_Resistant_Genome_Locations", 2, false)
                .unwrap_err();
        assert_eq!(
            err,
            GenomeError::InvalidAlleleChar {
                param: "Drug_String".to_string(),
                character: '*'
            }
        );

        let values =
            parse_allele_string("Drug_String", "A*", "Drug_Resistant_Genome_Locations", 2, true)
                .unwrap();
        assert_eq!(values, vec![0, WILDCARD_VALUE]);
    }

    #[test]
    fn test_parse_allele_string_invalid_char_message() {
        let err = parse_allele_string("HRP_String", "N", "HRP_Genome_Locations", 1, true)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "The character 'N' in the parameter 'HRP_String' is invalid.\n\
             Valid values are: 'A', 'C', 'G', 'T'"
        );
    }
}
