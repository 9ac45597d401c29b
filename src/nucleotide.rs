use std::fmt;

use serde::{Serialize, Serializer};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("encountered non-ACGT character {base:?} at offset {offset}")]
    InvalidBase { base: char, offset: usize },

    #[error("no ambiguity code exists for base set `{bases}`")]
    AmbiguityCodeLookup { bases: String },
}

/// The four bases in canonical (alphabetical) order, paired with their bit in a [`BaseSet`].
const BASES: [(u8, u8); 4] = [(b'A', 0b0001), (b'C', 0b0010), (b'G', 0b0100), (b'T', 0b1000)];

// indexed by the bit pattern of a BaseSet; 0 marks the empty set, which has no code
const IUPAC: [u8; 16] = [
    0, b'A', b'C', b'M', b'G', b'R', b'S', b'V', b'T', b'W', b'Y', b'H', b'K', b'D', b'B', b'N',
];

#[inline(always)]
fn complement_byte(base: u8) -> Option<u8> {
    match base.to_ascii_uppercase() {
        b'A' => Some(b'T'),
        b'T' => Some(b'A'),
        b'C' => Some(b'G'),
        b'G' => Some(b'C'),
        _ => None,
    }
}

/// Returns the Watson-Crick complement of a single base. Lowercase input is accepted, and the
/// output is always uppercase.
pub fn complement(base: u8) -> Result<u8, CodecError> {
    complement_byte(base).ok_or(CodecError::InvalidBase {
        base: base as char,
        offset: 0,
    })
}

/// Reverses `sequence` and complements every base.
///
/// # Errors
///
/// Returns `CodecError::InvalidBase` for a byte which is not one of `ACGTacgt`. The offset
/// reported is the position of that byte in the *input* sequence.
pub fn reverse_complement(sequence: &[u8]) -> Result<Vec<u8>, CodecError> {
    sequence
        .iter()
        .enumerate()
        .rev()
        .map(|(offset, &base)| {
            complement(base).map_err(|_| CodecError::InvalidBase {
                base: base as char,
                offset,
            })
        })
        .collect()
}

/// Uppercases `sequence`, rejecting anything which is not a nucleotide.
///
/// # Errors
///
/// Returns `CodecError::InvalidBase` for the first byte which is not one of `ACGTacgt`.
pub fn canonical(sequence: &[u8]) -> Result<Vec<u8>, CodecError> {
    sequence
        .iter()
        .enumerate()
        .map(|(offset, &base)| match base.to_ascii_uppercase() {
            b @ (b'A' | b'C' | b'G' | b'T') => Ok(b),
            _ => Err(CodecError::InvalidBase {
                base: base as char,
                offset,
            }),
        })
        .collect()
}

/// A set of nucleotides drawn from {A, C, G, T}, stored as a 4-bit mask.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct BaseSet(u8);

impl BaseSet {
    /// The singleton set for `base`, or `None` if `base` is not a nucleotide.
    pub fn from_base(base: u8) -> Option<Self> {
        let base = base.to_ascii_uppercase();
        BASES
            .iter()
            .find(|(b, _)| *b == base)
            .map(|(_, bit)| BaseSet(*bit))
    }

    /// Expands an IUPAC ambiguity symbol into the set of bases it stands for. This is the
    /// inverse of [`BaseSet::code`].
    pub fn expand(code: u8) -> Option<Self> {
        let code = code.to_ascii_uppercase();
        IUPAC
            .iter()
            .skip(1)
            .position(|c| *c == code)
            .map(|i| BaseSet(i as u8 + 1))
    }

    /// Adds `base` to the set. Returns whether the set changed; non-nucleotides are ignored.
    pub fn insert(&mut self, base: u8) -> bool {
        match BaseSet::from_base(base) {
            Some(BaseSet(bit)) if self.0 & bit == 0 => {
                self.0 |= bit;
                true
            }
            _ => false,
        }
    }

    pub fn contains(&self, base: u8) -> bool {
        BaseSet::from_base(base).is_some_and(|BaseSet(bit)| self.0 & bit != 0)
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_degenerate(&self) -> bool {
        self.len() > 1
    }

    /// Complements every base in the set. A and T swap bits 0 and 3, C and G swap bits 1 and
    /// 2, so this is a reversal of the low nibble.
    pub fn complement(self) -> Self {
        BaseSet(self.0.reverse_bits() >> 4)
    }

    /// The bases of the set in alphabetical order.
    pub fn bases(&self) -> impl Iterator<Item = u8> + '_ {
        BASES
            .iter()
            .filter(|(_, bit)| self.0 & bit != 0)
            .map(|(b, _)| *b)
    }

    pub fn to_sorted_string(&self) -> String {
        self.bases().map(char::from).collect()
    }

    /// The IUPAC symbol for this set, e.g. `R` for `{A, G}`. Every non-empty subset of
    /// {A, C, G, T} has exactly one symbol.
    ///
    /// # Errors
    ///
    /// The empty set has no symbol, and yields `CodecError::AmbiguityCodeLookup`.
    pub fn code(&self) -> Result<u8, CodecError> {
        match IUPAC[(self.0 & 0b1111) as usize] {
            0 => Err(CodecError::AmbiguityCodeLookup {
                bases: self.to_sorted_string(),
            }),
            code => Ok(code),
        }
    }
}

impl fmt::Debug for BaseSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.to_sorted_string())
    }
}

impl fmt::Display for BaseSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sorted_string())
    }
}

impl Serialize for BaseSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_sorted_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complement_pairs() {
        assert_eq!(complement(b'A'), Ok(b'T'));
        assert_eq!(complement(b'T'), Ok(b'A'));
        assert_eq!(complement(b'c'), Ok(b'G'));
        assert_eq!(complement(b'G'), Ok(b'C'));
        assert!(matches!(
            complement(b'N'),
            Err(CodecError::InvalidBase { base: 'N', .. })
        ));
    }

    #[test]
    fn reverse_complement_sequence() {
        assert_eq!(reverse_complement(b"TACG").unwrap(), b"CGTA");
        assert_eq!(reverse_complement(b"AACCGT").unwrap(), b"ACGGTT");
        assert_eq!(reverse_complement(b"").unwrap(), b"");
    }

    #[test]
    fn reverse_complement_reports_offset() {
        assert_eq!(
            reverse_complement(b"ACXT"),
            Err(CodecError::InvalidBase { base: 'X', offset: 2 })
        );
    }

    #[test]
    fn canonical_sequence() {
        assert_eq!(canonical(b"acGt").unwrap(), b"ACGT");
        assert_eq!(
            canonical(b"AC-T"),
            Err(CodecError::InvalidBase { base: '-', offset: 2 })
        );
    }

    #[test]
    fn full_code_table() {
        let table: [(&[u8], u8); 15] = [
            (b"A", b'A'),
            (b"C", b'C'),
            (b"G", b'G'),
            (b"T", b'T'),
            (b"AG", b'R'),
            (b"CT", b'Y'),
            (b"CG", b'S'),
            (b"AT", b'W'),
            (b"GT", b'K'),
            (b"AC", b'M'),
            (b"CGT", b'B'),
            (b"AGT", b'D'),
            (b"ACT", b'H'),
            (b"ACG", b'V'),
            (b"ACGT", b'N'),
        ];

        for (bases, code) in table {
            let mut set = BaseSet::default();
            for &b in bases {
                set.insert(b);
            }
            assert_eq!(set.code(), Ok(code), "{:?}", bases);
            assert_eq!(set.to_sorted_string().as_bytes(), bases);

            // and back again
            assert_eq!(BaseSet::expand(code), Some(set));
        }
    }

    #[test]
    fn insertion_order_does_not_matter() {
        let mut set = BaseSet::default();
        for b in *b"TGA" {
            set.insert(b);
        }
        assert_eq!(set.code(), Ok(b'D'));
        assert_eq!(set.to_sorted_string(), "AGT");
    }

    #[test]
    fn empty_set_has_no_code() {
        assert!(matches!(
            BaseSet::default().code(),
            Err(CodecError::AmbiguityCodeLookup { .. })
        ));
        assert_eq!(BaseSet::expand(b'X'), None);
        assert_eq!(BaseSet::expand(b'-'), None);
    }

    #[test]
    fn single_base_round_trip() {
        for base in *b"ACGT" {
            let code = BaseSet::from_base(base).unwrap().code().unwrap();
            assert_eq!(code, base);
            let decoded: Vec<u8> = BaseSet::expand(code).unwrap().bases().collect();
            assert_eq!(decoded, vec![base]);
        }
    }

    #[test]
    fn set_complement() {
        let mut set = BaseSet::from_base(b'A').unwrap();
        set.insert(b'C');
        assert_eq!(set.complement().to_sorted_string(), "GT");
        assert_eq!(BaseSet::expand(b'N').unwrap().complement(), BaseSet::expand(b'N').unwrap());
        assert_eq!(BaseSet::expand(b'S').unwrap().complement().to_sorted_string(), "CG");
    }

    #[test]
    fn insert_and_contains() {
        let mut set = BaseSet::default();
        assert_eq!(set.len(), 0);
        assert!(set.insert(b'g'));
        assert!(!set.insert(b'G'));
        assert!(!set.insert(b'-'));
        assert!(set.contains(b'G'));
        assert!(!set.contains(b'A'));
        assert_eq!(set.len(), 1);
        assert!(!set.is_degenerate());
        set.insert(b'T');
        assert!(set.is_degenerate());
        assert_eq!(format!("{:?}", set), "{GT}");
    }
}
