use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

/// Index of a fragment within the owned input collection.
pub type FragmentId = usize;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strand {
    Forward,
    Reverse,
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strand::Forward => f.write_str("forward"),
            Strand::Reverse => f.write_str("reverse"),
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum HeaderParseErr {
    #[error(
        "invalid primer header `{header}`: expected `<anchor column>_<forward|reverse>`, \
         for example `120_forward`"
    )]
    Format { header: String },

    #[error("invalid primer header `{header}`: the anchor column is 1-based and cannot be 0")]
    ZeroAnchor { header: String },
}

/// The strand and anchor column encoded in a primer name such as `10_forward`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PrimerHeader {
    pub anchor: usize,
    pub strand: Strand,
}

fn header_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+)_(forward|reverse)$").expect("valid header regex"))
}

impl FromStr for PrimerHeader {
    type Err = HeaderParseErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let format_err = || HeaderParseErr::Format {
            header: s.to_string(),
        };

        let captures = header_regex().captures(s.trim()).ok_or_else(format_err)?;
        let anchor: usize = captures[1].parse().map_err(|_| format_err())?;
        if anchor == 0 {
            return Err(HeaderParseErr::ZeroAnchor {
                header: s.to_string(),
            });
        }

        let strand = match &captures[2] {
            "forward" => Strand::Forward,
            _ => Strand::Reverse,
        };

        Ok(PrimerHeader { anchor, strand })
    }
}

/// A candidate primer window positioned against the alignment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrimerFragment {
    /// The record name, `<anchor>_<strand>`
    pub name: String,
    /// The primer as declared, in its own read orientation
    pub sequence: Vec<u8>,
    pub strand: Strand,
    /// 1-based alignment column of the first declared base
    pub anchor: usize,
}

impl PrimerFragment {
    /// Builds a fragment from a record name and sequence, taking the strand and anchor from
    /// the name.
    pub fn from_record(name: &str, sequence: &[u8]) -> Result<Self, HeaderParseErr> {
        let PrimerHeader { anchor, strand } = name.parse()?;
        Ok(PrimerFragment {
            name: name.trim().to_string(),
            sequence: sequence.to_vec(),
            strand,
            anchor,
        })
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    /// The declared sequence as an uppercase string, as it appears in reports.
    pub fn declared_string(&self) -> String {
        String::from_utf8_lossy(&self.sequence).to_ascii_uppercase()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Converts a position of the comparison sequence (the declared sequence for forward
    /// fragments, its reverse complement for reverse ones) into the matching position of the
    /// declared sequence.
    pub fn declared_position(&self, comparison_position: usize) -> usize {
        match self.strand {
            Strand::Forward => comparison_position,
            Strand::Reverse => self.len() - 1 - comparison_position,
        }
    }

    /// The inclusive range of 0-based alignment columns covered by this fragment, or `None` if
    /// it would begin before the first column or run past `usize::MAX`.
    pub fn column_span(&self) -> Option<(usize, usize)> {
        if self.is_empty() {
            return None;
        }
        let first = aligned_column(self, 0)?;
        let last = aligned_column(self, self.len() - 1)?;
        Some((first.min(last), first.max(last)))
    }
}

/// Maps a position of the *declared* sequence to its 0-based alignment column.
///
/// A forward fragment runs rightwards from its anchor: declared position `d` sits on column
/// `anchor - 1 + d`. A reverse fragment is declared on the opposite strand, so it runs
/// leftwards from its anchor: position `d` sits on column `anchor - 1 - d`. Read left to
/// right along the alignment, the reverse fragment's columns therefore carry its reverse
/// complement, with the last comparison base on the anchor column.
///
/// Returns `None` when the column would fall before the start of the alignment.
pub fn aligned_column(fragment: &PrimerFragment, declared_position: usize) -> Option<usize> {
    let anchor = fragment.anchor.checked_sub(1)?;
    match fragment.strand {
        Strand::Forward => anchor.checked_add(declared_position),
        Strand::Reverse => anchor.checked_sub(declared_position),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragment(name: &str, seq: &str) -> PrimerFragment {
        PrimerFragment::from_record(name, seq.as_bytes()).unwrap()
    }

    #[test]
    fn parse_headers() {
        assert_eq!(
            "10_forward".parse::<PrimerHeader>(),
            Ok(PrimerHeader {
                anchor: 10,
                strand: Strand::Forward
            })
        );
        assert_eq!(
            "50_reverse".parse::<PrimerHeader>(),
            Ok(PrimerHeader {
                anchor: 50,
                strand: Strand::Reverse
            })
        );
    }

    #[test]
    fn reject_bad_headers() {
        for header in ["forward_10", "10", "10_sideways", "x_forward", "10_forward_2", ""] {
            assert!(matches!(
                header.parse::<PrimerHeader>(),
                Err(HeaderParseErr::Format { .. })
            ));
        }
        assert!(matches!(
            "0_reverse".parse::<PrimerHeader>(),
            Err(HeaderParseErr::ZeroAnchor { .. })
        ));
    }

    #[test]
    fn forward_columns() {
        let f = fragment("10_forward", "ACGT");
        let columns: Vec<_> = (0..4).map(|d| aligned_column(&f, d).unwrap()).collect();
        assert_eq!(columns, vec![9, 10, 11, 12]);
        assert_eq!(f.column_span(), Some((9, 12)));
    }

    #[test]
    fn reverse_columns() {
        // declared TACG pairs with the alignment's CGTA on columns 46..=49
        let f = fragment("50_reverse", "TACG");
        let columns: Vec<_> = (0..4).map(|d| aligned_column(&f, d).unwrap()).collect();
        assert_eq!(columns, vec![49, 48, 47, 46]);
        assert_eq!(f.column_span(), Some((46, 49)));

        // comparison position j sits on anchor - len + j
        for j in 0..4 {
            assert_eq!(aligned_column(&f, f.declared_position(j)), Some(46 + j));
        }
    }

    #[test]
    fn columns_before_alignment_start() {
        let f = fragment("2_reverse", "TACG");
        assert_eq!(aligned_column(&f, 1), Some(0));
        assert_eq!(aligned_column(&f, 2), None);
        assert_eq!(f.column_span(), None);

        let f = fragment("1_forward", "A");
        assert_eq!(aligned_column(&f, 0), Some(0));
    }

    #[test]
    fn declared_positions() {
        let f = fragment("10_forward", "ACGT");
        assert_eq!(f.declared_position(1), 1);
        let r = fragment("50_reverse", "TACG");
        assert_eq!(r.declared_position(0), 3);
        assert_eq!(r.declared_position(3), 0);
    }

    #[test]
    fn declared_string_is_uppercase() {
        assert_eq!(fragment("10_forward", "acGt").declared_string(), "ACGT");
    }
}
