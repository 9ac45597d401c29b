use rayon::prelude::*;
use thiserror::Error;

use crate::nucleotide::{self, BaseSet, CodecError};
use crate::primer::{aligned_column, PrimerFragment, Strand};

/// One aligned genome. Every genome of an alignment has the same length, so a column index
/// means the same thing in each of them.
pub type Genome = Vec<u8>;

/// Errors which stop a single fragment from being processed. These never abort a run; the
/// fragment is reported as failed instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FragmentError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("column {column} is outside the alignment (length {genome_len})")]
    OutOfRangeColumn { column: i128, genome_len: usize },

    #[error("primer sequence is empty")]
    EmptySequence,
}

/// Decides whether a genome's mismatch is noise.
///
/// The counter is per genome and runs across the whole fragment: it is incremented for every
/// base the genome contributes that is not yet in the position's set, and the base is kept once
/// the incremented count reaches the threshold. Thresholds of 0 and 1 therefore keep every
/// mismatch, and a threshold of `n` drops a genome's first `n - 1` new bases.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct IgnorePolicy {
    pub threshold: usize,
}

impl IgnorePolicy {
    pub fn new(threshold: usize) -> Self {
        IgnorePolicy { threshold }
    }

    #[inline(always)]
    pub fn accepts(&self, mismatches: usize) -> bool {
        mismatches >= self.threshold
    }
}

/// The observed bases of one fragment, indexed by position of its comparison sequence (the
/// declared sequence for forward fragments, its reverse complement for reverse ones).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DegeneracyMap {
    sets: Vec<BaseSet>,
    /// Genome bytes skipped because they were not A, C, G or T
    pub uninformative: usize,
}

impl DegeneracyMap {
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &BaseSet> + ExactSizeIterator {
        self.sets.iter()
    }

    /// Each position's bases as an alphabetically sorted string, e.g. `["A", "CG", "G"]`.
    #[cfg(test)]
    pub fn to_strings(&self) -> Vec<String> {
        self.sets.iter().map(BaseSet::to_sorted_string).collect()
    }

    pub fn degenerate_positions(&self) -> usize {
        self.sets.iter().filter(|s| s.is_degenerate()).count()
    }
}

/// The sequence that is compared column by column against the alignment, reading left to
/// right along the genomes.
pub fn comparison_sequence(fragment: &PrimerFragment) -> Result<Vec<u8>, CodecError> {
    match fragment.strand {
        Strand::Forward => nucleotide::canonical(&fragment.sequence),
        Strand::Reverse => nucleotide::reverse_complement(&fragment.sequence),
    }
}

/// Resolves the 0-based alignment column of every comparison position, checking that each one
/// lies inside a genome of length `genome_len`.
fn comparison_columns(
    fragment: &PrimerFragment,
    genome_len: usize,
) -> Result<Vec<usize>, FragmentError> {
    // the 1-based column of the left-most base, used to describe fragments which hang off
    // either end of the alignment. i128 holds any usize anchor and length without overflow
    let first_column = match fragment.strand {
        Strand::Forward => fragment.anchor as i128,
        Strand::Reverse => fragment.anchor as i128 - fragment.len() as i128 + 1,
    };

    (0..fragment.len())
        .map(|j| match aligned_column(fragment, fragment.declared_position(j)) {
            Some(column) if column < genome_len => Ok(column),
            _ => Err(FragmentError::OutOfRangeColumn {
                column: first_column + j as i128,
                genome_len,
            }),
        })
        .collect()
}

/// Builds the degeneracy map of a single fragment against every genome.
///
/// # Errors
///
/// * `FragmentError::EmptySequence` if the fragment has no bases.
/// * `FragmentError::Codec` if the fragment contains a non-ACGT byte.
/// * `FragmentError::OutOfRangeColumn` if any base of the fragment falls outside the shortest
///   genome. This is checked before any genome is consulted.
pub fn accumulate_fragment(
    fragment: &PrimerFragment,
    genomes: &[Genome],
    policy: IgnorePolicy,
) -> Result<DegeneracyMap, FragmentError> {
    if fragment.is_empty() {
        return Err(FragmentError::EmptySequence);
    }

    let comparison = comparison_sequence(fragment)?;

    // with no genomes every column is trivially in range
    let genome_len = genomes.iter().map(Vec::len).min().unwrap_or(usize::MAX);
    let columns = comparison_columns(fragment, genome_len)?;

    // the fragment's own base is always a candidate; the comparison sequence is pure ACGT,
    // so no position is dropped here
    let mut sets: Vec<BaseSet> = comparison
        .iter()
        .filter_map(|&b| BaseSet::from_base(b))
        .collect();
    let mut uninformative = 0;

    for genome in genomes {
        let mut mismatches = 0;

        for (j, (&own, &column)) in comparison.iter().zip(columns.iter()).enumerate() {
            let observed = genome[column].to_ascii_uppercase();

            if BaseSet::from_base(observed).is_none() {
                // gaps and ambiguity symbols say nothing about which base is present
                uninformative += 1;
                continue;
            }

            if observed != own && !sets[j].contains(observed) {
                mismatches += 1;
                if policy.accepts(mismatches) {
                    sets[j].insert(observed);
                }
            }
        }
    }

    if uninformative > 0 {
        debug!(
            "{}: skipped {} non-ACGT alignment bytes",
            fragment.name, uninformative
        );
    }

    Ok(DegeneracyMap {
        sets,
        uninformative,
    })
}

/// Builds the degeneracy map of every fragment. Fragments are processed in parallel on the
/// current rayon pool; the output is index-aligned with `fragments`.
pub fn accumulate(
    fragments: &[PrimerFragment],
    genomes: &[Genome],
    policy: IgnorePolicy,
) -> Vec<Result<DegeneracyMap, FragmentError>> {
    fragments
        .par_iter()
        .map(|fragment| accumulate_fragment(fragment, genomes, policy))
        .collect()
}
