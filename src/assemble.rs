use serde::Serialize;

use crate::degeneracy::{DegeneracyMap, FragmentError};
use crate::nucleotide::BaseSet;
use crate::primer::{FragmentId, PrimerFragment, Strand};

/// A primer with every position replaced by the IUPAC symbol for the bases observed there.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AssembledPrimer {
    #[serde(skip)]
    pub id: FragmentId,
    pub name: String,
    pub strand: Strand,
    pub anchor: usize,
    /// The primer as declared
    pub sequence: String,
    /// The ambiguity-coded primer, in the same orientation as `sequence`
    pub coded: String,
    pub degeneracies: usize,
}

impl AssembledPrimer {
    /// A line as long as the coded primer, with `marker` under each degenerate position and a
    /// space everywhere else.
    pub fn marker_line(&self, marker: char) -> String {
        self.coded
            .bytes()
            .map(|c| match BaseSet::expand(c) {
                Some(set) if !set.is_degenerate() => ' ',
                _ => marker,
            })
            .collect()
    }
}

fn code_of(set: BaseSet, fragment: &PrimerFragment) -> Result<char, FragmentError> {
    set.code().map(char::from).map_err(|e| {
        // the accumulator never produces an empty set
        error!("{}: internal error while coding primer: {}", fragment.name, e);
        FragmentError::from(e)
    })
}

/// Converts a fragment's degeneracy map into its ambiguity-coded primer.
///
/// Forward fragments are coded position by position. The map of a reverse fragment is held in
/// comparison orientation (the reverse complement of the declared primer), so each set is
/// complemented and the codes are laid down right to left, giving a primer which reads in the
/// same direction as the declared sequence.
///
/// # Errors
///
/// Returns `FragmentError::Codec` if any position has no ambiguity code. This cannot happen for
/// a map built by [`crate::degeneracy::accumulate`], and is logged as an internal error.
pub fn assemble(
    id: FragmentId,
    fragment: &PrimerFragment,
    map: &DegeneracyMap,
) -> Result<AssembledPrimer, FragmentError> {
    let coded = match fragment.strand {
        Strand::Forward => map
            .iter()
            .map(|set| code_of(*set, fragment))
            .collect::<Result<String, _>>()?,
        Strand::Reverse => map
            .iter()
            .rev()
            .map(|set| code_of(set.complement(), fragment))
            .collect::<Result<String, _>>()?,
    };

    let degeneracies = map.degenerate_positions();

    Ok(AssembledPrimer {
        id,
        name: fragment.name.clone(),
        strand: fragment.strand,
        anchor: fragment.anchor,
        sequence: fragment.declared_string(),
        coded,
        degeneracies,
    })
}
