use std::fs::File;
use std::io::Read;

use anyhow::{Context, Result};
use bio::io::fasta;
use itertools::Itertools;
use thiserror::Error;

use crate::degeneracy::Genome;
use crate::primer::{HeaderParseErr, PrimerFragment};

#[derive(Error, Debug)]
pub enum InputError {
    #[error("record {record} of the primer file is malformed")]
    PrimerHeader {
        record: usize,
        #[source]
        source: HeaderParseErr,
    },

    #[error("primer {name} has no sequence line")]
    MissingSequence { name: String },

    #[error("primer name {name} appears more than once")]
    DuplicateName { name: String },

    #[error("the alignment contains no genomes (the first record is the reference, and is skipped)")]
    NoGenomes,

    #[error("genome {id} is {len} columns long, but the alignment is {expected} columns long")]
    UnequalLength {
        id: String,
        len: usize,
        expected: usize,
    },
}

fn open(path: &str) -> Result<File> {
    File::open(path).with_context(|| format!("Unable to open file {path}"))
}

/// Parses primer fragments from FASTA-style records, where each header is
/// `><anchor column>_<forward|reverse>`.
///
/// # Errors
///
/// Fails on the first record which cannot be read, has a malformed header, or has no sequence,
/// and if any two records share a name.
pub fn parse_primers(reader: impl Read) -> Result<Vec<PrimerFragment>> {
    let fragments = fasta::Reader::new(reader)
        .records()
        .enumerate()
        .map(|(i, record)| -> Result<PrimerFragment> {
            let record = record.with_context(|| format!("Unable to read primer record {}", i + 1))?;

            let fragment = PrimerFragment::from_record(record.id(), record.seq()).map_err(
                |source| InputError::PrimerHeader {
                    record: i + 1,
                    source,
                },
            )?;

            if fragment.is_empty() {
                return Err(InputError::MissingSequence {
                    name: fragment.name,
                }
                .into());
            }
            Ok(fragment)
        })
        .collect::<Result<Vec<_>>>()?;

    if let Some(name) = fragments.iter().map(|f| &f.name).duplicates().next() {
        return Err(InputError::DuplicateName { name: name.clone() }.into());
    }

    Ok(fragments)
}

/// Reads the primer fragments at `path`. See [`parse_primers`].
pub fn read_primers(path: &str) -> Result<Vec<PrimerFragment>> {
    let fragments =
        parse_primers(open(path)?).with_context(|| format!("Unable to parse primers in {path}"))?;
    info!("Read {} primer fragments from {path}", fragments.len());
    Ok(fragments)
}

/// Parses the genomes of a FASTA alignment. Sequences may span multiple lines.
///
/// The first record is the sequence the alignment was built against and is skipped, unless
/// `keep_reference` is set.
///
/// # Errors
///
/// Fails if a record cannot be read, if no genomes remain, or if the genomes are not all the same
/// length.
pub fn parse_alignment(reader: impl Read, keep_reference: bool) -> Result<Vec<Genome>> {
    let skip = if keep_reference { 0 } else { 1 };
    let mut genomes = Vec::new();

    for (i, record) in fasta::Reader::new(reader).records().enumerate() {
        let record = record.with_context(|| format!("Unable to read alignment record {}", i + 1))?;

        if i < skip {
            debug!("Skipping reference record {}", record.id());
            continue;
        }

        if let Some(expected) = genomes.first().map(Vec::len) {
            if record.seq().len() != expected {
                return Err(InputError::UnequalLength {
                    id: record.id().to_string(),
                    len: record.seq().len(),
                    expected,
                }
                .into());
            }
        }

        debug!("Genome {}: {} columns", record.id(), record.seq().len());
        genomes.push(record.seq().to_vec());
    }

    if genomes.is_empty() {
        return Err(InputError::NoGenomes.into());
    }

    Ok(genomes)
}

/// Reads the genomes of the alignment at `path`. See [`parse_alignment`].
pub fn read_alignment(path: &str, keep_reference: bool) -> Result<Vec<Genome>> {
    let genomes = parse_alignment(open(path)?, keep_reference)
        .with_context(|| format!("Unable to parse alignment in {path}"))?;
    info!(
        "Read {} genomes of {} columns from {path}",
        genomes.len(),
        genomes[0].len()
    );
    Ok(genomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primer::Strand;
    use indoc::indoc;

    #[test]
    fn primers() {
        let input = indoc! {"
            >10_forward
            ACGT
            >50_reverse
            TACG
        "};

        let fragments = parse_primers(input.as_bytes()).unwrap();
        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].name, "10_forward");
        assert_eq!(fragments[0].anchor, 10);
        assert_eq!(fragments[0].strand, Strand::Forward);
        assert_eq!(fragments[1].sequence, b"TACG");
        assert_eq!(fragments[1].strand, Strand::Reverse);
    }

    #[test]
    fn malformed_primer_header() {
        let input = indoc! {"
            >10_forward
            ACGT
            >fifty_reverse
            TACG
        "};

        let err = parse_primers(input.as_bytes()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<InputError>(),
            Some(InputError::PrimerHeader { record: 2, .. })
        ));
    }

    #[test]
    fn missing_primer_sequence() {
        let input = ">10_forward\n>12_forward\nACGT\n";
        let err = parse_primers(input.as_bytes()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<InputError>(),
            Some(InputError::MissingSequence { name }) if name == "10_forward"
        ));
    }

    #[test]
    fn duplicate_primer_names() {
        let input = ">10_forward\nACGT\n>10_forward\nAAAA\n";
        let err = parse_primers(input.as_bytes()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<InputError>(),
            Some(InputError::DuplicateName { .. })
        ));
    }

    #[test]
    fn alignment_skips_reference() {
        let input = indoc! {"
            >reference
            AAAAAAAA
            >genome_1
            ACGT
            ACGT
            >genome_2
            TTTTGGGG
        "};

        let genomes = parse_alignment(input.as_bytes(), false).unwrap();
        assert_eq!(genomes, vec![b"ACGTACGT".to_vec(), b"TTTTGGGG".to_vec()]);

        let genomes = parse_alignment(input.as_bytes(), true).unwrap();
        assert_eq!(genomes.len(), 3);
        assert_eq!(genomes[0], b"AAAAAAAA");
    }

    #[test]
    fn alignment_errors() {
        let err = parse_alignment(">reference\nACGT\n".as_bytes(), false).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<InputError>(),
            Some(InputError::NoGenomes)
        ));

        let input = ">reference\nACGT\n>a\nACGT\n>b\nACG\n";
        let err = parse_alignment(input.as_bytes(), false).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<InputError>(),
            Some(InputError::UnequalLength { len: 3, expected: 4, .. })
        ));
    }

    #[test]
    fn missing_file() {
        let err = read_primers("file_which_does_not_exist.seqs").unwrap_err();
        assert!(err.to_string().contains("Unable to open file"));
    }
}
