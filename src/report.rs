use std::collections::BTreeMap;
use std::io::Write;

use anyhow::{Context, Result};
use csv::WriterBuilder;
use serde::Serialize;
use serde_json::json;

use crate::assemble::AssembledPrimer;
use crate::degeneracy::FragmentError;
use crate::file::RunMetadata;
use crate::primer::{FragmentId, PrimerFragment, Strand};

pub const DEFAULT_MARKER: char = '*';

/// One assembled primer as it appears in the report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    #[serde(skip)]
    pub id: FragmentId,
    pub name: String,
    pub anchor: usize,
    pub sequence: String,
    pub coded: String,
    pub degeneracies: usize,
    /// `marker` under every degenerate position of `coded`, spaces elsewhere
    pub markers: String,
}

/// All primers of a strand sharing one degeneracy count.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Bucket {
    pub degeneracies: usize,
    pub primers: Vec<ReportEntry>,
}

/// A fragment which could not be assembled, and why.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Failure {
    #[serde(skip)]
    pub id: FragmentId,
    pub name: String,
    pub anchor: usize,
    pub sequence: String,
    pub error: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StrandGroup {
    /// Sorted by ascending degeneracy count
    pub buckets: Vec<Bucket>,
    pub failures: Vec<Failure>,
}

impl StrandGroup {
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty() && self.failures.is_empty()
    }

    /// The primers of this group in report order.
    pub fn entries(&self) -> impl Iterator<Item = &ReportEntry> {
        self.buckets.iter().flat_map(|b| b.primers.iter())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    pub forward: StrandGroup,
    pub reverse: StrandGroup,
}

/// A flattened TSV row. Assembled primers leave `error` empty, failures leave `coded` and
/// `degeneracies` empty.
#[derive(Serialize)]
struct Row<'a> {
    name: &'a str,
    strand: Strand,
    anchor: usize,
    sequence: &'a str,
    coded: Option<&'a str>,
    degeneracies: Option<usize>,
    error: Option<&'a str>,
}

impl Report {
    /// Groups the outcome of every fragment by strand, then by degeneracy count.
    ///
    /// `outcomes` must be index-aligned with `fragments`. Within a bucket, primers keep their
    /// input order. Failed fragments are listed under their strand with the error message.
    pub fn build(
        fragments: &[PrimerFragment],
        outcomes: Vec<Result<AssembledPrimer, FragmentError>>,
        marker: char,
    ) -> Self {
        let mut buckets: [BTreeMap<usize, Vec<ReportEntry>>; 2] = Default::default();
        let mut report = Report::default();

        for (id, (fragment, outcome)) in fragments.iter().zip(outcomes).enumerate() {
            let slot = match fragment.strand {
                Strand::Forward => 0,
                Strand::Reverse => 1,
            };

            match outcome {
                Ok(primer) => {
                    let markers = primer.marker_line(marker);
                    buckets[slot]
                        .entry(primer.degeneracies)
                        .or_default()
                        .push(ReportEntry {
                            id,
                            name: primer.name,
                            anchor: primer.anchor,
                            sequence: primer.sequence,
                            coded: primer.coded,
                            degeneracies: primer.degeneracies,
                            markers,
                        });
                }
                Err(e) => {
                    warn!("Skipping {}: {}", fragment.name, e);
                    report.group_mut(fragment.strand).failures.push(Failure {
                        id,
                        name: fragment.name.clone(),
                        anchor: fragment.anchor,
                        sequence: fragment.declared_string(),
                        error: e.to_string(),
                    });
                }
            }
        }

        let [forward, reverse] = buckets;
        report.forward.buckets = into_buckets(forward);
        report.reverse.buckets = into_buckets(reverse);
        report
    }

    pub fn group(&self, strand: Strand) -> &StrandGroup {
        match strand {
            Strand::Forward => &self.forward,
            Strand::Reverse => &self.reverse,
        }
    }

    fn group_mut(&mut self, strand: Strand) -> &mut StrandGroup {
        match strand {
            Strand::Forward => &mut self.forward,
            Strand::Reverse => &mut self.reverse,
        }
    }

    pub fn failure_count(&self) -> usize {
        self.forward.failures.len() + self.reverse.failures.len()
    }

    /// Writes the human-readable report.
    pub fn write_text(&self, writer: &mut impl Write) -> Result<()> {
        for strand in [Strand::Forward, Strand::Reverse] {
            let group = self.group(strand);
            writeln!(writer, "{strand} primers")?;

            if group.is_empty() {
                writeln!(writer, "  (none)")?;
                continue;
            }

            for bucket in group.buckets.iter() {
                writeln!(writer, "  {} degenerate position(s)", bucket.degeneracies)?;
                for entry in bucket.primers.iter() {
                    writeln!(writer, "    {}", entry.name)?;
                    writeln!(writer, "    {}", entry.coded)?;
                    writeln!(writer, "    {}", entry.markers)?;
                }
            }

            if !group.failures.is_empty() {
                writeln!(writer, "  failed")?;
                for failure in group.failures.iter() {
                    writeln!(writer, "    {}: {}", failure.name, failure.error)?;
                }
            }
        }
        Ok(())
    }

    /// Writes one tab-separated row per fragment, in report order.
    pub fn write_tsv(&self, writer: &mut impl Write) -> Result<()> {
        let mut wtr = WriterBuilder::new().delimiter(b'\t').from_writer(writer);

        for strand in [Strand::Forward, Strand::Reverse] {
            let group = self.group(strand);
            for entry in group.entries() {
                wtr.serialize(Row {
                    name: &entry.name,
                    strand,
                    anchor: entry.anchor,
                    sequence: &entry.sequence,
                    coded: Some(entry.coded.as_str()),
                    degeneracies: Some(entry.degeneracies),
                    error: None,
                })?;
            }
            for failure in group.failures.iter() {
                wtr.serialize(Row {
                    name: &failure.name,
                    strand,
                    anchor: failure.anchor,
                    sequence: &failure.sequence,
                    coded: None,
                    degeneracies: None,
                    error: Some(failure.error.as_str()),
                })?;
            }
        }

        wtr.flush().context("Unable to write TSV report")?;
        Ok(())
    }

    /// Writes the report, together with the run metadata, as a JSON document.
    pub fn write_json(&self, metadata: &RunMetadata, writer: &mut impl Write) -> Result<()> {
        let data = json!({
            "metadata": metadata,
            "forward": self.forward,
            "reverse": self.reverse,
        });
        serde_json::to_writer_pretty(&mut *writer, &data).context("Could not serialize report")?;
        writeln!(writer)?;
        Ok(())
    }
}

fn into_buckets(map: BTreeMap<usize, Vec<ReportEntry>>) -> Vec<Bucket> {
    map.into_iter()
        .map(|(degeneracies, mut primers)| {
            // already in input order, but make the tie-break explicit
            primers.sort_by_key(|p| p.id);
            Bucket {
                degeneracies,
                primers,
            }
        })
        .collect()
}
