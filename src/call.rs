use std::io::prelude::*;
use std::time::Instant;

use anyhow::{bail, Result};

use crate::assemble::{assemble, AssembledPrimer};
use crate::degeneracy::{accumulate, FragmentError, Genome, IgnorePolicy};
use crate::file::RunMetadata;
use crate::format::OutputFormat;
use crate::io;
use crate::primer::PrimerFragment;
use crate::report::Report;
use crate::summary::RunSummary;

/// Options for a single `call` run, as given on the command line.
pub struct CallOptions {
    pub ignore: usize,
    pub threads: usize,
    pub marker: char,
    pub format: OutputFormat,
    pub keep_reference: bool,
    pub strict: bool,
}

/// Accumulates and assembles every fragment against the genomes, returning one outcome per
/// fragment in input order.
///
/// # Arguments
///
/// * `fragments` - The primer fragments, in input order.
/// * `genomes` - The aligned genomes, shared read-only by every fragment.
/// * `policy` - The ignore threshold applied to each genome's mismatches.
/// * `threads` - The number of threads to accumulate on.
///
/// # Returns
///
/// * The outcome of every fragment, and a summary of the run.
pub fn process(
    fragments: &[PrimerFragment],
    genomes: &[Genome],
    policy: IgnorePolicy,
    threads: usize,
) -> Result<(Vec<Result<AssembledPrimer, FragmentError>>, RunSummary)> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .build()?;
    let maps = pool.install(|| accumulate(fragments, genomes, policy));

    let mut summary = RunSummary {
        fragments: fragments.len(),
        genomes: genomes.len(),
        ..RunSummary::default()
    };

    let outcomes: Vec<_> = fragments
        .iter()
        .zip(maps)
        .enumerate()
        .map(|(id, (fragment, map))| {
            let map = map?;
            summary.uninformative += map.uninformative;
            assemble(id, fragment, &map)
        })
        .collect();

    for outcome in outcomes.iter() {
        match outcome {
            Ok(primer) => summary.degenerate_positions += primer.degeneracies,
            Err(_) => summary.failures += 1,
        }
    }

    Ok((outcomes, summary))
}

/// Derives degenerate primers for every fragment in `primers` against the genomes in
/// `alignment`, and writes the report to `writer`.
///
/// # Errors
///
/// Fails if either input cannot be opened or parsed, if the report cannot be written, or, with
/// `strict` set, if any fragment failed.
pub fn degenerate(
    primers: &str,
    alignment: &str,
    writer: &mut impl Write,
    options: &CallOptions,
) -> Result<()> {
    let start = Instant::now();

    // both inputs are read before any processing begins
    let fragments = io::read_primers(primers)?;
    let genomes = io::read_alignment(alignment, options.keep_reference)?;

    let policy = IgnorePolicy::new(options.ignore);
    info!("Using an ignore threshold of {}", policy.threshold);

    let (outcomes, summary) = process(&fragments, &genomes, policy, options.threads)?;
    let report = Report::build(&fragments, outcomes, options.marker);

    match options.format {
        OutputFormat::Text => report.write_text(writer)?,
        OutputFormat::Tsv => report.write_tsv(writer)?,
        OutputFormat::Json => {
            let metadata = RunMetadata {
                degenprimer_version: crate::cli::VERSION.to_string(),
                run_date: format!("{:?}", chrono::offset::Local::now()),
                primer_file: primers.to_string(),
                alignment_file: alignment.to_string(),
                ignore_threshold: policy.threshold,
                fragment_count: fragments.len(),
                genome_count: genomes.len(),
                alignment_length: genomes[0].len(),
                elapsed: start.elapsed().as_secs_f64(),
            };
            report.write_json(&metadata, writer)?
        }
    }
    writer.flush()?;

    summary.log();

    let failures = report.failure_count();
    if options.strict && failures > 0 {
        bail!(
            "{} of {} fragments failed, and --strict was given",
            failures,
            summary.fragments
        );
    }

    Ok(())
}
