extern crate env_logger;
#[macro_use]
extern crate log;
use std::{
    fs::File,
    io::{prelude::*, stdout, BufWriter},
    path::Path,
};

use anyhow::{Context, Result};
use clap::Parser;

mod assemble;
mod call;
mod cli;
mod degeneracy;
mod file;
mod format;
mod inspect;
mod io;
mod nucleotide;
mod primer;
mod report;
mod summary;

use cli::{Cli, Commands};

/// Creates a `BufWriter` for the given output option. This allows for an output file to be passed
/// or otherwise will default to using standard output.
///
/// If `output` is `Some`, it creates a file at the specified path and returns a `BufWriter` for it.
/// If `output` is `None`, it returns a `BufWriter` for the standard output.
///
/// # Arguments
///
/// * `output` - An `Option` containing the path to the output file as a `String`.
///
/// # Returns
///
/// A `Result` containing a `BufWriter` that implements `Write`.
fn get_writer(output: &Option<String>) -> Result<impl Write> {
    // get output as a BufWriter - equal to stdout if None
    let writer = BufWriter::new(match output {
        Some(ref x) => {
            let file = File::create(Path::new(x))
                .with_context(|| format!("Unable to create output file {x}"))?;
            Box::new(file) as Box<dyn Write + Send>
        }
        None => Box::new(stdout()) as Box<dyn Write + Send>,
    });
    Ok(writer)
}

fn try_main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_target(false)
        .init();

    let cli = Cli::parse();

    info!("degenprimer v{}", cli::VERSION);

    match &cli.command {
        Commands::Call {
            primers,
            alignment,
            ignore,
            output,
            format,
            marker,
            threads,
            keep_reference,
            strict,
        } => {
            let options = call::CallOptions {
                ignore: *ignore,
                threads: *threads,
                marker: *marker,
                format: *format,
                keep_reference: *keep_reference,
                strict: *strict,
            };

            let mut writer = get_writer(output)?;
            call::degenerate(primers, alignment, &mut writer, &options)?;

            info!("Completed successfully.")
        }
        Commands::Inspect { primers, output } => {
            let mut writer = get_writer(output)?;
            inspect::inspect(primers, &mut writer)?;
        }
    };
    Ok(())
}

fn main() {
    if let Err(err) = try_main() {
        error!("{}", err);

        // report any errors that are produced
        err.chain()
            .skip(1)
            .for_each(|cause| error!("  because: {}", cause));

        std::process::exit(1);
    }
}
