use clap::builder::styling::AnsiColor;
use clap::builder::Styles;
use clap::{Parser, Subcommand};

use crate::format::OutputFormat;

const fn extra_build_info() -> &'static str {
    match option_env!("CARGO_BUILD_DESC") {
        Some(e) => e,
        None => env!("CARGO_PKG_VERSION"),
    }
}
pub const VERSION: &str = extra_build_info();
const INFO_STRING: &str = "
🧬 degenprimer version ";
const AFTER_STRING: &str = "
   ──────────────────────────────────
   degenerate PCR primers from candidate primer windows and an aligned genome set";

// colouring of the help
const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().bold())
    .usage(AnsiColor::BrightMagenta.on_default().bold())
    .literal(AnsiColor::BrightMagenta.on_default())
    .placeholder(AnsiColor::White.on_default());

#[derive(Parser)]
#[command(
    version = VERSION,
    about = format!("{}{}{}", INFO_STRING, VERSION, AFTER_STRING),
    arg_required_else_help = true,
    flatten_help = true,
    styles = STYLES
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Derive an ambiguity-coded primer for every candidate primer window
    #[command(arg_required_else_help = true)]
    Call {
        /// the primer file, with two-line records of the form:
        ///   >120_forward
        ///   ACGTTGCA
        #[arg(long, verbatim_doc_comment)]
        primers: String,

        /// the aligned genomes in FASTA format. the first record is the alignment reference,
        /// and is skipped unless --keep-reference is given
        #[arg(long)]
        alignment: String,

        /// drop each genome's first N-1 previously unseen bases within a primer window, so that
        /// rare variants do not make a position degenerate. 0 and 1 keep every variant
        #[arg(long, default_value_t = 0)]
        ignore: usize,

        /// the output file, otherwise standard output
        #[arg(short)]
        output: Option<String>,

        /// the report layout
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// the character placed under degenerate positions in the text report
        #[arg(long, default_value_t = crate::report::DEFAULT_MARKER)]
        marker: char,

        /// the number of threads to use
        #[arg(short, long, default_value_t = 4)]
        threads: usize,

        /// treat the first alignment record as a genome instead of skipping it
        #[arg(long, action)]
        keep_reference: bool,

        /// exit with an error if any primer window could not be processed
        #[arg(long, action)]
        strict: bool,
    },

    /// Check a primer file, and show the alignment columns each primer window covers
    #[command(arg_required_else_help = true)]
    Inspect {
        /// the primer file
        #[arg(long)]
        primers: String,

        /// the output file, otherwise standard output
        #[arg(short)]
        output: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn call_defaults() {
        let cli = Cli::try_parse_from([
            "degenprimer",
            "call",
            "--primers",
            "p.seqs",
            "--alignment",
            "a.fasta",
        ])
        .unwrap();

        match cli.command {
            Commands::Call {
                ignore,
                format,
                marker,
                threads,
                keep_reference,
                strict,
                output,
                ..
            } => {
                assert_eq!(ignore, 0);
                assert_eq!(format, OutputFormat::Text);
                assert_eq!(marker, '*');
                assert_eq!(threads, 4);
                assert!(!keep_reference);
                assert!(!strict);
                assert!(output.is_none());
            }
            _ => panic!("expected the call subcommand"),
        }
    }

    #[test]
    fn rejects_negative_threshold() {
        let result = Cli::try_parse_from([
            "degenprimer",
            "call",
            "--primers",
            "p.seqs",
            "--alignment",
            "a.fasta",
            "--ignore",
            "-1",
        ]);
        assert!(result.is_err());
    }
}
