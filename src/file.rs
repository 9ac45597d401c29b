use serde::Serialize;

/// Describes a run, and is written alongside the JSON report.
#[derive(Serialize, Default, Debug, Clone, PartialEq)]
pub struct RunMetadata {
    pub degenprimer_version: String,
    pub run_date: String,
    pub primer_file: String,
    pub alignment_file: String,
    pub ignore_threshold: usize,
    pub fragment_count: usize,
    pub genome_count: usize,
    pub alignment_length: usize,
    pub elapsed: f64,
}
