/// The layouts a report can be written in.
#[derive(clap::ValueEnum, Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// primers grouped by strand and degeneracy count, with a marker line under each primer
    #[default]
    Text,

    /// one tab-separated row per fragment
    Tsv,

    /// the whole report, with run metadata, as a JSON document
    Json,
}
