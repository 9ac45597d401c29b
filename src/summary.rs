/// Counts gathered over one run, logged once the report has been written.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub fragments: usize,
    pub failures: usize,
    pub genomes: usize,
    /// Total degenerate positions over every assembled primer
    pub degenerate_positions: usize,
    /// Gap and ambiguity bytes in the alignment which were skipped
    pub uninformative: usize,
}

impl RunSummary {
    pub fn assembled(&self) -> usize {
        self.fragments - self.failures
    }

    pub fn log(&self) {
        info!(
            "Assembled {} of {} fragments against {} genomes",
            self.assembled(),
            self.fragments,
            self.genomes
        );
        info!("{} degenerate positions in total", self.degenerate_positions);

        if self.uninformative > 0 {
            info!(
                "Skipped {} gap or ambiguous alignment bytes",
                self.uninformative
            );
        }
        if self.failures > 0 {
            warn!("{} fragments failed; see the report for details", self.failures);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assembled_count() {
        let summary = RunSummary {
            fragments: 5,
            failures: 2,
            ..RunSummary::default()
        };
        assert_eq!(summary.assembled(), 3);
        summary.log();
    }
}
