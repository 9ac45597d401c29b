use std::io::Write;

use anyhow::Result;

use crate::io;
use crate::primer::{PrimerFragment, Strand};

/// Writes one tab-separated line per fragment: name, strand, anchor, length, and the 1-based
/// alignment columns it covers.
pub fn describe(fragments: &[PrimerFragment], writer: &mut impl Write) -> Result<()> {
    writeln!(writer, "name\tstrand\tanchor\tlength\tcolumns")?;
    for fragment in fragments {
        let columns = match fragment.column_span() {
            Some((first, last)) => format!("{}-{}", first as u128 + 1, last as u128 + 1),
            None => match fragment.strand {
                Strand::Forward => "ends past the last addressable column".to_string(),
                Strand::Reverse => "starts before column 1".to_string(),
            },
        };
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}",
            fragment.name,
            fragment.strand,
            fragment.anchor,
            fragment.len(),
            columns
        )?;
    }
    Ok(())
}

/// Parses the primer file at `primers` and describes each fragment.
pub fn inspect(primers: &str, writer: &mut impl Write) -> Result<()> {
    let fragments = io::read_primers(primers)?;
    describe(&fragments, writer)?;
    writer.flush()?;
    Ok(())
}
