use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::error::{CorpusError, Result};

/// Writes the lines of every source, in order, to `destination`.
///
/// Each line is terminated with `\n`. Returns the number of lines written.
pub fn concatenate<P: AsRef<Path>>(sources: &[P], destination: impl AsRef<Path>) -> Result<usize> {
    let destination = destination.as_ref();
    info!(
        "Concatenating {} into {}",
        sources
            .iter()
            .map(|p| p.as_ref().display().to_string())
            .collect::<Vec<_>>()
            .join(" and "),
        destination.display()
    );

    // Sources are fully read before the destination is truncated
    let mut lines = Vec::new();
    for source in sources {
        let source = source.as_ref();
        let file = File::open(source).map_err(|e| CorpusError::io(source, e))?;
        for line in BufReader::new(file).lines() {
            lines.push(line.map_err(|e| CorpusError::io(source, e))?);
        }
    }

    let file = File::create(destination).map_err(|e| CorpusError::io(destination, e))?;
    let mut out = BufWriter::new(file);
    for line in &lines {
        writeln!(out, "{line}").map_err(|e| CorpusError::io(destination, e))?;
    }
    out.flush().map_err(|e| CorpusError::io(destination, e))?;

    Ok(lines.len())
}

/// Copies a corpus file line by line.
pub fn copy_corpus(source: impl AsRef<Path>, destination: impl AsRef<Path>) -> Result<usize> {
    concatenate(&[source.as_ref()], destination)
}
