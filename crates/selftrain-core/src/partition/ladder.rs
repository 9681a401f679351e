//! Sentence-count-bounded prefix partitions.
//!
//! Each rung of a [`SizeLadder`] yields one file holding exactly that many
//! leading sentences of the source, so a smaller partition is always a
//! prefix of a larger one.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::corpus::{CorpusFamily, Sentence, SentenceReader};
use crate::error::{CorpusError, Result};

/// File extension shared by every corpus file in the execution directory.
pub const CONLLX_EXTENSION: &str = ".conllx";

/// A validated, strictly ascending list of partition sizes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeLadder {
    sizes: Vec<usize>,
}

impl SizeLadder {
    /// Validates and wraps a list of sentence counts.
    pub fn new(sizes: Vec<usize>) -> Result<Self> {
        if sizes.is_empty() {
            return Err(CorpusError::EmptyLadder);
        }
        if sizes.contains(&0) {
            return Err(CorpusError::ZeroSize);
        }
        if let Some(w) = sizes.windows(2).find(|w| w[0] >= w[1]) {
            return Err(CorpusError::UnorderedLadder {
                previous: w[0],
                next: w[1],
            });
        }
        Ok(Self { sizes })
    }

    /// The fixed ladder of a corpus family.
    #[must_use]
    pub fn for_family(family: CorpusFamily) -> Self {
        Self {
            sizes: family.ladder().to_vec(),
        }
    }

    #[must_use]
    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    /// The largest requested size.
    #[must_use]
    pub fn max(&self) -> usize {
        // Non-empty by construction
        self.sizes[self.sizes.len() - 1]
    }
}

/// Outcome of a ladder partitioning run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PartitionReport {
    /// Sizes that were written, with their output paths.
    pub written: Vec<(usize, PathBuf)>,
    /// Sizes the source was too short to satisfy.
    pub skipped: Vec<usize>,
    /// Number of sentences consumed from the source.
    pub sentences_read: usize,
}

/// Path of the size-`size` partition file: `<dir>/<prefix><size>.conllx`.
#[must_use]
pub fn partition_path(dir: &Path, prefix: &str, size: usize) -> PathBuf {
    dir.join(format!("{prefix}{size}{CONLLX_EXTENSION}"))
}

/// Writes one prefix partition per ladder size from `source` into `out_dir`.
///
/// Reading stops as soon as the largest size has been written. Sizes beyond
/// the source's sentence count are reported as skipped; partitions already
/// written are left untouched.
pub fn partition_by_ladder(
    source: impl AsRef<Path>,
    ladder: &SizeLadder,
    out_dir: impl AsRef<Path>,
    prefix: &str,
) -> Result<PartitionReport> {
    let source = source.as_ref();
    let out_dir = out_dir.as_ref();
    info!(
        "Partitioning {} into {} sizes (max {})",
        source.display(),
        ladder.sizes().len(),
        ladder.max()
    );

    partition_sentences(SentenceReader::open(source)?, source, ladder, out_dir, prefix)
}

/// Ladder partitioning over an already opened sentence stream of `source`.
fn partition_sentences<I>(
    mut sentences: I,
    source: &Path,
    ladder: &SizeLadder,
    out_dir: &Path,
    prefix: &str,
) -> Result<PartitionReport>
where
    I: Iterator<Item = std::io::Result<Sentence>>,
{
    let mut report = PartitionReport::default();
    let mut pending = ladder.sizes().iter().copied().peekable();
    let mut buffer = String::new();

    while let Some(&target) = pending.peek() {
        let Some(sentence) = sentences.next() else {
            break;
        };
        let sentence = sentence.map_err(|e| CorpusError::io(source, e))?;
        sentence.push_to(&mut buffer);
        report.sentences_read += 1;

        if report.sentences_read == target {
            let path = partition_path(out_dir, prefix, target);
            std::fs::write(&path, &buffer).map_err(|e| CorpusError::io(&path, e))?;
            debug!("Wrote {} sentences to {}", target, path.display());
            report.written.push((target, path));
            pending.next();
        }
    }

    report.skipped = pending.collect();
    if !report.skipped.is_empty() {
        warn!(
            "{} has only {} sentences, skipped sizes {:?}",
            source.display(),
            report.sentences_read,
            report.skipped
        );
    }

    Ok(report)
}
