//! CoNLL-X sentence reading and writing.
//!
//! A sentence is a run of non-blank lines closed by a blank line or by the
//! end of the input. Extra blank lines between sentences carry no content
//! and are dropped.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines, Write};
use std::path::Path;

use crate::error::{CorpusError, Result};

/// One annotated sentence: its token lines, without the blank separator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentence {
    lines: Vec<String>,
}

impl Sentence {
    /// Creates a sentence from its token lines.
    #[must_use]
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    /// The token lines of this sentence.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Number of token lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Writes the sentence followed by its blank separator line.
    pub fn write_to<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        for line in &self.lines {
            out.write_all(line.as_bytes())?;
            out.write_all(b"\n")?;
        }
        out.write_all(b"\n")
    }

    /// Appends the serialized sentence to a string buffer.
    pub fn push_to(&self, buf: &mut String) {
        for line in &self.lines {
            buf.push_str(line);
            buf.push('\n');
        }
        buf.push('\n');
    }
}

/// Streaming iterator over the sentences of a CoNLL-X reader.
pub struct SentenceReader<R> {
    lines: Lines<R>,
    done: bool,
}

impl<R: BufRead> SentenceReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            done: false,
        }
    }
}

impl SentenceReader<BufReader<File>> {
    /// Opens a corpus file for sentence-wise reading.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| CorpusError::io(path, e))?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> Iterator for SentenceReader<R> {
    type Item = std::io::Result<Sentence>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut current = Vec::new();
        loop {
            match self.lines.next() {
                Some(Ok(line)) => {
                    if line.is_empty() {
                        if !current.is_empty() {
                            return Some(Ok(Sentence::new(current)));
                        }
                    } else {
                        current.push(line);
                    }
                }
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e));
                }
                None => {
                    self.done = true;
                    // Last sentence may lack its trailing blank line
                    if current.is_empty() {
                        return None;
                    }
                    return Some(Ok(Sentence::new(current)));
                }
            }
        }
    }
}

/// Counts the sentences of a corpus file.
pub fn count_sentences(path: impl AsRef<Path>) -> Result<usize> {
    let path = path.as_ref();
    let mut count = 0;
    for sentence in SentenceReader::open(path)? {
        sentence.map_err(|e| CorpusError::io(path, e))?;
        count += 1;
    }
    Ok(count)
}

/// Reads every sentence of a corpus file into memory.
pub fn read_sentences(path: impl AsRef<Path>) -> Result<Vec<Sentence>> {
    let path = path.as_ref();
    SentenceReader::open(path)?
        .map(|s| s.map_err(|e| CorpusError::io(path, e)))
        .collect()
}
