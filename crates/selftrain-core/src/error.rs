use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur while reading, partitioning or writing corpora.
#[derive(Debug, Error)]
pub enum CorpusError {
    /// An I/O operation on a corpus file or directory failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// The file or directory being accessed.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A size ladder was given no sizes.
    #[error("size ladder is empty")]
    EmptyLadder,

    /// A size ladder contains a zero-sentence partition.
    #[error("size ladder contains a zero size")]
    ZeroSize,

    /// A size ladder is not strictly ascending.
    #[error("size ladder is not strictly ascending: {previous} is followed by {next}")]
    UnorderedLadder {
        /// The earlier size.
        previous: usize,
        /// The offending size that does not exceed it.
        next: usize,
    },

    /// The corpus family name is neither `wsj` nor `brown`.
    #[error("unknown corpus family {0:?}, expected wsj or brown")]
    UnknownFamily(String),

    /// A precomputed cutoff names a genre with no directory.
    #[error("genre cutoff given for {0:?}, but no such genre directory exists")]
    MissingGenre(String),

    /// A path expected to be a directory is not one.
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The train percentage of a genre split is outside `1..=100`.
    #[error("train percentage must be within 1..=100, got {0}")]
    InvalidPercent(u32),

    /// A genre-cutoff file could not be decoded.
    #[error("invalid genre cutoffs in {path}: {source}")]
    Cutoffs {
        /// The cutoff file.
        path: PathBuf,
        /// The decoding error.
        #[source]
        source: serde_json::Error,
    },
}

impl CorpusError {
    /// Wraps an I/O error with the path it occurred on.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

/// Result type alias for corpus operations.
pub type Result<T> = std::result::Result<T, CorpusError>;
