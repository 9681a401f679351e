use std::path::PathBuf;

use selftrain_core::CorpusError;
use thiserror::Error;

/// Errors raised while planning or running experiments.
#[derive(Debug, Error)]
pub enum DriverError {
    /// Corpus preparation or concatenation failed.
    #[error(transparent)]
    Corpus(#[from] CorpusError),

    /// The experiment parameters do not describe a valid experiment.
    #[error("invalid experiment arguments: {0}")]
    InvalidArguments(String),

    /// A file a run depends on does not exist.
    #[error("missing input file {0}")]
    MissingInput(PathBuf),

    /// The parser process could not be started.
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The parser process exited unsuccessfully.
    #[error("parser {step} step exited with {status}: {stderr}")]
    ParserFailed {
        step: &'static str,
        status: String,
        /// Last lines of the parser's error output.
        stderr: String,
    },

    /// Training finished without producing a model file.
    #[error("parser did not write model file {0}")]
    MissingModel(PathBuf),

    /// Evaluation output held no LAS score.
    #[error("no LAS score in parser output for {0}")]
    MissingScore(PathBuf),

    /// The score pattern failed to compile (should not happen with static patterns).
    #[error("regex compilation error: {0}")]
    RegexError(#[from] regex::Error),

    /// The results file could not be written.
    #[error("failed to write results to {path}: {source}")]
    Results {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A run record could not be serialized.
    #[error("failed to serialize run record: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type alias for driver operations.
pub type Result<T> = std::result::Result<T, DriverError>;
