//! # Selftrain Core
//!
//! Corpus handling for dependency-parser self-training experiments: CoNLL-X
//! sentence reading, sentence-count partition ladders, per-genre train/test
//! splits, and preparation of the execution directory the experiments run in.
//!
//! ## Quick Start
//!
//! ```rust
//! use selftrain_core::{SentenceReader, SizeLadder};
//!
//! let corpus = "1\tHello\t_\tUH\tUH\t_\t0\troot\t_\t_\n\n1\tBye\t_\tUH\tUH\t_\t0\troot\t_\t_\n";
//! let sentences: Vec<_> = SentenceReader::new(corpus.as_bytes())
//!     .collect::<std::io::Result<_>>()
//!     .unwrap();
//! assert_eq!(sentences.len(), 2);
//!
//! assert!(SizeLadder::new(vec![2000, 1000]).is_err());
//! ```
pub mod corpus;
pub mod error;
pub mod layout;
pub mod partition;
pub mod prepare;

// Re-export primary API
pub use corpus::{CorpusFamily, CorpusRole, Sentence, SentenceReader, count_sentences};
pub use error::{CorpusError, Result};
pub use layout::ExecLayout;
pub use partition::{
    GenreCutoffs, GenreSplit, GenreSplitReport, PartitionReport, SizeLadder, concatenate,
    copy_corpus, load_cutoffs, partition_by_ladder,
};
pub use prepare::{PrepareConfig, PrepareReport, prepare};
