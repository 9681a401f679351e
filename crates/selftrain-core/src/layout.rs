//! File names of the prepared corpora inside an execution directory.
//!
//! Later stages locate their inputs by these names, so they must not change.

use std::path::{Path, PathBuf};

use crate::corpus::CorpusFamily;
use crate::partition::{CONLLX_EXTENSION, partition_path};

/// The execution directory and the corpus files prepared in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecLayout {
    dir: PathBuf,
}

impl ExecLayout {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<dir>/<name>`
    #[must_use]
    pub fn file(&self, name: impl AsRef<Path>) -> PathBuf {
        self.dir.join(name)
    }

    /// Full training set: `<family>_training.conllx`.
    #[must_use]
    pub fn training(&self, family: CorpusFamily) -> PathBuf {
        self.file(format!("{family}_training{CONLLX_EXTENSION}"))
    }

    /// Test set: `<family>_test.conllx`.
    #[must_use]
    pub fn test(&self, family: CorpusFamily) -> PathBuf {
        self.file(format!("{family}_test{CONLLX_EXTENSION}"))
    }

    /// Prefix shared by the size partitions of a family.
    #[must_use]
    pub fn partition_prefix(family: CorpusFamily) -> String {
        format!("{family}_seed_self_training_")
    }

    /// Size partition: `<family>_seed_self_training_<size>.conllx`.
    #[must_use]
    pub fn partition(&self, family: CorpusFamily, size: usize) -> PathBuf {
        partition_path(&self.dir, &Self::partition_prefix(family), size)
    }
}
