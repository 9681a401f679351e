use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CorpusError;

/// Seed-set sizes used for the Wall Street Journal corpus.
pub const WSJ_LADDER: &[usize] = &[
    1000, 2000, 3000, 4000, 5000, 7000, 10000, 13000, 16000, 20000, 25000, 30000, 35000,
];

/// Self-training sizes used for the Brown corpus.
pub const BROWN_LADDER: &[usize] = &[1000, 2000, 3000, 4000, 5000, 7000, 10000, 13000, 17000, 21000];

/// Corpus families known to the experiment layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorpusFamily {
    /// Penn Treebank Wall Street Journal sections.
    Wsj,
    /// Brown corpus, organized by genre.
    Brown,
}

impl CorpusFamily {
    /// Lowercase name used in every generated file name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Wsj => "wsj",
            Self::Brown => "brown",
        }
    }

    /// The partition sizes materialized for this family.
    #[must_use]
    pub fn ladder(self) -> &'static [usize] {
        match self {
            Self::Wsj => WSJ_LADDER,
            Self::Brown => BROWN_LADDER,
        }
    }
}

impl fmt::Display for CorpusFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CorpusFamily {
    type Err = CorpusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("wsj") {
            Ok(Self::Wsj)
        } else if s.eq_ignore_ascii_case("brown") {
            Ok(Self::Brown)
        } else {
            Err(CorpusError::UnknownFamily(s.to_string()))
        }
    }
}

/// The part a corpus file plays in an experiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorpusRole {
    Seed,
    Training,
    Test,
    SelfTraining,
}

impl fmt::Display for CorpusRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Seed => write!(f, "seed"),
            Self::Training => write!(f, "training"),
            Self::Test => write!(f, "test"),
            Self::SelfTraining => write!(f, "self-training"),
        }
    }
}
