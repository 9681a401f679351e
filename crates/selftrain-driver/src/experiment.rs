//! Experiment configuration and its parsing from positional parameters.

use std::fmt;
use std::str::FromStr;

use selftrain_core::CorpusFamily;
use serde::{Serialize, Serializer};

use crate::error::{DriverError, Result};

/// Seed size used while sweeping self-training sizes.
pub const SWEEP_SEED_SIZE: usize = 10000;

/// Size of a training or self-training set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeSpec {
    /// The whole prepared training file.
    Full,
    /// A prefix partition of this many sentences.
    Sentences(usize),
}

impl SizeSpec {
    /// Label used inside generated file names; the full set is written as `-1`.
    #[must_use]
    pub fn file_label(self) -> String {
        match self {
            Self::Full => "-1".to_string(),
            Self::Sentences(n) => n.to_string(),
        }
    }
}

impl fmt::Display for SizeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "full"),
            Self::Sentences(n) => write!(f, "{n}"),
        }
    }
}

impl FromStr for SizeSpec {
    type Err = DriverError;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("full") {
            return Ok(Self::Full);
        }
        match s.parse::<usize>() {
            Ok(0) => Err(DriverError::InvalidArguments(
                "size must be a positive sentence count".into(),
            )),
            Ok(n) => Ok(Self::Sentences(n)),
            Err(_) => Err(DriverError::InvalidArguments(format!(
                "size {s:?} is neither a sentence count nor \"full\""
            ))),
        }
    }
}

impl Serialize for SizeSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Full => serializer.serialize_str("full"),
            Self::Sentences(n) => serializer.serialize_u64(*n as u64),
        }
    }
}

/// Which experiment to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Experiment {
    /// One train/evaluate pass, plus an adaptation round when a
    /// self-training size is given.
    Single {
        seed_size: SizeSpec,
        self_training_size: Option<SizeSpec>,
    },
    /// Sweep the seed family's ladder.
    VarySeedSize,
    /// Sweep the test family's ladder as self-training data with a fixed seed size.
    VarySelfTrainingSize { seed_size: usize },
}

/// A fully validated experiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExperimentConfig {
    /// Family the seed (training) data comes from.
    pub seed: CorpusFamily,
    /// Family evaluated on and used for self-training.
    pub test: CorpusFamily,
    pub experiment: Experiment,
}

impl ExperimentConfig {
    pub fn new(seed: CorpusFamily, test: CorpusFamily, experiment: Experiment) -> Self {
        Self {
            seed,
            test,
            experiment,
        }
    }

    /// Validates the positional parameters of the command line.
    ///
    /// * `single <seed_size|full> [<self_training_size|full>]`
    /// * `batch <vary_seed_set_size|vary_self_training_size>`
    pub fn from_params(seed: &str, test: &str, mode: &str, params: &[String]) -> Result<Self> {
        let seed: CorpusFamily = seed.parse()?;
        let test: CorpusFamily = test.parse()?;

        let experiment = if mode.eq_ignore_ascii_case("single") {
            match params {
                [seed_size] => Experiment::Single {
                    seed_size: seed_size.parse()?,
                    self_training_size: None,
                },
                [seed_size, self_training_size] => Experiment::Single {
                    seed_size: seed_size.parse()?,
                    self_training_size: Some(self_training_size.parse()?),
                },
                _ => {
                    return Err(DriverError::InvalidArguments(format!(
                        "single expects a seed size and an optional self-training size, got {} values",
                        params.len()
                    )));
                }
            }
        } else if mode.eq_ignore_ascii_case("batch") {
            match params {
                [sweep]
                    if sweep.eq_ignore_ascii_case("vary_seed_set_size")
                        || sweep.eq_ignore_ascii_case("vary_seed_size") =>
                {
                    Experiment::VarySeedSize
                }
                [sweep] if sweep.eq_ignore_ascii_case("vary_self_training_size") => {
                    Experiment::VarySelfTrainingSize {
                        seed_size: SWEEP_SEED_SIZE,
                    }
                }
                _ => {
                    return Err(DriverError::InvalidArguments(format!(
                        "batch expects vary_seed_set_size or vary_self_training_size, got {params:?}"
                    )));
                }
            }
        } else {
            return Err(DriverError::InvalidArguments(format!(
                "unknown experiment type {mode:?}, expected single or batch"
            )));
        };

        Ok(Self::new(seed, test, experiment))
    }
}

impl fmt::Display for ExperimentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "seed_set: {} test_set: {} ", self.seed, self.test)?;
        match self.experiment {
            Experiment::Single {
                seed_size,
                self_training_size: None,
            } => write!(f, "single seed_size: {seed_size}"),
            Experiment::Single {
                seed_size,
                self_training_size: Some(st),
            } => write!(f, "single seed_size: {seed_size} self_training_size: {st}"),
            Experiment::VarySeedSize => write!(f, "batch vary_seed_set_size"),
            Experiment::VarySelfTrainingSize { seed_size } => {
                write!(f, "batch vary_self_training_size seed_size: {seed_size}")
            }
        }
    }
}
