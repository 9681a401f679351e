//! # Selftrain
//!
//! Corpus partitioning and self-training experiment sweeps for an external
//! dependency parser. [`selftrain_core`] prepares the corpora,
//! [`selftrain_driver`] plans and runs the experiments.

pub use selftrain_core;
pub use selftrain_driver;

pub use selftrain_core::{CorpusFamily, PrepareConfig, SizeLadder, prepare};
pub use selftrain_driver::{
    DependencyParser, ExperimentConfig, ExperimentPlan, Runner, StanfordParser,
};
