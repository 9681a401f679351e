//! # Selftrain Driver
//!
//! Plans and runs dependency-parser self-training experiments over a
//! prepared execution directory: seed-size and self-training-size sweeps,
//! adaptation rounds that retrain on the parser's own annotations, and a
//! JSON-lines ledger of the resulting LAS scores.
//!
//! ```rust
//! use selftrain_driver::{ExperimentConfig, ExperimentPlan};
//!
//! let params = vec!["1000".to_string(), "full".to_string()];
//! let config = ExperimentConfig::from_params("wsj", "brown", "single", &params).unwrap();
//! let plan = ExperimentPlan::build(config, "exec");
//!
//! // self-training run, concatenation, self-trained run
//! assert_eq!(plan.stages.len(), 3);
//! ```
pub mod error;
pub mod experiment;
pub mod naming;
pub mod parser;
pub mod plan;
pub mod runner;

pub use error::{DriverError, Result};
pub use experiment::{Experiment, ExperimentConfig, SWEEP_SEED_SIZE, SizeSpec};
pub use naming::{ModelStage, Names, Scope};
pub use parser::{DependencyParser, StanfordParser, StanfordParserConfig, TrainedModel};
pub use plan::{ExperimentPlan, Run, RunKind, Stage};
pub use runner::{ResultsLog, RunRecord, Runner};
