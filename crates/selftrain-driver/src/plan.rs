//! # Experiment Plans
//!
//! An [`ExperimentPlan`] is the ordered list of stages an experiment
//! executes. It is computed from configuration alone, so the whole grid of
//! paths is known (and printable) before the parser is ever started.
//!
//! Every adaptation round has the same three stages:
//!
//! 1. train on seed data, annotate the self-training set
//! 2. concatenate the seed data with those annotations
//! 3. retrain on the combined file, evaluate on the test set

use std::fmt;
use std::path::PathBuf;

use selftrain_core::{CorpusFamily, CorpusRole, ExecLayout};
use serde::Serialize;

use crate::experiment::{Experiment, ExperimentConfig, SizeSpec};
use crate::naming::{ModelStage, Names, Scope};

/// What a train/evaluate run measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunKind {
    /// Trained and evaluated on the same family.
    InDomain,
    /// Trained on the seed family, evaluated on the test family.
    CrossDomain,
    /// Trained on seed data, annotating the self-training set.
    SelfTraining,
    /// Retrained on seed data plus its own annotations.
    SelfTrained,
}

impl fmt::Display for RunKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InDomain => write!(f, "in-domain"),
            Self::CrossDomain => write!(f, "cross-domain"),
            Self::SelfTraining => write!(f, "self-training"),
            Self::SelfTrained => write!(f, "self-trained"),
        }
    }
}

/// One train-then-evaluate invocation of the parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Run {
    pub kind: RunKind,
    pub seed: CorpusFamily,
    /// Family of the evaluated file.
    pub eval_family: CorpusFamily,
    pub seed_size: SizeSpec,
    pub self_training_size: Option<SizeSpec>,
    pub train: PathBuf,
    /// What the training file holds: a seed partition or a combined set.
    pub train_role: CorpusRole,
    pub eval: PathBuf,
    /// `Test` for scored runs, `SelfTraining` when annotating unlabeled data.
    pub eval_role: CorpusRole,
    pub model: PathBuf,
    pub annotations: PathBuf,
}

/// A step of an experiment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    TrainEvaluate(Run),
    Concatenate {
        sources: Vec<PathBuf>,
        destination: PathBuf,
    },
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TrainEvaluate(run) => write!(
                f,
                "{} run: train {} {} -> model {}, evaluate {} {} -> {}",
                run.kind,
                run.train_role,
                run.train.display(),
                run.model.display(),
                run.eval_role,
                run.eval.display(),
                run.annotations.display()
            ),
            Self::Concatenate {
                sources,
                destination,
            } => write!(
                f,
                "concatenate {} -> {}",
                sources
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(" + "),
                destination.display()
            ),
        }
    }
}

/// The ordered stages of one experiment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentPlan {
    pub config: ExperimentConfig,
    pub stages: Vec<Stage>,
}

impl ExperimentPlan {
    /// Computes every stage of `config` inside `exec_dir`.
    pub fn build(config: ExperimentConfig, exec_dir: impl Into<PathBuf>) -> Self {
        let names = Names::new(ExecLayout::new(exec_dir), config.seed, config.test);
        let mut builder = PlanBuilder {
            names,
            config,
            stages: Vec::new(),
        };

        match config.experiment {
            Experiment::Single {
                seed_size,
                self_training_size: None,
            } => builder.single(seed_size),
            Experiment::Single {
                seed_size,
                self_training_size: Some(self_training_size),
            } => {
                let scope = Scope::Single { seed_size };
                builder.adapt(scope, seed_size, self_training_size);
            }
            Experiment::VarySeedSize => {
                for &size in config.seed.ladder() {
                    builder.seed_sweep_step(size);
                }
            }
            Experiment::VarySelfTrainingSize { seed_size } => {
                for &size in config.test.ladder() {
                    let scope = Scope::SelfTrainingSize(size);
                    builder.adapt(scope, SizeSpec::Sentences(seed_size), SizeSpec::Sentences(size));
                }
            }
        }

        Self {
            config,
            stages: builder.stages,
        }
    }

    /// The train/evaluate runs, in execution order.
    pub fn runs(&self) -> impl Iterator<Item = &Run> {
        self.stages.iter().filter_map(|stage| match stage {
            Stage::TrainEvaluate(run) => Some(run),
            Stage::Concatenate { .. } => None,
        })
    }
}

struct PlanBuilder {
    names: Names,
    config: ExperimentConfig,
    stages: Vec<Stage>,
}

impl PlanBuilder {
    fn single(&mut self, seed_size: SizeSpec) {
        let scope = Scope::Single { seed_size };
        let (seed, test) = (self.config.seed, self.config.test);
        let kind = if seed == test {
            RunKind::InDomain
        } else {
            RunKind::CrossDomain
        };
        self.stages.push(Stage::TrainEvaluate(Run {
            kind,
            seed,
            eval_family: test,
            seed_size,
            self_training_size: None,
            train: self.names.corpus(seed, seed_size),
            train_role: CorpusRole::Seed,
            eval: self.names.test_set(test),
            eval_role: CorpusRole::Test,
            model: self.names.model(scope, test, ModelStage::Plain),
            annotations: self.names.test_annotations(scope, test),
        }));
    }

    fn seed_sweep_step(&mut self, size: usize) {
        let scope = Scope::SeedSize(size);
        let seed_size = SizeSpec::Sentences(size);
        let (seed, test) = (self.config.seed, self.config.test);

        let mut targets = vec![(RunKind::InDomain, seed)];
        // Same family on both sides would repeat the in-domain run verbatim
        if test != seed {
            targets.push((RunKind::CrossDomain, test));
        }
        for (kind, eval_family) in targets {
            self.stages.push(Stage::TrainEvaluate(Run {
                kind,
                seed,
                eval_family,
                seed_size,
                self_training_size: None,
                train: self.names.corpus(seed, seed_size),
                train_role: CorpusRole::Seed,
                eval: self.names.test_set(eval_family),
                eval_role: CorpusRole::Test,
                model: self.names.model(scope, eval_family, ModelStage::Plain),
                annotations: self.names.test_annotations(scope, eval_family),
            }));
        }

        self.adapt(scope, seed_size, SizeSpec::Full);
    }

    fn adapt(&mut self, scope: Scope, seed_size: SizeSpec, self_training_size: SizeSpec) {
        let (seed, test) = (self.config.seed, self.config.test);
        let train = self.names.corpus(seed, seed_size);
        let self_training_annotations = self.names.self_training_annotations(scope);
        let combined = self.names.combined(scope);

        self.stages.push(Stage::TrainEvaluate(Run {
            kind: RunKind::SelfTraining,
            seed,
            eval_family: test,
            seed_size,
            self_training_size: Some(self_training_size),
            train: train.clone(),
            train_role: CorpusRole::Seed,
            eval: self.names.corpus(test, self_training_size),
            eval_role: CorpusRole::SelfTraining,
            model: self.names.model(scope, test, ModelStage::Adapt),
            annotations: self_training_annotations.clone(),
        }));

        self.stages.push(Stage::Concatenate {
            sources: vec![train, self_training_annotations],
            destination: combined.clone(),
        });

        self.stages.push(Stage::TrainEvaluate(Run {
            kind: RunKind::SelfTrained,
            seed,
            eval_family: test,
            seed_size,
            self_training_size: Some(self_training_size),
            train: combined,
            train_role: CorpusRole::Training,
            eval: self.names.test_set(test),
            eval_role: CorpusRole::Test,
            model: self.names.model(scope, test, ModelStage::AdaptCombined),
            annotations: self.names.combined_test_annotations(scope),
        }));
    }
}
