//! Model and annotation file names of every experiment run.
//!
//! Names are plain string concatenations reproduced from the existing
//! experiment layout, including its irregular separators in single mode.
//! Downstream stages find files by these names only.

use std::path::PathBuf;

use selftrain_core::partition::CONLLX_EXTENSION as EXT;
use selftrain_core::{CorpusFamily, ExecLayout};

use crate::experiment::SizeSpec;

/// Which part of the experiment grid a run belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// A `single` experiment with the given seed size.
    Single { seed_size: SizeSpec },
    /// One rung of the seed-size sweep.
    SeedSize(usize),
    /// One rung of the self-training-size sweep.
    SelfTrainingSize(usize),
}

impl Scope {
    /// Tag embedded in sweep file names, `None` in single mode.
    fn tag(self) -> Option<String> {
        match self {
            Self::Single { .. } => None,
            Self::SeedSize(n) => Some(format!("seed_size_{n}")),
            Self::SelfTrainingSize(n) => Some(format!("self_training_size_{n}")),
        }
    }
}

/// Stage of a run, selecting the model-name suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelStage {
    Plain,
    Adapt,
    AdaptCombined,
}

impl ModelStage {
    fn suffix(self) -> &'static str {
        match self {
            Self::Plain => "",
            Self::Adapt => "_adapt",
            Self::AdaptCombined => "_adapt_combined",
        }
    }
}

/// Path builder for one (seed, test) pair in an execution directory.
#[derive(Debug, Clone)]
pub struct Names {
    layout: ExecLayout,
    seed: CorpusFamily,
    test: CorpusFamily,
}

impl Names {
    pub fn new(layout: ExecLayout, seed: CorpusFamily, test: CorpusFamily) -> Self {
        Self { layout, seed, test }
    }

    #[must_use]
    pub fn layout(&self) -> &ExecLayout {
        &self.layout
    }

    /// Training input of the given family and size.
    #[must_use]
    pub fn corpus(&self, family: CorpusFamily, size: SizeSpec) -> PathBuf {
        match size {
            SizeSpec::Full => self.layout.training(family),
            SizeSpec::Sentences(n) => self.layout.partition(family, n),
        }
    }

    /// Test set of a family.
    #[must_use]
    pub fn test_set(&self, family: CorpusFamily) -> PathBuf {
        self.layout.test(family)
    }

    /// Model directory for a run evaluated on `eval`.
    ///
    /// `model_<s>_<t>[suffix]` in single mode,
    /// `model_<tag>_<s>_<eval>[suffix]` in sweeps.
    #[must_use]
    pub fn model(&self, scope: Scope, eval: CorpusFamily, stage: ModelStage) -> PathBuf {
        let suffix = stage.suffix();
        let name = match scope.tag() {
            None => format!("model_{}_{}{suffix}", self.seed, eval),
            Some(tag) => format!("model_{tag}_{}_{}{suffix}", self.seed, eval),
        };
        self.layout.file(name)
    }

    /// Annotations of a test set by a model trained on seed data only.
    #[must_use]
    pub fn test_annotations(&self, scope: Scope, eval: CorpusFamily) -> PathBuf {
        let name = match scope.tag() {
            None => format!("test_set_annotations_{}_{}{EXT}", self.seed, eval),
            Some(tag) => format!("test_annotations_{tag}_{}_{}{EXT}", self.seed, eval),
        };
        self.layout.file(name)
    }

    /// Annotations of the self-training set, later merged into training data.
    #[must_use]
    pub fn self_training_annotations(&self, scope: Scope) -> PathBuf {
        let name = match scope.tag() {
            None => format!("self_train_set_annotations{}_{}{EXT}", self.seed, self.test),
            Some(tag) => format!("self_train_set_annotations_{tag}_{}_{}{EXT}", self.seed, self.test),
        };
        self.layout.file(name)
    }

    /// Training data combined with the self-training annotations.
    #[must_use]
    pub fn combined(&self, scope: Scope) -> PathBuf {
        let tag = match scope {
            Scope::Single { seed_size } => format!("seed_size_{}", seed_size.file_label()),
            _ => scope.tag().unwrap_or_default(),
        };
        self.layout
            .file(format!("combined_{}_{}_{tag}{EXT}", self.seed, self.test))
    }

    /// Test-set annotations by the model retrained on combined data.
    #[must_use]
    pub fn combined_test_annotations(&self, scope: Scope) -> PathBuf {
        let name = match scope.tag() {
            None => format!("test_set_annotations{}_{}{EXT}", self.seed, self.test),
            Some(tag) => format!("test_set_annotations_{tag}_{}_{}{EXT}", self.seed, self.test),
        };
        self.layout.file(name)
    }
}
