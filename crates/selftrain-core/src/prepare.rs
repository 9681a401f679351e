//! # Execution Directory Preparation
//!
//! Materializes every corpus file the experiments read:
//!
//! 1. WSJ seed partitions from the WSJ training source
//! 2. copies of the WSJ training and test sources
//! 3. the Brown per-genre train/test split
//! 4. Brown self-training partitions from the Brown training split

use std::path::PathBuf;

use serde::Serialize;
use tracing::info;

use crate::corpus::CorpusFamily;
use crate::error::{CorpusError, Result};
use crate::layout::ExecLayout;
use crate::partition::{
    DEFAULT_TRAIN_PERCENT, GenreCutoffs, GenreSplit, GenreSplitReport, PartitionReport,
    SizeLadder, check_train_percent, copy_corpus, partition_by_ladder,
};

/// Inputs of the preparation step.
#[derive(Debug, Clone)]
pub struct PrepareConfig {
    /// Directory receiving every generated file.
    pub exec_dir: PathBuf,
    /// WSJ training source (sections 02-22).
    pub wsj_training: PathBuf,
    /// WSJ test source (section 23).
    pub wsj_test: PathBuf,
    /// Brown corpus root, one sub-directory per genre.
    pub brown_dir: PathBuf,
    /// Share of each Brown genre used for training.
    pub train_percent: u32,
    /// Precomputed Brown training cutoffs per genre.
    pub genre_cutoffs: GenreCutoffs,
}

impl PrepareConfig {
    pub fn new(
        exec_dir: impl Into<PathBuf>,
        wsj_training: impl Into<PathBuf>,
        wsj_test: impl Into<PathBuf>,
        brown_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            exec_dir: exec_dir.into(),
            wsj_training: wsj_training.into(),
            wsj_test: wsj_test.into(),
            brown_dir: brown_dir.into(),
            train_percent: DEFAULT_TRAIN_PERCENT,
            genre_cutoffs: GenreCutoffs::new(),
        }
    }

    /// Set the Brown training share, which must lie within `1..=100`.
    pub fn with_train_percent(mut self, percent: u32) -> Result<Self> {
        self.train_percent = check_train_percent(percent)?;
        Ok(self)
    }

    /// Use precomputed Brown genre cutoffs.
    pub fn with_genre_cutoffs(mut self, cutoffs: GenreCutoffs) -> Self {
        self.genre_cutoffs = cutoffs;
        self
    }

    #[must_use]
    pub fn layout(&self) -> ExecLayout {
        ExecLayout::new(&self.exec_dir)
    }
}

/// What the preparation step produced.
#[derive(Debug, Clone, Serialize)]
pub struct PrepareReport {
    pub wsj_partitions: PartitionReport,
    pub brown_split: GenreSplitReport,
    pub brown_partitions: PartitionReport,
}

/// Runs the whole preparation pipeline into `config.exec_dir`.
pub fn prepare(config: &PrepareConfig) -> Result<PrepareReport> {
    check_train_percent(config.train_percent)?;
    let layout = config.layout();

    if !layout.dir().is_dir() {
        std::fs::create_dir_all(layout.dir()).map_err(|e| CorpusError::io(layout.dir(), e))?;
        info!("Created execution directory {}", layout.dir().display());
    }

    let wsj = CorpusFamily::Wsj;
    let wsj_partitions = partition_by_ladder(
        &config.wsj_training,
        &SizeLadder::for_family(wsj),
        layout.dir(),
        &ExecLayout::partition_prefix(wsj),
    )?;

    copy_corpus(&config.wsj_training, layout.training(wsj))?;
    copy_corpus(&config.wsj_test, layout.test(wsj))?;

    let brown = CorpusFamily::Brown;
    let brown_split = GenreSplit::new(&config.brown_dir)
        .with_train_percent(config.train_percent)?
        .with_cutoffs(config.genre_cutoffs.clone())
        .run(layout.training(brown), layout.test(brown))?;

    let brown_partitions = partition_by_ladder(
        layout.training(brown),
        &SizeLadder::for_family(brown),
        layout.dir(),
        &ExecLayout::partition_prefix(brown),
    )?;

    info!(
        "Prepared {}: {} WSJ and {} Brown partitions",
        layout.dir().display(),
        wsj_partitions.written.len(),
        brown_partitions.written.len()
    );

    Ok(PrepareReport {
        wsj_partitions,
        brown_split,
        brown_partitions,
    })
}
