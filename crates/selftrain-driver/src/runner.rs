//! Sequential execution of an [`ExperimentPlan`].

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use selftrain_core::{CorpusFamily, CorpusRole, concatenate};
use serde::Serialize;
use tracing::info;

use crate::error::{DriverError, Result};
use crate::experiment::SizeSpec;
use crate::parser::DependencyParser;
use crate::plan::{ExperimentPlan, Run, RunKind, Stage};

/// Outcome of one train/evaluate run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunRecord {
    pub kind: RunKind,
    pub seed: CorpusFamily,
    pub eval_family: CorpusFamily,
    pub seed_size: SizeSpec,
    pub self_training_size: Option<SizeSpec>,
    pub train: PathBuf,
    pub train_role: CorpusRole,
    pub eval: PathBuf,
    pub eval_role: CorpusRole,
    pub model: PathBuf,
    pub annotations: PathBuf,
    /// Labeled attachment score reported by the parser.
    pub las: f64,
    pub elapsed_secs: f64,
}

impl RunRecord {
    fn new(run: &Run, las: f64, elapsed_secs: f64) -> Self {
        Self {
            kind: run.kind,
            seed: run.seed,
            eval_family: run.eval_family,
            seed_size: run.seed_size,
            self_training_size: run.self_training_size,
            train: run.train.clone(),
            train_role: run.train_role,
            eval: run.eval.clone(),
            eval_role: run.eval_role,
            model: run.model.clone(),
            annotations: run.annotations.clone(),
            las,
            elapsed_secs,
        }
    }
}

/// Appends run records to a JSON-lines file.
pub struct ResultsLog {
    path: PathBuf,
    file: File,
}

impl ResultsLog {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| DriverError::Results {
                path: path.clone(),
                source,
            })?;
        Ok(Self { path, file })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&mut self, record: &RunRecord) -> Result<()> {
        let line = serde_json::to_string(record)?;
        writeln!(self.file, "{line}").map_err(|source| DriverError::Results {
            path: self.path.clone(),
            source,
        })
    }
}

/// Executes plan stages in order against a parser.
pub struct Runner<P> {
    parser: P,
    dev: Option<PathBuf>,
    embeddings: Option<PathBuf>,
    results: Option<ResultsLog>,
}

impl<P: DependencyParser> Runner<P> {
    pub fn new(parser: P) -> Self {
        Self {
            parser,
            dev: None,
            embeddings: None,
            results: None,
        }
    }

    /// Set a development set passed to every training call.
    pub fn with_dev(mut self, dev: Option<PathBuf>) -> Self {
        self.dev = dev;
        self
    }

    /// Set the word embeddings passed to every training call.
    pub fn with_embeddings(mut self, embeddings: Option<PathBuf>) -> Self {
        self.embeddings = embeddings;
        self
    }

    /// Record every completed run in a results file.
    pub fn with_results(mut self, results: ResultsLog) -> Self {
        self.results = Some(results);
        self
    }

    #[must_use]
    pub fn parser(&self) -> &P {
        &self.parser
    }

    /// Runs every stage of `plan`, stopping at the first failure.
    pub fn run(&mut self, plan: &ExperimentPlan) -> Result<Vec<RunRecord>> {
        info!("Running experiment {} ({} stages)", plan.config, plan.stages.len());

        let mut records = Vec::new();
        for (i, stage) in plan.stages.iter().enumerate() {
            info!("Stage {}/{}: {}", i + 1, plan.stages.len(), stage);
            match stage {
                Stage::TrainEvaluate(run) => {
                    let record = self.train_evaluate(run)?;
                    if let Some(results) = self.results.as_mut() {
                        results.append(&record)?;
                    }
                    records.push(record);
                }
                Stage::Concatenate {
                    sources,
                    destination,
                } => {
                    for source in sources {
                        require(source)?;
                    }
                    concatenate(sources.as_slice(), destination)?;
                }
            }
        }
        Ok(records)
    }

    fn train_evaluate(&mut self, run: &Run) -> Result<RunRecord> {
        require(&run.train)?;
        require(&run.eval)?;
        if let Some(embeddings) = &self.embeddings {
            require(embeddings)?;
        }

        let start = Instant::now();
        let model = self.parser.train(
            &run.train,
            self.dev.as_deref(),
            &run.model,
            self.embeddings.as_deref(),
        )?;
        let las = self.parser.evaluate(&model, &run.eval, &run.annotations)?;
        let elapsed = start.elapsed().as_secs_f64();

        info!(
            "LAS score {}: seed_set: {} {}_set: {} seed_size: {} self_training_size: {} las_score: {}",
            run.kind,
            run.seed,
            run.eval_role,
            run.eval_family,
            run.seed_size,
            run.self_training_size
                .map_or_else(|| "none".to_string(), |s| s.to_string()),
            las
        );
        Ok(RunRecord::new(run, las, elapsed))
    }
}

fn require(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(DriverError::MissingInput(path.to_path_buf()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiment::{Experiment, ExperimentConfig};
    use crate::parser::TrainedModel;
    use selftrain_core::ExecLayout;

    /// Records every call and writes a one-sentence annotation file per evaluation.
    #[derive(Default)]
    struct FakeParser {
        trained: Vec<(PathBuf, Option<PathBuf>)>,
        evaluated: Vec<(PathBuf, PathBuf)>,
    }

    impl DependencyParser for FakeParser {
        fn train(
            &mut self,
            train: &Path,
            _dev: Option<&Path>,
            model: &Path,
            embeddings: Option<&Path>,
        ) -> Result<TrainedModel> {
            self.trained
                .push((train.to_path_buf(), embeddings.map(Path::to_path_buf)));
            std::fs::write(model, "model").unwrap();
            Ok(TrainedModel::new(model))
        }

        fn evaluate(&mut self, model: &TrainedModel, test: &Path, annotations: &Path) -> Result<f64> {
            self.evaluated
                .push((model.path().to_path_buf(), test.to_path_buf()));
            std::fs::write(annotations, "1\tannotated\t_\tNN\tNN\t_\t0\troot\t_\t_\n\n").unwrap();
            Ok(80.0 + self.evaluated.len() as f64)
        }
    }

    fn prepared_dir(sizes: &[(CorpusFamily, usize)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let layout = ExecLayout::new(dir.path());
        for family in [CorpusFamily::Wsj, CorpusFamily::Brown] {
            std::fs::write(layout.training(family), "1\tfull\t_\tNN\tNN\t_\t0\troot\t_\t_\n\n").unwrap();
            std::fs::write(layout.test(family), "1\ttest\t_\tNN\tNN\t_\t0\troot\t_\t_\n\n").unwrap();
        }
        for &(family, size) in sizes {
            std::fs::write(
                layout.partition(family, size),
                format!("1\tpart{size}\t_\tNN\tNN\t_\t0\troot\t_\t_\n\n"),
            )
            .unwrap();
        }
        dir
    }

    #[test]
    fn adapt_round_concatenates_annotations() {
        let dir = prepared_dir(&[(CorpusFamily::Brown, 1000)]);
        let config = ExperimentConfig::new(
            CorpusFamily::Wsj,
            CorpusFamily::Brown,
            Experiment::Single {
                seed_size: SizeSpec::Full,
                self_training_size: Some(SizeSpec::Sentences(1000)),
            },
        );
        let plan = ExperimentPlan::build(config, dir.path());
        let results = dir.path().join("results.jsonl");

        let mut runner = Runner::new(FakeParser::default())
            .with_results(ResultsLog::open(&results).unwrap());
        let records = runner.run(&plan).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].kind, RunKind::SelfTraining);
        assert_eq!(records[0].las, 81.0);
        assert_eq!(records[1].kind, RunKind::SelfTrained);
        assert_eq!(records[1].las, 82.0);

        let combined = dir.path().join("combined_wsj_brown_seed_size_-1.conllx");
        assert_eq!(
            std::fs::read_to_string(&combined).unwrap(),
            "1\tfull\t_\tNN\tNN\t_\t0\troot\t_\t_\n\n1\tannotated\t_\tNN\tNN\t_\t0\troot\t_\t_\n\n"
        );

        let parser = runner.parser();
        assert_eq!(parser.trained[1].0, combined);
        assert_eq!(parser.evaluated[1].1, dir.path().join("brown_test.conllx"));

        let lines: Vec<serde_json::Value> = std::fs::read_to_string(&results)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["kind"], "self_training");
        assert_eq!(lines[0]["eval_role"], "self_training");
        assert_eq!(lines[1]["train_role"], "training");
        assert_eq!(lines[1]["eval_role"], "test");
        assert_eq!(lines[0]["seed_size"], "full");
        assert_eq!(lines[0]["self_training_size"], 1000);
        assert_eq!(lines[1]["las"], 82.0);
    }

    #[test]
    fn embeddings_are_forwarded() {
        let dir = prepared_dir(&[(CorpusFamily::Wsj, 1000)]);
        let embeddings = dir.path().join("en-cw.txt");
        std::fs::write(&embeddings, "the 0.1 0.2\n").unwrap();

        let config = ExperimentConfig::new(
            CorpusFamily::Wsj,
            CorpusFamily::Wsj,
            Experiment::Single {
                seed_size: SizeSpec::Sentences(1000),
                self_training_size: None,
            },
        );
        let mut runner = Runner::new(FakeParser::default()).with_embeddings(Some(embeddings.clone()));
        let records = runner.run(&ExperimentPlan::build(config, dir.path())).unwrap();

        assert_eq!(records[0].kind, RunKind::InDomain);
        assert_eq!(runner.parser().trained[0].1.as_ref(), Some(&embeddings));
    }

    #[test]
    fn missing_partition_stops_before_training() {
        let dir = prepared_dir(&[]);
        let config = ExperimentConfig::new(
            CorpusFamily::Wsj,
            CorpusFamily::Brown,
            Experiment::Single {
                seed_size: SizeSpec::Sentences(5000),
                self_training_size: None,
            },
        );
        let mut runner = Runner::new(FakeParser::default());
        let err = runner
            .run(&ExperimentPlan::build(config, dir.path()))
            .unwrap_err();

        assert!(matches!(err, DriverError::MissingInput(ref p) if p.ends_with("wsj_seed_self_training_5000.conllx")));
        assert!(runner.parser().trained.is_empty());
    }

    #[test]
    fn sweep_runs_every_stage_in_order() {
        let sizes: Vec<(CorpusFamily, usize)> = CorpusFamily::Brown
            .ladder()
            .iter()
            .map(|&n| (CorpusFamily::Brown, n))
            .chain(std::iter::once((CorpusFamily::Wsj, 10000)))
            .collect();
        let dir = prepared_dir(&sizes);
        let config = ExperimentConfig::new(
            CorpusFamily::Wsj,
            CorpusFamily::Brown,
            Experiment::VarySelfTrainingSize { seed_size: 10000 },
        );

        let mut runner = Runner::new(FakeParser::default());
        let records = runner.run(&ExperimentPlan::build(config, dir.path())).unwrap();

        assert_eq!(records.len(), CorpusFamily::Brown.ladder().len() * 2);
        assert!(dir
            .path()
            .join("combined_wsj_brown_self_training_size_21000.conllx")
            .exists());
    }
}
