//! # External Dependency Parser
//!
//! Training, parsing and scoring are delegated to an external parser. The
//! driver only needs two operations from it, captured by
//! [`DependencyParser`]. [`StanfordParser`] runs the Stanford neural
//! dependency parser as a child process.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use regex::Regex;
use tracing::{debug, info};

use crate::error::{DriverError, Result};

/// Main class of the Stanford neural dependency parser.
pub const STANFORD_MAIN_CLASS: &str = "edu.stanford.nlp.parser.nndep.DependencyParser";

/// Lines of parser error output kept in failure messages.
const STDERR_TAIL_LINES: usize = 20;

/// A model written by [`DependencyParser::train`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainedModel {
    path: PathBuf,
}

impl TrainedModel {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// The external train/evaluate collaborator.
pub trait DependencyParser {
    /// Trains a model on `train`, saving it to `model`.
    fn train(
        &mut self,
        train: &Path,
        dev: Option<&Path>,
        model: &Path,
        embeddings: Option<&Path>,
    ) -> Result<TrainedModel>;

    /// Parses `test` with `model`, writes the annotations to `annotations`
    /// and returns the labeled attachment score.
    fn evaluate(&mut self, model: &TrainedModel, test: &Path, annotations: &Path) -> Result<f64>;
}

/// Configuration for the Stanford parser process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StanfordParserConfig {
    /// Java launcher.
    pub java: String,
    /// Classpath holding the CoreNLP jars.
    pub classpath: Option<String>,
    /// Maximum training iterations.
    pub max_iter: u32,
    /// JVM heap size, passed as `-Xmx<size>`.
    pub jvm_memory: Option<String>,
}

impl Default for StanfordParserConfig {
    fn default() -> Self {
        Self {
            java: "java".to_string(),
            classpath: None,
            max_iter: 1000,
            jvm_memory: None,
        }
    }
}

impl StanfordParserConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the Java launcher.
    pub fn with_java(mut self, java: impl Into<String>) -> Self {
        self.java = java.into();
        self
    }

    /// Set the classpath.
    pub fn with_classpath(mut self, classpath: Option<String>) -> Self {
        self.classpath = classpath;
        self
    }

    /// Set the maximum number of training iterations.
    pub fn with_max_iter(mut self, max_iter: u32) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the JVM heap size.
    pub fn with_jvm_memory(mut self, memory: Option<String>) -> Self {
        self.jvm_memory = memory;
        self
    }
}

/// Runs the Stanford neural dependency parser through `java`.
pub struct StanfordParser {
    config: StanfordParserConfig,
    las_pattern: Regex,
}

impl StanfordParser {
    pub fn new(config: StanfordParserConfig) -> Result<Self> {
        Ok(Self {
            config,
            las_pattern: Regex::new(r"\bLAS\s*[=:]\s*([0-9]+(?:\.[0-9]+)?)")?,
        })
    }

    #[must_use]
    pub fn config(&self) -> &StanfordParserConfig {
        &self.config
    }

    fn base_command(&self) -> Command {
        let mut cmd = Command::new(&self.config.java);
        if let Some(memory) = &self.config.jvm_memory {
            cmd.arg(format!("-Xmx{memory}"));
        }
        if let Some(classpath) = &self.config.classpath {
            cmd.arg("-cp").arg(classpath);
        }
        cmd.arg(STANFORD_MAIN_CLASS);
        cmd
    }

    /// The training invocation.
    pub fn train_command(
        &self,
        train: &Path,
        dev: Option<&Path>,
        model: &Path,
        embeddings: Option<&Path>,
    ) -> Command {
        let mut cmd = self.base_command();
        cmd.arg("-trainFile").arg(train);
        if let Some(dev) = dev {
            cmd.arg("-devFile").arg(dev);
        }
        cmd.arg("-model").arg(model);
        if let Some(embeddings) = embeddings {
            cmd.arg("-embedFile").arg(embeddings);
        }
        cmd.arg("-maxIter").arg(self.config.max_iter.to_string());
        cmd
    }

    /// The evaluation invocation.
    pub fn evaluate_command(&self, model: &Path, test: &Path, annotations: &Path) -> Command {
        let mut cmd = self.base_command();
        cmd.arg("-model")
            .arg(model)
            .arg("-testFile")
            .arg(test)
            .arg("-outFile")
            .arg(annotations);
        cmd
    }

    /// Extracts the last LAS score printed by the parser.
    #[must_use]
    pub fn parse_las(&self, output: &str) -> Option<f64> {
        self.las_pattern
            .captures_iter(output)
            .filter_map(|c| c.get(1)?.as_str().parse().ok())
            .last()
    }

    fn execute(&self, mut cmd: Command, step: &'static str) -> Result<Output> {
        debug!("Running {:?}", cmd);
        let output = cmd.output().map_err(|source| DriverError::Spawn {
            program: self.config.java.clone(),
            source,
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let lines: Vec<&str> = stderr.lines().collect();
            let tail = lines[lines.len().saturating_sub(STDERR_TAIL_LINES)..].join("\n");
            return Err(DriverError::ParserFailed {
                step,
                status: output.status.to_string(),
                stderr: tail,
            });
        }
        Ok(output)
    }
}

impl DependencyParser for StanfordParser {
    fn train(
        &mut self,
        train: &Path,
        dev: Option<&Path>,
        model: &Path,
        embeddings: Option<&Path>,
    ) -> Result<TrainedModel> {
        info!("Training over {} into model {}", train.display(), model.display());
        self.execute(self.train_command(train, dev, model, embeddings), "train")?;

        if !model.exists() {
            return Err(DriverError::MissingModel(model.to_path_buf()));
        }
        Ok(TrainedModel::new(model))
    }

    fn evaluate(&mut self, model: &TrainedModel, test: &Path, annotations: &Path) -> Result<f64> {
        info!(
            "Testing {} on {}, annotations to {}",
            model.path().display(),
            test.display(),
            annotations.display()
        );
        let output = self.execute(self.evaluate_command(model.path(), test, annotations), "test")?;

        // The parser logs its scores to stderr; stdout is checked too
        let text = format!(
            "{}\n{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        self.parse_las(&text)
            .ok_or_else(|| DriverError::MissingScore(test.to_path_buf()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    fn args(cmd: &Command) -> Vec<&OsStr> {
        cmd.get_args().collect()
    }

    fn parser(config: StanfordParserConfig) -> StanfordParser {
        StanfordParser::new(config).unwrap()
    }

    #[test]
    fn train_command_layout() {
        let p = parser(
            StanfordParserConfig::new()
                .with_classpath(Some("corenlp/*".into()))
                .with_jvm_memory(Some("4g".into())),
        );
        let cmd = p.train_command(
            Path::new("wsj_training.conllx"),
            None,
            Path::new("model_wsj_brown"),
            Some(Path::new("en-cw.txt")),
        );
        assert_eq!(cmd.get_program(), "java");
        assert_eq!(
            args(&cmd),
            [
                "-Xmx4g",
                "-cp",
                "corenlp/*",
                STANFORD_MAIN_CLASS,
                "-trainFile",
                "wsj_training.conllx",
                "-model",
                "model_wsj_brown",
                "-embedFile",
                "en-cw.txt",
                "-maxIter",
                "1000",
            ]
        );
    }

    #[test]
    fn train_command_with_dev_set() {
        let p = parser(StanfordParserConfig::new().with_max_iter(20));
        let cmd = p.train_command(
            Path::new("train"),
            Some(Path::new("dev")),
            Path::new("model"),
            None,
        );
        assert_eq!(
            args(&cmd),
            [
                STANFORD_MAIN_CLASS,
                "-trainFile",
                "train",
                "-devFile",
                "dev",
                "-model",
                "model",
                "-maxIter",
                "20",
            ]
        );
    }

    #[test]
    fn evaluate_command_layout() {
        let p = parser(StanfordParserConfig::new().with_java("/opt/jdk/bin/java"));
        let cmd = p.evaluate_command(Path::new("m"), Path::new("t.conllx"), Path::new("o.conllx"));
        assert_eq!(cmd.get_program(), "/opt/jdk/bin/java");
        assert_eq!(
            args(&cmd),
            [STANFORD_MAIN_CLASS, "-model", "m", "-testFile", "t.conllx", "-outFile", "o.conllx"]
        );
    }

    #[test]
    fn extracts_last_las_score() {
        let p = parser(StanfordParserConfig::default());
        let log = "Loading depparse model file: model_wsj_brown ...\n\
                   UAS = 84.1176\n\
                   LAS = 81.5294\n";
        assert_eq!(p.parse_las(log), Some(81.5294));
        assert_eq!(p.parse_las("LAS: 70.5\nLAS = 71"), Some(71.0));
        assert_eq!(p.parse_las("UAS = 84.1"), None);
        assert_eq!(p.parse_las("CLASS = 3"), None);
    }

    #[test]
    fn missing_launcher_is_a_spawn_error() {
        let mut p = parser(StanfordParserConfig::new().with_java("/nonexistent/selftrain-java"));
        let dir = tempfile::tempdir().unwrap();
        let err = p
            .train(
                &dir.path().join("train"),
                None,
                &dir.path().join("model"),
                None,
            )
            .unwrap_err();
        assert!(matches!(err, DriverError::Spawn { .. }));
    }

    #[cfg(unix)]
    mod process {
        use super::*;
        use std::os::unix::fs::PermissionsExt;

        /// Writes an executable shell script standing in for `java`.
        fn fake_java(dir: &Path, body: &str) -> StanfordParser {
            let path = dir.join("java");
            std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            parser(StanfordParserConfig::new().with_java(path.to_string_lossy()))
        }

        const WRITE_MODEL: &str = r#"while [ $# -gt 0 ]; do
  if [ "$1" = "-model" ]; then echo model > "$2"; fi
  shift
done"#;

        #[test]
        fn nonzero_exit_keeps_stderr_tail() {
            let dir = tempfile::tempdir().unwrap();
            let mut p = fake_java(
                dir.path(),
                r#"i=1
while [ $i -le 30 ]; do echo "line $i" >&2; i=$((i+1)); done
exit 1"#,
            );
            let err = p
                .train(&dir.path().join("train"), None, &dir.path().join("model"), None)
                .unwrap_err();

            match err {
                DriverError::ParserFailed { step, stderr, .. } => {
                    assert_eq!(step, "train");
                    let lines: Vec<&str> = stderr.lines().collect();
                    assert_eq!(lines.len(), STDERR_TAIL_LINES);
                    assert_eq!(lines[0], "line 11");
                    assert_eq!(lines[lines.len() - 1], "line 30");
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        #[test]
        fn success_without_model_file() {
            let dir = tempfile::tempdir().unwrap();
            let mut p = fake_java(dir.path(), "exit 0");
            let model = dir.path().join("model_wsj_brown");
            let err = p.train(&dir.path().join("train"), None, &model, None).unwrap_err();
            assert!(matches!(err, DriverError::MissingModel(ref m) if *m == model));
        }

        #[test]
        fn training_returns_written_model() {
            let dir = tempfile::tempdir().unwrap();
            let mut p = fake_java(dir.path(), WRITE_MODEL);
            let model = dir.path().join("model_wsj_wsj");
            let trained = p.train(&dir.path().join("train"), None, &model, None).unwrap();
            assert_eq!(trained.path(), model);
        }

        #[test]
        fn evaluation_without_score() {
            let dir = tempfile::tempdir().unwrap();
            let mut p = fake_java(dir.path(), "echo 'UAS = 84.1' >&2");
            let test = dir.path().join("brown_test.conllx");
            let err = p
                .evaluate(&TrainedModel::new(dir.path().join("m")), &test, &dir.path().join("out"))
                .unwrap_err();
            assert!(matches!(err, DriverError::MissingScore(ref t) if *t == test));
        }

        #[test]
        fn evaluation_reads_las_from_stderr() {
            let dir = tempfile::tempdir().unwrap();
            let mut p = fake_java(dir.path(), "echo 'UAS = 84.1' >&2\necho 'LAS = 81.5' >&2");
            let las = p
                .evaluate(
                    &TrainedModel::new(dir.path().join("m")),
                    &dir.path().join("t"),
                    &dir.path().join("out"),
                )
                .unwrap();
            assert_eq!(las, 81.5);
        }
    }
}
