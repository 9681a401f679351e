//! Self-training experiment driver.
//!
//! Prepares the execution directory from the raw corpora, then runs the
//! requested experiment against the Stanford neural dependency parser.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use selftrain_core::{PrepareConfig, load_cutoffs, prepare};
use selftrain_driver::{
    ExperimentConfig, ExperimentPlan, ResultsLog, Runner, StanfordParser, StanfordParserConfig,
};
use tracing::info;

/// CLI arguments
#[derive(Parser, Debug)]
#[command(name = "selftrain")]
#[command(about = "Partition CoNLL-X corpora and run dependency-parser self-training experiments")]
#[command(version)]
struct Cli {
    /// Directory receiving partitions, models and annotations
    exec_dir: PathBuf,

    /// WSJ training corpus (sections 02-22)
    wsj_training: PathBuf,

    /// WSJ test corpus (section 23)
    wsj_test: PathBuf,

    /// Brown corpus root with one directory per genre
    brown_dir: PathBuf,

    /// Seed corpus family (wsj or brown)
    seed: String,

    /// Test corpus family (wsj or brown)
    test: String,

    /// Word embeddings file, or "none"
    embeddings: String,

    /// Experiment type (single or batch)
    mode: String,

    /// single: <seed_size|full> [<self_training_size|full>];
    /// batch: <vary_seed_set_size|vary_self_training_size>
    #[arg(required = true, num_args = 1..=2)]
    params: Vec<String>,

    /// Reuse an already prepared execution directory
    #[arg(long)]
    skip_prepare: bool,

    /// Print the experiment plan without running it
    #[arg(long)]
    dry_run: bool,

    /// Results file (JSON lines); defaults to <exec_dir>/results.jsonl
    #[arg(long, value_name = "FILE")]
    results: Option<PathBuf>,

    /// Development set passed to every training run
    #[arg(long, value_name = "FILE")]
    dev: Option<PathBuf>,

    /// Share of each Brown genre used for training
    #[arg(long, default_value_t = 90)]
    train_percent: u32,

    /// JSON file of precomputed Brown training cutoffs per genre
    #[arg(long, value_name = "FILE")]
    genre_cutoffs: Option<PathBuf>,

    /// Java launcher
    #[arg(long, env = "SELFTRAIN_JAVA", default_value = "java")]
    java: String,

    /// Classpath holding the Stanford CoreNLP jars
    #[arg(long, env = "SELFTRAIN_CLASSPATH")]
    classpath: Option<String>,

    /// Maximum training iterations
    #[arg(long, default_value_t = 1000)]
    max_iter: u32,

    /// JVM heap size (e.g. 4g)
    #[arg(long, env = "SELFTRAIN_JVM_MEMORY")]
    jvm_memory: Option<String>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn setup_logging(verbose: bool) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

fn embeddings_path(arg: &str) -> Option<PathBuf> {
    if arg.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(PathBuf::from(arg))
    }
}

/// Preparation settings, checked before anything is written.
fn prepare_config(cli: &Cli) -> Result<PrepareConfig> {
    let mut config =
        PrepareConfig::new(&cli.exec_dir, &cli.wsj_training, &cli.wsj_test, &cli.brown_dir)
            .with_train_percent(cli.train_percent)
            .context("Invalid --train-percent")?;
    if let Some(path) = &cli.genre_cutoffs {
        let cutoffs = load_cutoffs(path).context("Failed to load genre cutoffs")?;
        config = config.with_genre_cutoffs(cutoffs);
    }
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    // Validate everything before touching the filesystem
    let config = ExperimentConfig::from_params(&cli.seed, &cli.test, &cli.mode, &cli.params)
        .context("Invalid experiment arguments")?;
    let plan = ExperimentPlan::build(config, &cli.exec_dir);
    let prepare_config = prepare_config(&cli)?;

    if cli.dry_run {
        info!("Experiment: {}", plan.config);
        for (i, stage) in plan.stages.iter().enumerate() {
            println!("{:>3}. {}", i + 1, stage);
        }
        return Ok(());
    }

    if cli.skip_prepare {
        info!("Using prepared directory {}", cli.exec_dir.display());
    } else {
        prepare(&prepare_config).context("Failed to prepare execution directory")?;
    }

    let parser = StanfordParser::new(
        StanfordParserConfig::new()
            .with_java(cli.java)
            .with_classpath(cli.classpath)
            .with_max_iter(cli.max_iter)
            .with_jvm_memory(cli.jvm_memory),
    )?;

    let results_path = cli
        .results
        .unwrap_or_else(|| cli.exec_dir.join("results.jsonl"));
    let results = ResultsLog::open(&results_path)?;

    let mut runner = Runner::new(parser)
        .with_dev(cli.dev)
        .with_embeddings(embeddings_path(&cli.embeddings))
        .with_results(results);

    let records = runner.run(&plan).context("Experiment failed")?;

    info!("Completed {} runs, results in {}", records.len(), results_path.display());
    for record in &records {
        println!(
            "{}\t{}\t{}\t{}\t{}\t{:.4}",
            record.kind,
            record.seed,
            record.eval_family,
            record.seed_size,
            record
                .self_training_size
                .map_or_else(|| "-".to_string(), |s| s.to_string()),
            record.las
        );
    }

    Ok(())
}
