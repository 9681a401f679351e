//! Corpus Preparation Tool
//!
//! Materializes the WSJ seed partitions, the Brown per-genre train/test
//! split and the Brown self-training partitions without running any
//! experiment. Also reports sentence counts of arbitrary corpus files.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use selftrain_core::{
    GenreSplit, PrepareConfig, PrepareReport, SizeLadder, count_sentences, load_cutoffs,
    partition_by_ladder, prepare,
};
use std::path::PathBuf;
use tracing::info;

/// CLI arguments
#[derive(Parser)]
#[command(name = "corpus-prep")]
#[command(about = "Partition CoNLL-X corpora for self-training experiments")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Prepare a full execution directory
    Prepare {
        /// Directory receiving every generated file
        exec_dir: PathBuf,
        /// WSJ training corpus (sections 02-22)
        wsj_training: PathBuf,
        /// WSJ test corpus (section 23)
        wsj_test: PathBuf,
        /// Brown corpus root with one directory per genre
        brown_dir: PathBuf,
        /// Share of each Brown genre used for training
        #[arg(long, default_value_t = 90)]
        train_percent: u32,
        /// JSON file of precomputed Brown training cutoffs per genre
        #[arg(long, value_name = "FILE")]
        genre_cutoffs: Option<PathBuf>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write prefix partitions of one corpus file
    Ladder {
        /// Source corpus
        source: PathBuf,
        /// Output directory
        out_dir: PathBuf,
        /// Output file name prefix
        #[arg(short, long, default_value = "partition_")]
        prefix: String,
        /// Ascending sentence counts
        #[arg(required = true, num_args = 1.., value_delimiter = ',')]
        sizes: Vec<usize>,
    },
    /// Split a genre directory into training and test files
    Split {
        /// Corpus root with one directory per genre
        base_dir: PathBuf,
        /// Training output
        training: PathBuf,
        /// Test output
        test: PathBuf,
        /// Share of each genre used for training
        #[arg(long, default_value_t = 90)]
        train_percent: u32,
    },
    /// Count the sentences of corpus files
    Count {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
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

fn print_summary(report: &PrepareReport) {
    println!("WSJ partitions:");
    for (size, path) in &report.wsj_partitions.written {
        println!("  {:>6}  {}", size, path.display());
    }
    if !report.wsj_partitions.skipped.is_empty() {
        println!("  skipped: {:?}", report.wsj_partitions.skipped);
    }

    println!("Brown genres:");
    for genre in &report.brown_split.genres {
        println!(
            "  {:<6} files {:>3}  training {:>6}  test {:>5}",
            genre.genre, genre.files, genre.training, genre.test
        );
    }

    println!("Brown partitions:");
    for (size, path) in &report.brown_partitions.written {
        println!("  {:>6}  {}", size, path.display());
    }
    if !report.brown_partitions.skipped.is_empty() {
        println!("  skipped: {:?}", report.brown_partitions.skipped);
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Prepare {
            exec_dir,
            wsj_training,
            wsj_test,
            brown_dir,
            train_percent,
            genre_cutoffs,
            json,
        } => {
            let mut config = PrepareConfig::new(exec_dir, wsj_training, wsj_test, brown_dir)
                .with_train_percent(train_percent)?;
            if let Some(path) = genre_cutoffs {
                let cutoffs = load_cutoffs(&path).context("Failed to load genre cutoffs")?;
                config = config.with_genre_cutoffs(cutoffs);
            }

            let report = prepare(&config).context("Preparation failed")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_summary(&report);
            }
        }
        Commands::Ladder {
            source,
            out_dir,
            prefix,
            sizes,
        } => {
            let ladder = SizeLadder::new(sizes)?;
            std::fs::create_dir_all(&out_dir)
                .with_context(|| format!("Failed to create {}", out_dir.display()))?;
            let report = partition_by_ladder(&source, &ladder, &out_dir, &prefix)?;
            info!(
                "Wrote {} partitions, skipped {:?}",
                report.written.len(),
                report.skipped
            );
        }
        Commands::Split {
            base_dir,
            training,
            test,
            train_percent,
        } => {
            let report = GenreSplit::new(base_dir)
                .with_train_percent(train_percent)?
                .run(&training, &test)?;
            println!(
                "training {}  test {}",
                report.training_sentences(),
                report.test_sentences()
            );
        }
        Commands::Count { files } => {
            for file in files {
                let n = count_sentences(&file)
                    .with_context(|| format!("Failed to read {}", file.display()))?;
                println!("{n}\t{}", file.display());
            }
        }
    }

    Ok(())
}
