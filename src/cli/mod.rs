//! # CLI Module
//!
//! Command-line interface for the perceptual-hash pipeline.
//!
//! ## Usage
//! ```bash
//! # Hash every image under a directory into a database
//! phash-pipeline hash ~/Photos --db hashes.db
//!
//! # With a larger worker pool
//! phash-pipeline hash ~/Photos --pool-size 8
//!
//! # Find visually similar images among previously hashed ones
//! phash-pipeline similar --db hashes.db --distance 5
//!
//! # JSON output
//! phash-pipeline similar --db hashes.db --output json
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use phash_pipeline::core::index::{similar_pairs, SimilarPair};
use phash_pipeline::core::pipeline::HashProducer;
use phash_pipeline::core::scanner::{find_images, ScanConfig};
use phash_pipeline::core::store::{HashStore, SqliteStore};
use phash_pipeline::error::{PipelineError, Result};
use phash_pipeline::events::ProgressObserver;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// phash-pipeline - Batched perceptual hashing and similarity search
#[derive(Parser, Debug)]
#[command(name = "phash-pipeline")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Hash every image under the given directories
    Hash {
        /// Directories to scan for images
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Number of worker threads
        #[arg(short, long, default_value = "2")]
        pool_size: usize,

        /// Paths per hashing job
        #[arg(short, long, default_value = "10")]
        batch_size: usize,

        /// Hash database path
        #[arg(long)]
        db: Option<PathBuf>,

        /// Include hidden files and directories
        #[arg(long)]
        include_hidden: bool,
    },

    /// Find similar images among previously hashed entries
    Similar {
        /// Maximum Hamming distance to consider similar (0-64)
        #[arg(short, long, default_value = "5")]
        distance: u32,

        /// Hash database path
        #[arg(long)]
        db: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Hash {
            paths,
            pool_size,
            batch_size,
            db,
            include_hidden,
        } => run_hash(paths, pool_size, batch_size, db, include_hidden),
        Commands::Similar {
            distance,
            db,
            output,
        } => run_similar(distance, db, output),
    }
}

fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("phash-pipeline")
        .join("hashes.db")
}

/// Drives an indicatif bar from pipeline progress notifications.
struct BarObserver {
    bar: ProgressBar,
}

impl ProgressObserver for BarObserver {
    fn on_progress(&self, processed: usize, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_position(processed as u64);
    }
}

fn run_hash(
    paths: Vec<PathBuf>,
    pool_size: usize,
    batch_size: usize,
    db: Option<PathBuf>,
    include_hidden: bool,
) -> Result<()> {
    let term = Term::stderr();
    let db_path = db.unwrap_or_else(default_db_path);
    let store = Arc::new(SqliteStore::open(&db_path)?);

    let config = ScanConfig {
        include_hidden,
        ..ScanConfig::default()
    };
    let images = find_images(&paths, &config)?;

    term.write_line(&format!(
        "{} {} images found",
        style("→").cyan(),
        style(images.len()).bold()
    ))
    .ok();

    if images.is_empty() {
        return Ok(());
    }

    let producer = HashProducer::builder()
        .store(store.clone())
        .pool_size(pool_size)
        .batch_capacity(batch_size)
        .build();

    let bar = ProgressBar::new(images.len() as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("█▓░"),
    );
    producer.add_observer(Arc::new(BarObserver { bar: bar.clone() }));

    producer.add_to_load(images);
    producer.shutdown_graceful();
    while !producer.is_terminated() {
        thread::sleep(Duration::from_millis(20));
    }
    bar.finish_and_clear();

    term.write_line(&format!(
        "{} {} of {} images hashed into {}",
        style("✓").green().bold(),
        style(producer.processed()).cyan(),
        producer.total(),
        db_path.display()
    ))
    .ok();

    Ok(())
}

fn run_similar(distance: u32, db: Option<PathBuf>, output: OutputFormat) -> Result<()> {
    if distance > 64 {
        return Err(PipelineError::Config(format!(
            "distance must be 0-64, got {distance}"
        )));
    }

    let db_path = db.unwrap_or_else(default_db_path);
    let store = SqliteStore::open(&db_path)?;
    let entries = store.entries()?;

    let pairs = similar_pairs(&entries, distance);

    match output {
        OutputFormat::Pretty => print_pretty_pairs(&pairs, entries.len(), distance),
        OutputFormat::Json => print_json_pairs(&pairs),
    }

    Ok(())
}

fn print_pretty_pairs(pairs: &[SimilarPair], total_entries: usize, distance: u32) {
    let term = Term::stdout();

    term.write_line(&format!(
        "{} {} hashed images, {} similar pairs within distance {}",
        style("✓").green().bold(),
        style(total_entries).cyan(),
        style(pairs.len()).cyan(),
        distance
    ))
    .ok();

    for pair in pairs {
        term.write_line(&format!(
            "  {} {}",
            style(format!("d={}", pair.distance)).yellow(),
            pair.first.display()
        ))
        .ok();
        term.write_line(&format!("      {}", pair.second.display())).ok();
    }
}

fn print_json_pairs(pairs: &[SimilarPair]) {
    let output = serde_json::json!({
        "pairs": pairs.iter().map(|p| {
            serde_json::json!({
                "first": p.first,
                "second": p.second,
                "distance": p.distance,
            })
        }).collect::<Vec<_>>()
    });

    println!("{}", serde_json::to_string_pretty(&output).unwrap());
}
