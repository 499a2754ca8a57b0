//! Command-line parsing for the catalog scoring engine.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the ingestion/scoring code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::app::pipeline::DEFAULT_PROGRESS_EVERY;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "starrank", version, about = "Catalog ingestion and scoring engine")]
pub struct Cli {
    /// Only log warnings and errors (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Parse, normalize, and score a catalog; write the scored collection and statistics.
    Score(ScoreArgs),
    /// Re-tier an existing scored collection under a new configuration.
    ///
    /// Scores are not recomputed; only tiers and low-confidence flags change.
    Recalibrate(RecalibrateArgs),
    /// Print the statistics summary of an existing scored collection.
    Stats(StatsArgs),
}

#[derive(Debug, Args, Clone)]
pub struct ConfigArgs {
    /// Scoring configuration (TOML). Defaults are used when omitted.
    #[arg(long, value_name = "TOML", env = "STARRANK_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Options for `starrank score`.
#[derive(Debug, Args, Clone)]
pub struct ScoreArgs {
    /// Catalog path or http(s) URL; gzip is detected automatically.
    #[arg(short, long, value_name = "PATH|URL")]
    pub input: String,

    /// Scored collection output path.
    #[arg(short, long, default_value = "scored_objects.json")]
    pub output: PathBuf,

    /// Statistics summary path (default: output with `.stats.json`).
    #[arg(long, value_name = "PATH")]
    pub stats: Option<PathBuf>,

    /// Process only the first N parsed rows.
    #[arg(long, value_name = "N")]
    pub limit: Option<u64>,

    /// Show the top-N objects in the summary.
    #[arg(long, default_value_t = 20)]
    pub top: usize,

    /// Significance signals keyed by object name (JSON).
    #[arg(long, value_name = "JSON")]
    pub enrichment: Option<PathBuf>,

    /// Log progress every N rows when no limit is given.
    #[arg(long, value_name = "N", default_value_t = DEFAULT_PROGRESS_EVERY)]
    pub progress_every: u64,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Options for `starrank recalibrate`.
#[derive(Debug, Args, Clone)]
pub struct RecalibrateArgs {
    /// Scored collection produced by `starrank score`.
    #[arg(short, long, value_name = "JSON")]
    pub input: PathBuf,

    /// Write the re-tiered collection here (nothing is written when omitted).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[arg(long, default_value_t = 20)]
    pub top: usize,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Options for `starrank stats`.
#[derive(Debug, Args, Clone)]
pub struct StatsArgs {
    /// Scored collection produced by `starrank score`.
    #[arg(short, long, value_name = "JSON")]
    pub input: PathBuf,

    #[arg(long, default_value_t = 20)]
    pub top: usize,
}
