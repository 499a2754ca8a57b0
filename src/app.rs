//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads the scoring configuration
//! - runs the batch pipeline or re-tiers an existing artifact
//! - prints reports and writes the JSON artifacts

use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use crate::cli::{Command, RecalibrateArgs, ScoreArgs, StatsArgs};
use crate::domain::{ScoredObject, ScoringConfig};
use crate::error::{AppError, EXIT_EMPTY};
use crate::io::enrichment::EnrichmentTable;
use crate::io::export::{self, ScoredCollection, StatsDocument};
use crate::io::source::CatalogLocation;
use crate::stats::BatchStats;
use crate::tier::{TierMovement, reclassify, suggest_thresholds};

pub mod pipeline;

/// Entry point for the `starrank` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    let cli = crate::cli::Cli::parse();
    crate::logging::init(cli.quiet);

    match cli.command {
        Command::Score(args) => handle_score(args),
        Command::Recalibrate(args) => handle_recalibrate(args),
        Command::Stats(args) => handle_stats(args),
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<ScoringConfig, AppError> {
    let config = ScoringConfig::load_or_default(path.map(PathBuf::as_path))?;
    if let Some(p) = path {
        info!(path = %p.display(), "loaded scoring configuration");
    }
    Ok(config)
}

fn handle_score(args: ScoreArgs) -> Result<(), AppError> {
    let config = load_config(args.config.config.as_ref())?;
    let mut enrichment = match &args.enrichment {
        Some(path) => {
            let table = EnrichmentTable::load(path)?;
            info!(entries = table.len(), path = %path.display(), "loaded enrichment");
            Some(table)
        }
        None => None,
    };

    let location = CatalogLocation::parse(&args.input);
    let options = pipeline::RunOptions {
        limit: args.limit,
        progress_every: args.progress_every,
        top_n: args.top,
    };
    let run = pipeline::run_location(&location, &config, &options, enrichment.as_mut())?;

    println!(
        "{}",
        crate::report::format_run_summary(
            &location.label(),
            &run.counters,
            &run.stats,
            &config.thresholds,
            run.suggested_thresholds.as_ref(),
        )
    );

    if run.objects.is_empty() {
        return Err(AppError::new(
            EXIT_EMPTY,
            format!("No objects were scored from '{}'; nothing written.", location.label()),
        ));
    }

    let stats_path = args
        .stats
        .clone()
        .unwrap_or_else(|| export::default_stats_path(&args.output));
    let doc = StatsDocument {
        tool: export::TOOL_NAME.to_string(),
        counters: Some(run.counters),
        thresholds: config.thresholds,
        suggested_thresholds: run.suggested_thresholds,
        stats: run.stats,
    };
    let collection = ScoredCollection::new(run.objects);
    export::write_run_artifacts(&args.output, &collection, &stats_path, &doc)?;

    println!("Wrote {} and {}", args.output.display(), stats_path.display());
    Ok(())
}

fn handle_recalibrate(args: RecalibrateArgs) -> Result<(), AppError> {
    let config = load_config(args.config.config.as_ref())?;
    let collection = export::read_collection(&args.input)?;
    let before = collection.objects;

    let after = before
        .iter()
        .map(|o| reclassify(o, &config))
        .collect::<Result<Vec<ScoredObject>, _>>()?;

    let movement = TierMovement::between(&before, &after);
    let scores: Vec<f64> = after.iter().map(|o| o.total_score).collect();
    let suggested = suggest_thresholds(&scores, &config.targets);
    let before_stats = BatchStats::compute(&before, args.top);
    let after_stats = BatchStats::compute(&after, args.top);

    println!(
        "{}",
        crate::report::format_recalibration(
            &before_stats,
            &after_stats,
            &movement,
            &config.thresholds,
            suggested.as_ref(),
        )
    );

    if let Some(path) = &args.output {
        export::write_collection(path, &ScoredCollection::new(after))?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}

fn handle_stats(args: StatsArgs) -> Result<(), AppError> {
    let collection = export::read_collection(&args.input)?;
    if collection.objects.is_empty() {
        return Err(AppError::new(
            EXIT_EMPTY,
            format!("'{}' contains no objects.", args.input.display()),
        ));
    }
    let stats = BatchStats::compute(&collection.objects, args.top);
    println!("{}", crate::report::format_stats(&stats, None));
    Ok(())
}
