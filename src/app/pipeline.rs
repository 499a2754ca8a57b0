//! Shared batch pipeline used by the `score` command and the integration tests.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! parse -> normalize -> enrich -> disambiguate -> score -> rank -> aggregate
//!
//! Rows are pulled from the parser in fixed-size chunks. Normalization and
//! scoring of a chunk are parallel maps; name disambiguation runs sequentially
//! in row order between them so the output does not depend on scheduling.

use std::io::Read;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::domain::{ScoredObject, ScoringConfig, TierThresholds, ranking_order};
use crate::error::EngineError;
use crate::io::catalog::{CatalogReader, MALFORMED_WARN_LIMIT, RawRow};
use crate::io::enrichment::EnrichmentTable;
use crate::io::source::{CatalogLocation, open_source};
use crate::normalize::{NameRegistry, normalize};
use crate::score::score_object;
use crate::stats::BatchStats;
use crate::tier::suggest_thresholds;

/// Rows handed to the thread pool at a time.
pub const CHUNK_SIZE: usize = 4096;

pub const DEFAULT_PROGRESS_EVERY: u64 = 25_000;

/// Per-row outcomes of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunCounters {
    /// Data rows consumed from the catalog (including malformed ones).
    pub rows_read: u64,
    /// Rows skipped for field-count or unparsable-value problems.
    pub rows_malformed: u64,
    /// Rows without any usable designation.
    pub rows_dropped: u64,
    pub rows_scored: u64,
    pub names_disambiguated: u64,
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Stop after this many data rows, malformed ones included.
    pub limit: Option<u64>,
    /// Progress interval when no limit is given.
    pub progress_every: u64,
    pub top_n: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            limit: None,
            progress_every: DEFAULT_PROGRESS_EVERY,
            top_n: 20,
        }
    }
}

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Scored objects in ranking order.
    pub objects: Vec<ScoredObject>,
    pub stats: BatchStats,
    pub counters: RunCounters,
    /// Thresholds that would hit `config.targets` on this distribution.
    pub suggested_thresholds: Option<TierThresholds>,
}

/// Open `location` and run the full pipeline over it.
pub fn run_location(
    location: &CatalogLocation,
    config: &ScoringConfig,
    options: &RunOptions,
    enrichment: Option<&mut EnrichmentTable>,
) -> Result<RunOutput, EngineError> {
    let stream = open_source(location)?;
    info!(source = %stream.label, compressed = stream.compressed, "reading catalog");
    let reader = CatalogReader::from_stream(stream)?;
    run_batch(reader, config, options, enrichment)
}

/// Run the pipeline over an already opened catalog.
pub fn run_batch<R: Read>(
    reader: CatalogReader<R>,
    config: &ScoringConfig,
    options: &RunOptions,
    mut enrichment: Option<&mut EnrichmentTable>,
) -> Result<RunOutput, EngineError> {
    let mut reader = reader.with_row_limit(options.limit);
    let mut counters = RunCounters::default();
    let mut registry = NameRegistry::new();
    let mut objects: Vec<ScoredObject> = Vec::new();

    let progress_step = progress_step(options);
    let mut next_progress = progress_step;
    let mut normalize_issues: u64 = 0;

    loop {
        let chunk = next_chunk(&mut reader)?;
        if chunk.is_empty() {
            break;
        }

        let normalized: Vec<_> = chunk.par_iter().map(|row| (row.line(), normalize(row))).collect();

        let mut prepared = Vec::with_capacity(normalized.len());
        for (line, outcome) in normalized {
            match outcome {
                Ok(Some(obj)) => {
                    let obj = match enrichment.as_deref_mut() {
                        Some(table) => table.apply(obj),
                        None => obj,
                    };
                    let (obj, renamed) = registry.disambiguate(obj);
                    if renamed {
                        counters.names_disambiguated += 1;
                        debug!(line, name = %obj.name, "disambiguated duplicate name");
                    }
                    prepared.push(obj);
                }
                Ok(None) => {
                    counters.rows_dropped += 1;
                    debug!(line, "row has no usable designation; dropped");
                }
                Err(issue) => {
                    normalize_issues += 1;
                    let err = EngineError::RowMalformed {
                        line,
                        reason: issue.to_string(),
                    };
                    if reader.malformed_rows() + normalize_issues <= MALFORMED_WARN_LIMIT {
                        warn!("{err}");
                    } else {
                        debug!("{err}");
                    }
                }
            }
        }

        let scored: Vec<ScoredObject> = prepared
            .into_par_iter()
            .map(|obj| score_object(obj, config))
            .collect::<Result<_, _>>()?;
        debug!(rows = chunk.len(), scored = scored.len(), "chunk done");
        objects.extend(scored);

        while reader.rows_read() >= next_progress {
            report_progress(reader.rows_read(), options.limit, objects.len());
            next_progress += progress_step;
        }
    }

    counters.rows_read = reader.rows_read();
    counters.rows_malformed = reader.malformed_rows() + normalize_issues;
    counters.rows_scored = objects.len() as u64;

    objects.par_sort_by(ranking_order);

    if let Some(table) = enrichment {
        let unmatched = table.unmatched_keys();
        if !unmatched.is_empty() {
            warn!(
                count = unmatched.len(),
                first = %unmatched.iter().take(5).cloned().collect::<Vec<_>>().join(", "),
                "enrichment entries matched no object"
            );
        }
    }

    let scores: Vec<f64> = objects.iter().map(|o| o.total_score).collect();
    let suggested_thresholds = suggest_thresholds(&scores, &config.targets);
    let stats = BatchStats::compute(&objects, options.top_n);

    info!(
        rows_read = counters.rows_read,
        scored = counters.rows_scored,
        malformed = counters.rows_malformed,
        dropped = counters.rows_dropped,
        disambiguated = counters.names_disambiguated,
        "run complete"
    );

    Ok(RunOutput {
        objects,
        stats,
        counters,
        suggested_thresholds,
    })
}

/// Pull up to `CHUNK_SIZE` rows; the reader enforces the row limit.
fn next_chunk<R: Read>(reader: &mut CatalogReader<R>) -> Result<Vec<RawRow>, EngineError> {
    let mut chunk = Vec::with_capacity(CHUNK_SIZE);
    for row in reader.by_ref().take(CHUNK_SIZE) {
        chunk.push(row?);
    }
    Ok(chunk)
}

/// 5% of the limit when one is given, else the configured interval.
fn progress_step(options: &RunOptions) -> u64 {
    match options.limit {
        Some(limit) => (limit / 20).max(1),
        None => options.progress_every.max(1),
    }
}

fn report_progress(parsed: u64, limit: Option<u64>, scored: usize) {
    match limit {
        Some(limit) if limit > 0 => {
            let pct = parsed as f64 * 100.0 / limit as f64;
            info!(rows = parsed, scored, "progress {pct:.0}%");
        }
        _ => info!(rows = parsed, scored, "progress"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Tier;

    const HEADER: &str = "id,proper,hip,hd,hr,gl,bf,dist,parallax,mag,absmag,spect,lum,mass,temp\n";

    fn reader(body: &str) -> CatalogReader<std::io::Cursor<Vec<u8>>> {
        let text = format!("{HEADER}{body}");
        CatalogReader::new(std::io::Cursor::new(text.into_bytes()), false).unwrap()
    }

    fn run(body: &str, options: &RunOptions) -> RunOutput {
        run_batch(reader(body), &ScoringConfig::default(), options, None).unwrap()
    }

    #[test]
    fn rows_are_scored_ranked_and_counted() {
        let out = run(
            "1,Sirius,32349,48915,2491,,9Alp CMa,2.6371,0.379,-1.44,1.454,A0m...,22.8,2.06,9940\n\
             2,,,,,,,,,5.0,,,,,\n\
             3,,11767,8890,424,,1Alp UMi,132.6,,1.97,-3.64,F7:Ib-IIv SB,2350,5.4,6000\n\
             4,Vega,91262,172167,7001,,3Alp Lyr,7.68,,0.03,0.6,A0V,50.1,2.1,9602\n",
            &RunOptions::default(),
        );
        assert_eq!(out.counters.rows_read, 4);
        assert_eq!(out.counters.rows_dropped, 1);
        assert_eq!(out.counters.rows_scored, 3);
        assert_eq!(out.objects.len(), 3);
        for pair in out.objects.windows(2) {
            assert!(pair[0].total_score >= pair[1].total_score);
        }
        let sirius = out.objects.iter().find(|o| o.name() == "Sirius").unwrap();
        assert!(sirius.components.astrometric.distance_score > 0.0);
        assert_eq!(out.stats.total_objects, 3);
        assert!(out.suggested_thresholds.is_some());
    }

    #[test]
    fn limit_yields_prefix() {
        let body: String = (1..=50)
            .map(|i| format!("{i},,{i},,,,,{},,6.0,,G2V,1.0,1.0,5800\n", 10.0 + i as f64))
            .collect();
        let options = RunOptions {
            limit: Some(7),
            ..RunOptions::default()
        };
        let out = run(&body, &options);
        assert_eq!(out.counters.rows_read, 7);
        assert_eq!(out.objects.len(), 7);
        assert!(out.objects.iter().all(|o| o.badge_tier == Tier::Standard));
    }

    #[test]
    fn limit_counts_short_rows() {
        let out = run(
            "1,Alpha,1,,,,,10,,3.0,,,,,\n\
             2,Beta,2\n\
             3,Gamma,3,,,,,10,,4.0,,,,,\n\
             4,Delta,4,,,,,10,,5.0,,,,,\n",
            &RunOptions {
                limit: Some(3),
                ..RunOptions::default()
            },
        );
        assert_eq!(out.counters.rows_read, 3);
        assert_eq!(out.counters.rows_malformed, 1);
        let mut names: Vec<&str> = out.objects.iter().map(|o| o.name()).collect();
        names.sort();
        assert_eq!(names, vec!["Alpha", "Gamma"]);
    }

    #[test]
    fn malformed_values_are_skipped_not_fatal() {
        let out = run(
            "1,Alpha,1,,,,,10,,abc,,,,,\n\
             2,Beta,2,,,,,10,,3.0,,,,,\n\
             3,Gamma,3,,,,,10\n",
            &RunOptions::default(),
        );
        assert_eq!(out.counters.rows_malformed, 2);
        assert_eq!(out.counters.rows_scored, 1);
        assert_eq!(out.objects[0].name(), "Beta");
    }

    #[test]
    fn duplicate_names_are_disambiguated_in_row_order() {
        let out = run(
            "10,Polaris,11767,,,,,132.6,,1.97,,,,,\n\
             11,Polaris,,,,,,200,,5.0,,,,,\n",
            &RunOptions::default(),
        );
        assert_eq!(out.counters.names_disambiguated, 1);
        let mut names: Vec<&str> = out.objects.iter().map(|o| o.name()).collect();
        names.sort();
        assert_eq!(names, vec!["Polaris", "Polaris [11]"]);
    }

    #[test]
    fn progress_step_follows_limit() {
        let with_limit = RunOptions {
            limit: Some(1000),
            ..RunOptions::default()
        };
        assert_eq!(progress_step(&with_limit), 50);
        assert_eq!(progress_step(&RunOptions::default()), DEFAULT_PROGRESS_EVERY);
        let tiny = RunOptions {
            limit: Some(3),
            ..RunOptions::default()
        };
        assert_eq!(progress_step(&tiny), 1);
    }
}
