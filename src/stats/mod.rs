//! Distribution statistics over a scored batch.
//!
//! This is the only stage that needs the whole collection. Its output is what a
//! recalibration loop looks at: how many objects sit in each tier, how the total
//! score is spread, which inputs were actually populated, and who is on top.

use serde::{Deserialize, Serialize};

use crate::domain::{QualityFlags, ScoredObject, Tier, ranking_order};

/// Count and share of one tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierShare {
    pub tier: Tier,
    pub count: usize,
    pub percent: f64,
}

/// Summary of `total_score`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    pub p90: f64,
    pub p99: f64,
}

/// How many objects have a property, and what share of the batch that is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coverage {
    pub name: String,
    pub count: usize,
    pub percent: f64,
}

/// Non-zero coverage and mean for one score component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentCoverage {
    pub name: String,
    pub nonzero: usize,
    pub percent: f64,
    pub mean: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopEntry {
    pub rank: usize,
    pub name: String,
    pub total_score: f64,
    pub tier: Tier,
    pub low_confidence: bool,
}

/// Everything the statistics summary reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchStats {
    pub total_objects: usize,
    pub tier_distribution: Vec<TierShare>,
    pub score_stats: Option<ScoreStats>,
    pub flag_coverage: Vec<Coverage>,
    pub low_confidence: Coverage,
    pub component_coverage: Vec<ComponentCoverage>,
    pub top: Vec<TopEntry>,
}

impl BatchStats {
    /// Compute statistics for `objects`, keeping the `top_n` highest scores.
    pub fn compute(objects: &[ScoredObject], top_n: usize) -> Self {
        let n = objects.len();

        let tier_distribution = Tier::ALL
            .iter()
            .map(|&tier| {
                let count = objects.iter().filter(|o| o.badge_tier == tier).count();
                TierShare {
                    tier,
                    count,
                    percent: percent(count, n),
                }
            })
            .collect();

        let scores: Vec<f64> = objects.iter().map(|o| o.total_score).collect();

        let flag_coverage = (0..QualityFlags::COUNT)
            .map(|i| {
                let name = QualityFlags::default().as_array()[i].0;
                let count = objects
                    .iter()
                    .filter(|o| o.quality_flags.as_array()[i].1)
                    .count();
                coverage(name, count, n)
            })
            .collect();

        let low_count = objects.iter().filter(|o| o.low_confidence).count();

        let component_coverage = component_coverage(objects);

        Self {
            total_objects: n,
            tier_distribution,
            score_stats: score_stats(&scores),
            flag_coverage,
            low_confidence: coverage("lowConfidence", low_count, n),
            component_coverage,
            top: top_entries(objects, top_n),
        }
    }

    /// Count for `tier` (0 if absent).
    pub fn tier_count(&self, tier: Tier) -> usize {
        self.tier_distribution
            .iter()
            .find(|t| t.tier == tier)
            .map(|t| t.count)
            .unwrap_or(0)
    }
}

/// Summary statistics of `scores`; `None` when empty.
pub fn score_stats(scores: &[f64]) -> Option<ScoreStats> {
    if scores.is_empty() {
        return None;
    }
    let mut sorted = scores.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();
    let nf = n as f64;

    let mean = sorted.iter().sum::<f64>() / nf;
    let variance = sorted.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / nf;
    let median = if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    };

    Some(ScoreStats {
        min: sorted[0],
        max: sorted[n - 1],
        mean,
        median,
        std_dev: variance.sqrt(),
        p90: nearest_rank(&sorted, 0.90),
        p99: nearest_rank(&sorted, 0.99),
    })
}

/// Nearest-rank percentile of ascending `sorted` (non-empty).
fn nearest_rank(sorted: &[f64], p: f64) -> f64 {
    let k = (p * sorted.len() as f64).ceil() as usize;
    sorted[k.clamp(1, sorted.len()) - 1]
}

fn component_coverage(objects: &[ScoredObject]) -> Vec<ComponentCoverage> {
    let n = objects.len();
    let names = crate::domain::ScoreComponents::default().entries().map(|(name, _)| name);
    let mut nonzero = [0usize; 15];
    let mut sums = [0.0f64; 15];
    for o in objects {
        for (i, (_, value)) in o.components.entries().into_iter().enumerate() {
            if value > 0.0 {
                nonzero[i] += 1;
            }
            sums[i] += value;
        }
    }
    names
        .iter()
        .enumerate()
        .map(|(i, name)| ComponentCoverage {
            name: name.to_string(),
            nonzero: nonzero[i],
            percent: percent(nonzero[i], n),
            mean: if n == 0 { 0.0 } else { sums[i] / n as f64 },
        })
        .collect()
}

fn top_entries(objects: &[ScoredObject], top_n: usize) -> Vec<TopEntry> {
    let mut ranked: Vec<&ScoredObject> = objects.iter().collect();
    ranked.sort_by(|a, b| ranking_order(a, b));
    ranked
        .into_iter()
        .take(top_n)
        .enumerate()
        .map(|(i, o)| TopEntry {
            rank: i + 1,
            name: o.object.name.clone(),
            total_score: o.total_score,
            tier: o.badge_tier,
            low_confidence: o.low_confidence,
        })
        .collect()
}

fn coverage(name: &str, count: usize, n: usize) -> Coverage {
    Coverage {
        name: name.to_string(),
        count,
        percent: percent(count, n),
    }
}

fn percent(count: usize, n: usize) -> f64 {
    if n == 0 { 0.0 } else { count as f64 * 100.0 / n as f64 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AstronomicalObject, ScoreComponents, TierThresholds};
    use crate::tier::classify;

    fn scored(name: &str, total: f64) -> ScoredObject {
        let mut components = ScoreComponents::default();
        components.astrometric.distance_score = total;
        ScoredObject {
            object: AstronomicalObject::named(name),
            components,
            total_score: total,
            badge_tier: classify(total, &TierThresholds::default()).unwrap(),
            quality_flags: QualityFlags {
                has_distance_data: total > 100.0,
                ..QualityFlags::default()
            },
            low_confidence: true,
        }
    }

    #[test]
    fn empty_batch() {
        let stats = BatchStats::compute(&[], 10);
        assert_eq!(stats.total_objects, 0);
        assert!(stats.score_stats.is_none());
        assert!(stats.top.is_empty());
        assert_eq!(stats.tier_distribution.len(), 5);
        assert!(stats.tier_distribution.iter().all(|t| t.count == 0 && t.percent == 0.0));
        assert_eq!(stats.low_confidence.percent, 0.0);
    }

    #[test]
    fn single_object() {
        let stats = BatchStats::compute(&[scored("Vega", 210.0)], 3);
        let s = stats.score_stats.as_ref().unwrap();
        assert_eq!((s.min, s.max, s.mean, s.median, s.std_dev), (210.0, 210.0, 210.0, 210.0, 0.0));
        assert_eq!(s.p99, 210.0);
        assert_eq!(stats.tier_count(Tier::Exceptional), 1);
        assert_eq!(stats.top.len(), 1);
        assert_eq!(stats.top[0].rank, 1);
    }

    #[test]
    fn duplicate_scores_tie_break_by_name() {
        let objects = vec![
            scored("zeta", 50.0),
            scored("Beta", 50.0),
            scored("alpha", 50.0),
            scored("omega", 75.0),
        ];
        let stats = BatchStats::compute(&objects, 10);
        let names: Vec<&str> = stats.top.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["omega", "alpha", "Beta", "zeta"]);
        let s = stats.score_stats.unwrap();
        assert_eq!(s.median, 50.0);
        assert!((s.mean - 56.25).abs() < 1e-12);
    }

    #[test]
    fn uniform_scores_distribution_sums_to_one_hundred() {
        // 1000 scores spread evenly over 0..=330.
        let objects: Vec<ScoredObject> = (0..1000)
            .map(|i| scored(&format!("obj{i:04}"), i as f64 * 330.0 / 999.0))
            .collect();
        let stats = BatchStats::compute(&objects, 5);

        let total_pct: f64 = stats.tier_distribution.iter().map(|t| t.percent).sum();
        assert!((total_pct - 100.0).abs() < 1e-9, "sum {total_pct}");
        let total_count: usize = stats.tier_distribution.iter().map(|t| t.count).sum();
        assert_eq!(total_count, 1000);

        let s = stats.score_stats.as_ref().unwrap();
        let true_max = objects.iter().map(|o| o.total_score).fold(f64::MIN, f64::max);
        assert_eq!(s.max, true_max);
        assert_eq!(s.min, 0.0);
        assert_eq!(stats.top[0].total_score, true_max);
        assert!(stats.tier_count(Tier::Legendary) > 0);
    }

    #[test]
    fn coverage_counts_flags_and_components() {
        let objects = vec![scored("a", 0.0), scored("b", 150.0), scored("c", 250.0)];
        let stats = BatchStats::compute(&objects, 1);
        let dist = stats
            .flag_coverage
            .iter()
            .find(|c| c.name == "hasDistanceData")
            .unwrap();
        assert_eq!(dist.count, 2);
        assert!((dist.percent - 200.0 / 3.0).abs() < 1e-9);

        let comp = &stats.component_coverage[0];
        assert_eq!(comp.name, "distanceScore");
        assert_eq!(comp.nonzero, 2);
        assert!((comp.mean - 400.0 / 3.0).abs() < 1e-9);
        assert_eq!(stats.low_confidence.count, 3);
    }
}
