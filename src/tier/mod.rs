//! Badge tier classification and threshold recalibration.
//!
//! Classification is a pure function of the total score and a threshold table.
//! The table is configuration: after a run, `suggest_thresholds` proposes a new
//! table from the realized distribution, and `reclassify` applies a table to an
//! existing output without re-running the pipeline.

use serde::Serialize;

use crate::domain::{ScoredObject, ScoringConfig, Tier, TierTargets, TierThresholds};
use crate::error::EngineError;

/// Map a total score to its tier.
///
/// Every finite, non-negative score maps to exactly one tier. Anything else is a
/// caller bug and yields `InvalidScore`.
pub fn classify(score: f64, thresholds: &TierThresholds) -> Result<Tier, EngineError> {
    if !score.is_finite() || score < 0.0 {
        return Err(EngineError::InvalidScore(score));
    }
    Ok(thresholds
        .ordered()
        .into_iter()
        .find(|(_, min)| score >= *min)
        .map(|(tier, _)| tier)
        .unwrap_or(Tier::Standard))
}

/// Re-derive tier and confidence for an existing result under `config`.
///
/// Returns a new value; the input is left untouched so callers can diff.
pub fn reclassify(scored: &ScoredObject, config: &ScoringConfig) -> Result<ScoredObject, EngineError> {
    Ok(ScoredObject {
        badge_tier: classify(scored.total_score, &config.thresholds)?,
        low_confidence: scored.quality_flags.is_low_confidence(&config.quality),
        ..scored.clone()
    })
}

/// Propose thresholds so that roughly `targets` of `scores` land at or above
/// each tier.
///
/// Uses nearest-rank on the descending scores: the threshold for a share `p` is
/// the `ceil(p * n)`-th highest score. Ties at the threshold all qualify, so the
/// realized share can exceed the target. A share that rounds to zero objects
/// puts the threshold just above the maximum. Returns `None` for no scores.
pub fn suggest_thresholds(scores: &[f64], targets: &TierTargets) -> Option<TierThresholds> {
    let mut desc: Vec<f64> = scores.iter().copied().filter(|s| s.is_finite()).collect();
    if desc.is_empty() {
        return None;
    }
    desc.sort_by(|a, b| b.total_cmp(a));
    let n = desc.len();
    let max = desc[0];

    let pick = |share: f64| -> f64 {
        let k = (share * n as f64).ceil() as usize;
        if k == 0 {
            // Nothing should qualify.
            (max + 1.0).floor()
        } else {
            desc[k.min(n) - 1]
        }
    };

    Some(TierThresholds {
        legendary: pick(targets.legendary),
        elite: pick(targets.elite),
        premium: pick(targets.premium),
        exceptional: pick(targets.exceptional),
    })
}

/// How objects moved between tiers after a reclassification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TierMovement {
    /// `counts[from][to]`, indexed in `Tier::ALL` order (highest first).
    pub counts: [[u64; 5]; 5],
    pub promoted: u64,
    pub demoted: u64,
    pub unchanged: u64,
}

impl TierMovement {
    /// Compare two equally ordered collections pairwise.
    pub fn between(before: &[ScoredObject], after: &[ScoredObject]) -> Self {
        let mut out = TierMovement::default();
        for (b, a) in before.iter().zip(after) {
            out.counts[tier_index(b.badge_tier)][tier_index(a.badge_tier)] += 1;
            match a.badge_tier.cmp(&b.badge_tier) {
                std::cmp::Ordering::Greater => out.promoted += 1,
                std::cmp::Ordering::Less => out.demoted += 1,
                std::cmp::Ordering::Equal => out.unchanged += 1,
            }
        }
        out
    }
}

/// Position of `tier` in `Tier::ALL`.
pub fn tier_index(tier: Tier) -> usize {
    Tier::ALL.iter().position(|t| *t == tier).unwrap_or(Tier::ALL.len() - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AstronomicalObject, QualityFlags, ScoreComponents};

    fn defaults() -> TierThresholds {
        TierThresholds::default()
    }

    #[test]
    fn boundaries() {
        let t = defaults();
        assert_eq!(classify(280.0, &t).unwrap(), Tier::Legendary);
        assert_eq!(classify(279.999, &t).unwrap(), Tier::Elite);
        assert_eq!(classify(260.0, &t).unwrap(), Tier::Elite);
        assert_eq!(classify(259.99, &t).unwrap(), Tier::Premium);
        assert_eq!(classify(240.0, &t).unwrap(), Tier::Premium);
        assert_eq!(classify(239.5, &t).unwrap(), Tier::Exceptional);
        assert_eq!(classify(200.0, &t).unwrap(), Tier::Exceptional);
        assert_eq!(classify(199.9, &t).unwrap(), Tier::Standard);
        assert_eq!(classify(0.0, &t).unwrap(), Tier::Standard);
    }

    #[test]
    fn negative_and_non_finite_are_rejected() {
        let t = defaults();
        assert!(matches!(classify(-0.001, &t), Err(EngineError::InvalidScore(_))));
        assert!(matches!(classify(f64::NAN, &t), Err(EngineError::InvalidScore(_))));
        assert!(matches!(classify(f64::INFINITY, &t), Err(EngineError::InvalidScore(_))));
    }

    #[test]
    fn classification_is_monotonic() {
        let t = defaults();
        let mut prev = classify(0.0, &t).unwrap();
        let mut s = 0.0;
        while s < 400.0 {
            s += 0.25;
            let tier = classify(s, &t).unwrap();
            assert!(tier.rank() >= prev.rank(), "rank dropped at {s}");
            prev = tier;
        }
    }

    #[test]
    fn custom_thresholds_are_honored() {
        let t = TierThresholds {
            legendary: 100.0,
            elite: 90.0,
            premium: 80.0,
            exceptional: 10.0,
        };
        assert_eq!(classify(95.0, &t).unwrap(), Tier::Elite);
        assert_eq!(classify(10.0, &t).unwrap(), Tier::Exceptional);
    }

    #[test]
    fn suggested_thresholds_hit_targets_on_distinct_scores() {
        let scores: Vec<f64> = (0..1000).map(f64::from).collect();
        let targets = TierTargets {
            legendary: 0.001,
            elite: 0.01,
            premium: 0.05,
            exceptional: 0.2,
        };
        let t = suggest_thresholds(&scores, &targets).unwrap();
        assert_eq!(t.legendary, 999.0);
        assert_eq!(t.elite, 990.0);
        assert_eq!(t.premium, 950.0);
        assert_eq!(t.exceptional, 800.0);
        assert!(t.validate().is_ok());
    }

    #[test]
    fn suggest_handles_empty_and_zero_share() {
        assert_eq!(suggest_thresholds(&[], &TierTargets::default()), None);
        let targets = TierTargets {
            legendary: 0.0,
            ..TierTargets::default()
        };
        let t = suggest_thresholds(&[5.0, 3.0], &targets).unwrap();
        assert_eq!(t.legendary, 6.0);
        assert_eq!(classify(5.0, &t).unwrap(), Tier::Elite);
    }

    #[test]
    fn reclassify_returns_new_value_and_movement_is_counted() {
        let before: Vec<ScoredObject> = [150.0, 250.0, 285.0]
            .iter()
            .enumerate()
            .map(|(i, &s)| ScoredObject {
                object: AstronomicalObject::named(format!("S{i}")),
                components: ScoreComponents::default(),
                total_score: s,
                badge_tier: classify(s, &defaults()).unwrap(),
                quality_flags: QualityFlags::default(),
                low_confidence: true,
            })
            .collect();

        let config = ScoringConfig {
            thresholds: TierThresholds {
                legendary: 300.0,
                elite: 280.0,
                premium: 200.0,
                exceptional: 100.0,
            },
            ..ScoringConfig::default()
        };
        let after: Vec<ScoredObject> = before.iter().map(|s| reclassify(s, &config).unwrap()).collect();

        assert_eq!(before[1].badge_tier, Tier::Premium);
        assert_eq!(after[0].badge_tier, Tier::Exceptional);
        assert_eq!(after[1].badge_tier, Tier::Premium);
        assert_eq!(after[2].badge_tier, Tier::Elite);

        let m = TierMovement::between(&before, &after);
        assert_eq!((m.promoted, m.demoted, m.unchanged), (1, 1, 1));
        assert_eq!(m.counts[tier_index(Tier::Legendary)][tier_index(Tier::Elite)], 1);
    }
}
