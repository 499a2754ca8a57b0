//! Scoring configuration.
//!
//! Everything that is expected to be retuned against a realized score
//! distribution lives here rather than in constants:
//!
//! - tier thresholds
//! - the low-confidence cutoff
//! - astrometric response curves
//! - target tier fractions used when suggesting new thresholds
//!
//! The configuration is read from an optional TOML file. Every section and
//! field is optional and falls back to the defaults below.
//!
//! ```toml
//! [thresholds]
//! legendary = 290.0
//! elite = 265.0
//!
//! [quality]
//! min_flags = 3
//!
//! [curves.distance]
//! shape = "linear"
//! direction = "descending"
//! low = 0.0
//! high = 500.0
//! max = 60.0
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::Tier;
use crate::error::EngineError;
use crate::score::curve::AstrometricCurves;

/// Minimum `total_score` for each tier above `Standard`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierThresholds {
    pub legendary: f64,
    pub elite: f64,
    pub premium: f64,
    pub exceptional: f64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            legendary: 280.0,
            elite: 260.0,
            premium: 240.0,
            exceptional: 200.0,
        }
    }
}

impl TierThresholds {
    /// `(tier, minimum)` pairs, highest tier first. `Standard` is the fallback.
    pub fn ordered(&self) -> [(Tier, f64); 4] {
        [
            (Tier::Legendary, self.legendary),
            (Tier::Elite, self.elite),
            (Tier::Premium, self.premium),
            (Tier::Exceptional, self.exceptional),
        ]
    }

    /// Thresholds must be finite, non-negative, and non-increasing by rank.
    pub fn validate(&self) -> Result<(), EngineError> {
        let ordered = self.ordered();
        for (tier, min) in ordered {
            if !min.is_finite() || min < 0.0 {
                return Err(EngineError::InvalidConfig(format!(
                    "threshold for {tier} must be finite and >= 0 (got {min})"
                )));
            }
        }
        for pair in ordered.windows(2) {
            let (upper, upper_min) = pair[0];
            let (lower, lower_min) = pair[1];
            if upper_min < lower_min {
                return Err(EngineError::InvalidConfig(format!(
                    "threshold for {upper} ({upper_min}) is below {lower} ({lower_min})"
                )));
            }
        }
        Ok(())
    }
}

/// Low-confidence cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    /// Objects with fewer than this many quality flags set are low-confidence.
    pub min_flags: usize,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self { min_flags: 2 }
    }
}

/// Desired share of the batch (0..1) at or above each tier.
///
/// Used only by threshold suggestion; classification never reads these.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierTargets {
    pub legendary: f64,
    pub elite: f64,
    pub premium: f64,
    pub exceptional: f64,
}

impl Default for TierTargets {
    fn default() -> Self {
        Self {
            legendary: 0.001,
            elite: 0.005,
            premium: 0.02,
            exceptional: 0.10,
        }
    }
}

impl TierTargets {
    pub fn ordered(&self) -> [(Tier, f64); 4] {
        [
            (Tier::Legendary, self.legendary),
            (Tier::Elite, self.elite),
            (Tier::Premium, self.premium),
            (Tier::Exceptional, self.exceptional),
        ]
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        let ordered = self.ordered();
        for (tier, share) in ordered {
            if !(0.0..=1.0).contains(&share) {
                return Err(EngineError::InvalidConfig(format!(
                    "target share for {tier} must be within [0, 1] (got {share})"
                )));
            }
        }
        for pair in ordered.windows(2) {
            if pair[0].1 > pair[1].1 {
                return Err(EngineError::InvalidConfig(format!(
                    "target share for {} ({}) exceeds {} ({})",
                    pair[0].0, pair[0].1, pair[1].0, pair[1].1
                )));
            }
        }
        Ok(())
    }
}

/// A full run's scoring configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub thresholds: TierThresholds,
    pub quality: QualityConfig,
    pub curves: AstrometricCurves,
    pub targets: TierTargets,
}

impl ScoringConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, EngineError> {
        let config: ScoringConfig =
            toml::from_str(text).map_err(|e| EngineError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let text = std::fs::read_to_string(path).map_err(|e| EngineError::io(path, e))?;
        Self::from_toml_str(&text)
    }

    /// Load from `path` when given, otherwise use defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, EngineError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        self.thresholds.validate()?;
        self.curves.validate()?;
        self.targets.validate()?;
        if self.quality.min_flags > crate::domain::QualityFlags::COUNT {
            return Err(EngineError::InvalidConfig(format!(
                "quality.min_flags must be <= {} (got {})",
                crate::domain::QualityFlags::COUNT,
                self.quality.min_flags
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::curve::{CurveShape, Direction};

    #[test]
    fn empty_toml_yields_defaults() {
        let config = ScoringConfig::from_toml_str("").unwrap();
        assert_eq!(config, ScoringConfig::default());
        assert_eq!(config.thresholds.legendary, 280.0);
        assert_eq!(config.quality.min_flags, 2);
    }

    #[test]
    fn partial_sections_override_only_named_fields() {
        let text = r#"
            [thresholds]
            legendary = 300.0

            [quality]
            min_flags = 3

            [curves.distance]
            shape = "linear"
            direction = "descending"
            low = 0.0
            high = 500.0
            max = 60.0
        "#;
        let config = ScoringConfig::from_toml_str(text).unwrap();
        assert_eq!(config.thresholds.legendary, 300.0);
        assert_eq!(config.thresholds.elite, 260.0);
        assert_eq!(config.quality.min_flags, 3);
        assert_eq!(config.curves.distance.shape, CurveShape::Linear);
        assert_eq!(config.curves.distance.direction, Direction::Descending);
        assert_eq!(config.curves.magnitude, AstrometricCurves::default().magnitude);
    }

    #[test]
    fn rejects_inverted_thresholds() {
        let text = "[thresholds]\nelite = 290.0\n";
        let err = ScoringConfig::from_toml_str(text).unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_unreachable_min_flags() {
        let err = ScoringConfig::from_toml_str("[quality]\nmin_flags = 6\n").unwrap_err();
        assert!(err.to_string().contains("min_flags"));
    }
}
