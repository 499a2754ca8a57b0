//! Two-track scoring.
//!
//! - astrometric: measured quantities through configurable response curves
//! - significance: curated prominence signals (see `significance`)
//!
//! The tracks are additive and independent, so a well-measured but obscure star
//! and a famous but sparsely measured object both accumulate score, through
//! different channels, without any branching in the classifier.

use crate::domain::{AstrometricScores, AstronomicalObject, ScoreComponents, ScoredObject, ScoringConfig};
use crate::error::EngineError;
use crate::quality::assess_quality;
use crate::score::curve::AstrometricCurves;
use crate::tier::classify;

pub mod curve;
pub mod significance;

pub use significance::score_significance;

/// Score the astrometric track. Absent measurements score 0.
pub fn score_astrometric(obj: &AstronomicalObject, curves: &AstrometricCurves) -> AstrometricScores {
    AstrometricScores {
        distance_score: curves.distance.score(obj.distance_ly),
        magnitude_score: curves.magnitude.score(obj.apparent_magnitude),
        temperature_score: curves.temperature.score(obj.temperature_k),
        luminosity_score: curves.luminosity.score(obj.luminosity_solar),
        mass_score: curves.mass.score(obj.mass_solar),
    }
}

/// Compute every component for `obj`.
pub fn score(obj: &AstronomicalObject, curves: &AstrometricCurves) -> ScoreComponents {
    ScoreComponents {
        astrometric: score_astrometric(obj, curves),
        significance: score_significance(obj),
    }
}

/// Score, assess, and classify one object.
pub fn score_object(object: AstronomicalObject, config: &ScoringConfig) -> Result<ScoredObject, EngineError> {
    let components = score(&object, &config.curves);
    let total_score = components.total();
    let badge_tier = classify(total_score, &config.thresholds)?;
    let quality_flags = assess_quality(&object);
    let low_confidence = quality_flags.is_low_confidence(&config.quality);
    Ok(ScoredObject {
        object,
        components,
        total_score,
        badge_tier,
        quality_flags,
        low_confidence,
    })
}
