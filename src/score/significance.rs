//! Significance track: prominence signals → ten bounded components.
//!
//! Inputs are curated flags plus two external reference counts. Counts are
//! heavy-tailed, so they enter through a log saturation:
//!
//! `sat(v, cap) = ln(1 + v) / ln(1 + cap)`, clamped to `[0, 1]`
//!
//! Each component is a weighted sum whose weights add up to the component's
//! maximum, so the bound holds by construction; the final clamp only guards
//! against float drift.

use crate::domain::{AstronomicalObject, SignificanceScores, SignificanceSignals};

/// Page views at which the pageview signal saturates.
pub const PAGEVIEWS_CAP: f64 = 1_000_000.0;
/// Sitelink count at which the sitelink signal saturates.
pub const SITELINKS_CAP: f64 = 200.0;
/// Distance (ly) at which the proximity fraction halves.
const PROXIMITY_HALF_LY: f64 = 25.0;

/// Naked-eye brightness window (apparent magnitude).
const VISUAL_BRIGHTEST: f64 = -1.5;
const VISUAL_FAINTEST: f64 = 6.5;
/// Backyard-telescope window.
const ACCESS_FAINTEST: f64 = 10.0;

/// Score the significance track. Objects without signals score zero everywhere.
pub fn score_significance(obj: &AstronomicalObject) -> SignificanceScores {
    let Some(s) = obj.signals.as_ref() else {
        return SignificanceScores::default();
    };
    compute(s, obj.apparent_magnitude, obj.distance_ly)
}

fn compute(s: &SignificanceSignals, magnitude: Option<f64>, distance_ly: Option<f64>) -> SignificanceScores {
    let ancients = indicator(s.named_by_ancients);
    let active = indicator(s.active_mission);
    let planned = indicator(s.planned_mission);
    let habitable = indicator(s.habitable);
    let solar = indicator(s.solar_system);
    let pageviews = saturation(s.wikipedia_pageviews.map(|v| v as f64), PAGEVIEWS_CAP);
    let sitelinks = saturation(s.wikidata_sitelinks.map(f64::from), SITELINKS_CAP);

    let naked_eye = brightness(magnitude, VISUAL_FAINTEST);
    let telescope = brightness(magnitude, ACCESS_FAINTEST);
    let nearness = distance_ly
        .filter(|d| d.is_finite() && *d >= 0.0)
        .map(|d| 1.0 / (1.0 + d / PROXIMITY_HALF_LY))
        .unwrap_or(0.0);

    // Solar-system bodies are the visual, accessible, and nearby reference case.
    let visual = if s.solar_system { 1.0 } else { naked_eye };
    let access = if s.solar_system { 1.0 } else { telescope };
    let near = if s.solar_system { 1.0 } else { nearness };

    SignificanceScores {
        cultural_significance: bounded(
            30.0 * ancients + 20.0 * pageviews + 10.0 * sitelinks,
            SignificanceScores::CULTURAL_MAX,
        ),
        scientific_importance: bounded(
            20.0 * active + 10.0 * planned + 20.0 * sitelinks,
            SignificanceScores::SCIENTIFIC_MAX,
        ),
        historical_significance: bounded(
            25.0 * ancients + 15.0 * sitelinks,
            SignificanceScores::HISTORICAL_MAX,
        ),
        visual_impact: bounded(30.0 * visual, SignificanceScores::VISUAL_MAX),
        uniqueness: bounded(
            12.0 * habitable + 8.0 * solar + 10.0 * pageviews,
            SignificanceScores::UNIQUENESS_MAX,
        ),
        accessibility: bounded(20.0 * access, SignificanceScores::ACCESSIBILITY_MAX),
        proximity: bounded(20.0 * near, SignificanceScores::PROXIMITY_MAX),
        story_factor: bounded(
            8.0 * ancients + 6.0 * habitable + 6.0 * pageviews,
            SignificanceScores::STORY_MAX,
        ),
        active_relevance: bounded(10.0 * active + 5.0 * planned, SignificanceScores::ACTIVE_MAX),
        future_potential: bounded(9.0 * habitable + 6.0 * planned, SignificanceScores::FUTURE_MAX),
    }
}

fn indicator(flag: bool) -> f64 {
    if flag { 1.0 } else { 0.0 }
}

/// Log saturation of a count in `[0, 1]`.
pub fn saturation(count: Option<f64>, cap: f64) -> f64 {
    match count {
        Some(v) if v.is_finite() && v > 0.0 => ((1.0 + v).ln() / (1.0 + cap).ln()).clamp(0.0, 1.0),
        _ => 0.0,
    }
}

/// Linear brightness fraction between `VISUAL_BRIGHTEST` and `faintest`.
fn brightness(magnitude: Option<f64>, faintest: f64) -> f64 {
    match magnitude {
        Some(m) if m.is_finite() => ((faintest - m) / (faintest - VISUAL_BRIGHTEST)).clamp(0.0, 1.0),
        _ => 0.0,
    }
}

fn bounded(v: f64, max: f64) -> f64 {
    if v.is_finite() { v.clamp(0.0, max) } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_signals(signals: SignificanceSignals) -> AstronomicalObject {
        let mut obj = AstronomicalObject::named("X");
        obj.signals = Some(signals);
        obj
    }

    #[test]
    fn unenriched_objects_score_zero() {
        let mut obj = AstronomicalObject::named("HIP 1");
        obj.apparent_magnitude = Some(-1.0);
        obj.distance_ly = Some(4.3);
        assert_eq!(score_significance(&obj), SignificanceScores::default());
    }

    #[test]
    fn every_signal_at_saturation_hits_every_max() {
        let obj = with_signals(SignificanceSignals {
            named_by_ancients: true,
            active_mission: true,
            planned_mission: true,
            wikipedia_pageviews: Some(50_000_000),
            wikidata_sitelinks: Some(10_000),
            habitable: true,
            solar_system: true,
        });
        let s = score_significance(&obj);
        assert_eq!(s.cultural_significance, SignificanceScores::CULTURAL_MAX);
        assert_eq!(s.scientific_importance, SignificanceScores::SCIENTIFIC_MAX);
        assert_eq!(s.historical_significance, SignificanceScores::HISTORICAL_MAX);
        assert_eq!(s.visual_impact, SignificanceScores::VISUAL_MAX);
        assert_eq!(s.uniqueness, SignificanceScores::UNIQUENESS_MAX);
        assert_eq!(s.accessibility, SignificanceScores::ACCESSIBILITY_MAX);
        assert_eq!(s.proximity, SignificanceScores::PROXIMITY_MAX);
        assert_eq!(s.story_factor, SignificanceScores::STORY_MAX);
        assert_eq!(s.active_relevance, SignificanceScores::ACTIVE_MAX);
        assert_eq!(s.future_potential, SignificanceScores::FUTURE_MAX);
    }

    #[test]
    fn pageviews_raise_cultural_score_monotonically() {
        let mut prev = -1.0;
        for views in [0u64, 10, 1_000, 100_000, 1_000_000, 10_000_000] {
            let obj = with_signals(SignificanceSignals {
                wikipedia_pageviews: Some(views),
                ..SignificanceSignals::default()
            });
            let c = score_significance(&obj).cultural_significance;
            assert!(c >= prev);
            prev = c;
        }
        assert_eq!(prev, 20.0);
    }

    #[test]
    fn bright_nearby_star_scores_visual_and_proximity() {
        let mut obj = with_signals(SignificanceSignals {
            named_by_ancients: true,
            ..SignificanceSignals::default()
        });
        obj.apparent_magnitude = Some(-1.46);
        obj.distance_ly = Some(8.6);
        let s = score_significance(&obj);
        assert!(s.visual_impact > 29.0);
        assert!(s.proximity > 14.0 && s.proximity < 15.5);
        assert_eq!(s.historical_significance, 25.0);
    }

    #[test]
    fn saturation_handles_edges() {
        assert_eq!(saturation(None, 100.0), 0.0);
        assert_eq!(saturation(Some(0.0), 100.0), 0.0);
        assert_eq!(saturation(Some(100.0), 100.0), 1.0);
        assert_eq!(saturation(Some(1e12), 100.0), 1.0);
    }
}
