//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - produced in parallel during a batch run
//! - exported to JSON for the storage collaborator
//! - reloaded later for recalibration without re-running the pipeline

use serde::{Deserialize, Serialize};

/// Light-years per parsec.
pub const LY_PER_PARSEC: f64 = 3.2616;

/// Cross-identifications carried by a catalog row.
///
/// Numeric identifiers are `None` when the row is not in that catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogIds {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hip: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hd: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hr: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gliese: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bayer_flamsteed: Option<String>,
}

impl CatalogIds {
    /// Designations in resolution order (HIP, HD, HR, Gliese, Bayer/Flamsteed).
    pub fn designations(&self) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(hip) = self.hip {
            out.push(format!("HIP {hip}"));
        }
        if let Some(hd) = self.hd {
            out.push(format!("HD {hd}"));
        }
        if let Some(hr) = self.hr {
            out.push(format!("HR {hr}"));
        }
        if let Some(gl) = &self.gliese {
            // Exports usually carry the prefix already ("Gl 551", "GJ 1002", "NN 3618").
            if gl.starts_with(|c: char| c.is_ascii_digit()) {
                out.push(format!("Gl {gl}"));
            } else {
                out.push(gl.clone());
            }
        }
        if let Some(bf) = &self.bayer_flamsteed {
            out.push(bf.clone());
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.hip.is_none()
            && self.hd.is_none()
            && self.hr.is_none()
            && self.gliese.is_none()
            && self.bayer_flamsteed.is_none()
    }
}

/// Curated prominence signals supplied by the enrichment collaborator.
///
/// Only named/famous objects carry these. Their absence is normal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SignificanceSignals {
    pub named_by_ancients: bool,
    pub active_mission: bool,
    pub planned_mission: bool,
    pub wikipedia_pageviews: Option<u64>,
    pub wikidata_sitelinks: Option<u32>,
    pub habitable: bool,
    pub solar_system: bool,
}

impl SignificanceSignals {
    /// True when no signal is set.
    pub fn is_blank(&self) -> bool {
        *self == SignificanceSignals::default()
    }
}

/// A catalog row after normalization.
///
/// Numeric fields are either a finite measurement or `None`; sentinel values from
/// the source catalog never survive normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AstronomicalObject {
    /// Display name, unique within a batch.
    pub name: String,
    /// Catalog row identifier, used to disambiguate duplicate names.
    pub source_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proper_name: Option<String>,
    #[serde(default)]
    pub catalog_ids: CatalogIds,

    pub distance_ly: Option<f64>,
    /// Apparent visual magnitude (signed; brighter is smaller).
    pub apparent_magnitude: Option<f64>,
    /// Absolute visual magnitude (signed).
    pub absolute_magnitude: Option<f64>,
    pub temperature_k: Option<f64>,
    pub luminosity_solar: Option<f64>,
    pub mass_solar: Option<f64>,
    pub spectral_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signals: Option<SignificanceSignals>,
}

impl AstronomicalObject {
    /// A bare object with only a name; every measurement absent.
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            source_id: name.clone(),
            name,
            proper_name: None,
            catalog_ids: CatalogIds::default(),
            distance_ly: None,
            apparent_magnitude: None,
            absolute_magnitude: None,
            temperature_k: None,
            luminosity_solar: None,
            mass_solar: None,
            spectral_type: None,
            signals: None,
        }
    }
}

/// Components derived from measured physical quantities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AstrometricScores {
    pub distance_score: f64,
    pub magnitude_score: f64,
    pub temperature_score: f64,
    pub luminosity_score: f64,
    pub mass_score: f64,
}

impl AstrometricScores {
    pub fn sum(&self) -> f64 {
        self.distance_score
            + self.magnitude_score
            + self.temperature_score
            + self.luminosity_score
            + self.mass_score
    }
}

/// Components derived from cultural, historical, and scientific prominence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignificanceScores {
    pub cultural_significance: f64,
    pub scientific_importance: f64,
    pub historical_significance: f64,
    pub visual_impact: f64,
    pub uniqueness: f64,
    pub accessibility: f64,
    pub proximity: f64,
    pub story_factor: f64,
    pub active_relevance: f64,
    pub future_potential: f64,
}

impl SignificanceScores {
    pub const CULTURAL_MAX: f64 = 60.0;
    pub const SCIENTIFIC_MAX: f64 = 50.0;
    pub const HISTORICAL_MAX: f64 = 40.0;
    pub const VISUAL_MAX: f64 = 30.0;
    pub const UNIQUENESS_MAX: f64 = 30.0;
    pub const ACCESSIBILITY_MAX: f64 = 20.0;
    pub const PROXIMITY_MAX: f64 = 20.0;
    pub const STORY_MAX: f64 = 20.0;
    pub const ACTIVE_MAX: f64 = 15.0;
    pub const FUTURE_MAX: f64 = 15.0;

    /// Maxima in field order.
    pub const MAXIMA: [f64; 10] = [
        Self::CULTURAL_MAX,
        Self::SCIENTIFIC_MAX,
        Self::HISTORICAL_MAX,
        Self::VISUAL_MAX,
        Self::UNIQUENESS_MAX,
        Self::ACCESSIBILITY_MAX,
        Self::PROXIMITY_MAX,
        Self::STORY_MAX,
        Self::ACTIVE_MAX,
        Self::FUTURE_MAX,
    ];

    pub fn sum(&self) -> f64 {
        self.cultural_significance
            + self.scientific_importance
            + self.historical_significance
            + self.visual_impact
            + self.uniqueness
            + self.accessibility
            + self.proximity
            + self.story_factor
            + self.active_relevance
            + self.future_potential
    }
}

/// Both scoring tracks for one object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreComponents {
    pub astrometric: AstrometricScores,
    pub significance: SignificanceScores,
}

impl ScoreComponents {
    /// Sum of every component in both tracks.
    pub fn total(&self) -> f64 {
        self.astrometric.sum() + self.significance.sum()
    }

    /// `(name, value)` for every component, astrometric first.
    pub fn entries(&self) -> [(&'static str, f64); 15] {
        let a = &self.astrometric;
        let s = &self.significance;
        [
            ("distanceScore", a.distance_score),
            ("magnitudeScore", a.magnitude_score),
            ("temperatureScore", a.temperature_score),
            ("luminosityScore", a.luminosity_score),
            ("massScore", a.mass_score),
            ("culturalSignificance", s.cultural_significance),
            ("scientificImportance", s.scientific_importance),
            ("historicalSignificance", s.historical_significance),
            ("visualImpact", s.visual_impact),
            ("uniqueness", s.uniqueness),
            ("accessibility", s.accessibility),
            ("proximity", s.proximity),
            ("storyFactor", s.story_factor),
            ("activeRelevance", s.active_relevance),
            ("futurePotential", s.future_potential),
        ]
    }
}

/// Per-field presence indicators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityFlags {
    pub has_proper_name: bool,
    pub has_spectral_type: bool,
    pub has_distance_data: bool,
    pub has_luminosity_data: bool,
    pub has_temperature_data: bool,
}

impl QualityFlags {
    pub const COUNT: usize = 5;

    /// Number of flags that are set.
    pub fn count_true(&self) -> usize {
        self.as_array().iter().filter(|(_, v)| *v).count()
    }

    pub fn as_array(&self) -> [(&'static str, bool); Self::COUNT] {
        [
            ("hasProperName", self.has_proper_name),
            ("hasSpectralType", self.has_spectral_type),
            ("hasDistanceData", self.has_distance_data),
            ("hasLuminosityData", self.has_luminosity_data),
            ("hasTemperatureData", self.has_temperature_data),
        ]
    }
}

/// Badge tier, ordered from most to least rare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
    Legendary,
    Elite,
    Premium,
    Exceptional,
    Standard,
}

impl Tier {
    /// Every tier, highest first.
    pub const ALL: [Tier; 5] = [
        Tier::Legendary,
        Tier::Elite,
        Tier::Premium,
        Tier::Exceptional,
        Tier::Standard,
    ];

    /// Total order by rarity: `Standard = 0` .. `Legendary = 4`.
    pub fn rank(self) -> u8 {
        match self {
            Tier::Legendary => 4,
            Tier::Elite => 3,
            Tier::Premium => 2,
            Tier::Exceptional => 1,
            Tier::Standard => 0,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Tier::Legendary => "LEGENDARY",
            Tier::Elite => "ELITE",
            Tier::Premium => "PREMIUM",
            Tier::Exceptional => "EXCEPTIONAL",
            Tier::Standard => "STANDARD",
        }
    }
}

impl PartialOrd for Tier {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Tier {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Final pipeline output for one object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredObject {
    pub object: AstronomicalObject,
    pub components: ScoreComponents,
    pub total_score: f64,
    pub badge_tier: Tier,
    pub quality_flags: QualityFlags,
    pub low_confidence: bool,
}

impl ScoredObject {
    pub fn name(&self) -> &str {
        &self.object.name
    }
}

/// Ranking order: higher score first, then name ascending (case-insensitive),
/// then exact name so the order is total.
pub fn ranking_order(a: &ScoredObject, b: &ScoredObject) -> std::cmp::Ordering {
    b.total_score
        .total_cmp(&a.total_score)
        .then_with(|| {
            a.object
                .name
                .to_lowercase()
                .cmp(&b.object.name.to_lowercase())
        })
        .then_with(|| a.object.name.cmp(&b.object.name))
}
