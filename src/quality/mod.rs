//! Data-quality flags.
//!
//! Flags are pure presence checks on the normalized object. They feed the
//! advisory `low_confidence` marker and the coverage section of the statistics
//! summary; they never cause an object to be dropped or scored differently.

use crate::domain::{AstronomicalObject, QualityConfig, QualityFlags};

/// Presence flags for `obj`.
pub fn assess_quality(obj: &AstronomicalObject) -> QualityFlags {
    QualityFlags {
        has_proper_name: obj.proper_name.as_deref().is_some_and(|n| !n.trim().is_empty()),
        has_spectral_type: obj.spectral_type.is_some(),
        has_distance_data: obj.distance_ly.is_some(),
        has_luminosity_data: obj.luminosity_solar.is_some(),
        has_temperature_data: obj.temperature_k.is_some(),
    }
}

impl QualityFlags {
    /// True when fewer than `config.min_flags` flags are set.
    pub fn is_low_confidence(&self, config: &QualityConfig) -> bool {
        self.count_true() < config.min_flags
    }
}
