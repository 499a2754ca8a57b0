//! Monotonic, bounded response curves for astrometric components.
//!
//! A curve maps a physical measurement onto `[0, max]`:
//!
//! - position `t` within `[low, high]` is computed on a linear or log axis
//! - `t` is clamped to `[0, 1]` (so the curve saturates instead of jumping)
//! - `Descending` curves use `1 - t` (closer / brighter scores higher)
//!
//! Every curve is continuous in the measurement, which keeps the realized score
//! distribution free of clustering artifacts at component boundaries.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Axis the measurement is interpolated on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveShape {
    Linear,
    Logarithmic,
}

/// Whether larger measurements score higher or lower.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Ascending,
    Descending,
}

/// A configurable response curve for one astrometric component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentCurve {
    pub shape: CurveShape,
    pub direction: Direction,
    pub low: f64,
    pub high: f64,
    /// Component maximum (score at `t = 1`).
    pub max: f64,
}

impl ComponentCurve {
    pub const fn new(shape: CurveShape, direction: Direction, low: f64, high: f64, max: f64) -> Self {
        Self {
            shape,
            direction,
            low,
            high,
            max,
        }
    }

    /// Position of `x` on the curve in `[0, 1]`, after applying direction.
    ///
    /// Non-finite inputs map to 0 regardless of direction.
    pub fn fraction(&self, x: f64) -> f64 {
        if !x.is_finite() {
            return 0.0;
        }
        let t = match self.shape {
            CurveShape::Linear => (x - self.low) / (self.high - self.low),
            CurveShape::Logarithmic => {
                if x <= self.low {
                    0.0
                } else {
                    (x.ln() - self.low.ln()) / (self.high.ln() - self.low.ln())
                }
            }
        };
        let t = t.clamp(0.0, 1.0);
        match self.direction {
            Direction::Ascending => t,
            Direction::Descending => 1.0 - t,
        }
    }

    /// Component score for an optional measurement. Absent scores 0.
    pub fn score(&self, x: Option<f64>) -> f64 {
        match x {
            Some(v) if v.is_finite() => (self.max * self.fraction(v)).clamp(0.0, self.max),
            _ => 0.0,
        }
    }

    /// Reject curves that cannot produce a bounded, monotonic mapping.
    pub fn validate(&self, name: &str) -> Result<(), EngineError> {
        let finite = self.low.is_finite() && self.high.is_finite() && self.max.is_finite();
        if !finite || self.high <= self.low {
            return Err(EngineError::InvalidConfig(format!(
                "curve `{name}` needs finite low < high (got {} .. {})",
                self.low, self.high
            )));
        }
        if self.max < 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "curve `{name}` has negative max {}",
                self.max
            )));
        }
        if self.shape == CurveShape::Logarithmic && self.low <= 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "logarithmic curve `{name}` needs low > 0 (got {})",
                self.low
            )));
        }
        Ok(())
    }
}

/// One curve per astrometric component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AstrometricCurves {
    /// Light-years; closer is better.
    pub distance: ComponentCurve,
    /// Apparent magnitude; brighter (smaller) is better.
    pub magnitude: ComponentCurve,
    /// Kelvin.
    pub temperature: ComponentCurve,
    /// Solar luminosities.
    pub luminosity: ComponentCurve,
    /// Solar masses.
    pub mass: ComponentCurve,
}

impl Default for AstrometricCurves {
    fn default() -> Self {
        use CurveShape::{Linear, Logarithmic};
        use Direction::{Ascending, Descending};
        Self {
            distance: ComponentCurve::new(Logarithmic, Descending, 4.2, 10_000.0, 60.0),
            magnitude: ComponentCurve::new(Linear, Descending, -1.5, 12.0, 50.0),
            temperature: ComponentCurve::new(Logarithmic, Ascending, 2_000.0, 40_000.0, 40.0),
            luminosity: ComponentCurve::new(Logarithmic, Ascending, 1e-4, 1e6, 40.0),
            mass: ComponentCurve::new(Logarithmic, Ascending, 0.08, 100.0, 30.0),
        }
    }
}

impl AstrometricCurves {
    /// Maxima in component order (distance, magnitude, temperature, luminosity, mass).
    pub fn maxima(&self) -> [f64; 5] {
        [
            self.distance.max,
            self.magnitude.max,
            self.temperature.max,
            self.luminosity.max,
            self.mass.max,
        ]
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        self.distance.validate("distance")?;
        self.magnitude.validate("magnitude")?;
        self.temperature.validate("temperature")?;
        self.luminosity.validate("luminosity")?;
        self.mass.validate("mass")?;
        Ok(())
    }
}
