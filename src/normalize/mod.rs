//! Raw row → [`AstronomicalObject`].
//!
//! Resolution order is fixed so that runs are reproducible:
//!
//! - **name**: proper name, then HIP, HD, HR, Gliese, Bayer/Flamsteed
//! - **distance**: `dist_ly`, then `dist` (pc), then parallax, then distance modulus
//! - **temperature**: `temp`, then the B-V colour index estimate
//! - **luminosity / mass**: as given when positive, otherwise absent
//!
//! Unknown values are always `None`. In particular `0` is never used as a
//! stand-in for "unknown", and the HYG `100000 pc` marker is discarded.

use std::collections::HashSet;

use crate::domain::{AstronomicalObject, CatalogIds, LY_PER_PARSEC, SignificanceSignals};
use crate::io::catalog::{RawRow, columns};

pub mod spectral;

pub use spectral::{canonical_spectral_type, is_canonical_spectral_type};

/// HYG-style exports write this distance (pc) when it is unknown.
const UNKNOWN_DISTANCE_PC: f64 = 100_000.0;

/// Colour-index range over which the Ballesteros relation is trusted.
const CI_MIN: f64 = -0.4;
const CI_MAX: f64 = 2.5;

/// A present but unusable field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowIssue {
    pub column: &'static str,
    pub value: String,
}

impl std::fmt::Display for RowIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unparsable value `{}` in column `{}`", self.value, self.column)
    }
}

/// Normalize one row.
///
/// - `Ok(None)`: no usable designation; the row is dropped
/// - `Err(_)`: a present field could not be parsed; the row is malformed
pub fn normalize(row: &RawRow) -> Result<Option<AstronomicalObject>, RowIssue> {
    let proper_name = row.get(columns::PROPER).map(str::to_string);
    let catalog_ids = CatalogIds {
        hip: parse_catalog_number(row, columns::HIP)?,
        hd: parse_catalog_number(row, columns::HD)?,
        hr: parse_catalog_number(row, columns::HR)?,
        gliese: row.get(columns::GLIESE).map(str::to_string),
        bayer_flamsteed: row.get(columns::BAYER_FLAMSTEED).map(str::to_string),
    };

    let Some(name) = proper_name
        .clone()
        .or_else(|| catalog_ids.designations().into_iter().next())
    else {
        return Ok(None);
    };

    let apparent_magnitude = parse_number(row, columns::MAG)?;
    let absolute_magnitude = parse_number(row, columns::ABSMAG)?;

    let distance_ly = resolve_distance(
        parse_number(row, columns::DIST_LY)?,
        parse_number(row, columns::DIST_PC)?,
        parse_number(row, columns::PARALLAX)?,
        apparent_magnitude,
        absolute_magnitude,
    );

    let temperature_k = positive(parse_number(row, columns::TEMP)?)
        .or(parse_number(row, columns::COLOR_INDEX)?.and_then(temperature_from_color_index));

    let source_id = row
        .get(columns::ID)
        .map(str::to_string)
        .or_else(|| catalog_ids.designations().into_iter().next())
        .unwrap_or_else(|| format!("row {}", row.line()));

    Ok(Some(AstronomicalObject {
        name,
        source_id,
        proper_name,
        catalog_ids,
        distance_ly,
        apparent_magnitude,
        absolute_magnitude,
        temperature_k,
        luminosity_solar: positive(parse_number(row, columns::LUM)?),
        mass_solar: positive(parse_number(row, columns::MASS)?),
        spectral_type: row.get(columns::SPECT).and_then(canonical_spectral_type),
        signals: parse_signals(row)?,
    }))
}

/// Distance resolution in fixed precedence order.
pub fn resolve_distance(
    dist_ly: Option<f64>,
    dist_pc: Option<f64>,
    parallax_arcsec: Option<f64>,
    apparent_mag: Option<f64>,
    absolute_mag: Option<f64>,
) -> Option<f64> {
    if let Some(ly) = positive(dist_ly) {
        return Some(ly);
    }
    if let Some(pc) = positive(dist_pc).filter(|pc| *pc < UNKNOWN_DISTANCE_PC) {
        return Some(pc * LY_PER_PARSEC);
    }
    if let Some(plx) = positive(parallax_arcsec) {
        return positive(Some(LY_PER_PARSEC / plx));
    }
    if let (Some(m), Some(abs)) = (apparent_mag, absolute_mag) {
        let pc = 10f64.powf((m - abs + 5.0) / 5.0);
        return positive(Some(pc * LY_PER_PARSEC)).filter(|_| pc < UNKNOWN_DISTANCE_PC);
    }
    None
}

/// Effective temperature from B-V (Ballesteros 2012).
pub fn temperature_from_color_index(ci: f64) -> Option<f64> {
    if !(CI_MIN..=CI_MAX).contains(&ci) {
        return None;
    }
    let t = 4600.0 * (1.0 / (0.92 * ci + 1.7) + 1.0 / (0.92 * ci + 0.62));
    positive(Some(t))
}

/// Keeps names unique within a batch.
///
/// Collisions get the source identifier appended, then a counter if needed.
#[derive(Debug, Default)]
pub struct NameRegistry {
    seen: HashSet<String>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `obj` with a batch-unique name, and whether it was renamed.
    pub fn disambiguate(&mut self, mut obj: AstronomicalObject) -> (AstronomicalObject, bool) {
        if self.seen.insert(obj.name.clone()) {
            return (obj, false);
        }
        let base = format!("{} [{}]", obj.name, obj.source_id);
        let mut candidate = base.clone();
        let mut n = 2;
        while !self.seen.insert(candidate.clone()) {
            candidate = format!("{base} #{n}");
            n += 1;
        }
        obj.name = candidate;
        (obj, true)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Re-serialize an object into catalog columns.
///
/// Normalizing the result reproduces the object (except for any batch
/// disambiguation suffix, which is a property of the batch, not the row).
pub fn to_raw_row(obj: &AstronomicalObject) -> RawRow {
    let num = |v: Option<f64>| v.map(|x| x.to_string()).unwrap_or_default();
    let id = |v: Option<u32>| v.map(|x| x.to_string()).unwrap_or_default();
    let flag = |b: bool| if b { "1" } else { "0" }.to_string();
    let signals = obj.signals.clone().unwrap_or_default();

    RawRow::from_pairs(&[
        (columns::ID, obj.source_id.clone()),
        (columns::PROPER, obj.proper_name.clone().unwrap_or_default()),
        (columns::HIP, id(obj.catalog_ids.hip)),
        (columns::HD, id(obj.catalog_ids.hd)),
        (columns::HR, id(obj.catalog_ids.hr)),
        (columns::GLIESE, obj.catalog_ids.gliese.clone().unwrap_or_default()),
        (columns::BAYER_FLAMSTEED, obj.catalog_ids.bayer_flamsteed.clone().unwrap_or_default()),
        (columns::DIST_LY, num(obj.distance_ly)),
        (columns::MAG, num(obj.apparent_magnitude)),
        (columns::ABSMAG, num(obj.absolute_magnitude)),
        (columns::SPECT, obj.spectral_type.clone().unwrap_or_default()),
        (columns::LUM, num(obj.luminosity_solar)),
        (columns::MASS, num(obj.mass_solar)),
        (columns::TEMP, num(obj.temperature_k)),
        (columns::NAMED_BY_ANCIENTS, flag(signals.named_by_ancients)),
        (columns::ACTIVE_MISSION, flag(signals.active_mission)),
        (columns::PLANNED_MISSION, flag(signals.planned_mission)),
        (
            columns::WIKI_PAGEVIEWS,
            signals.wikipedia_pageviews.map(|v| v.to_string()).unwrap_or_default(),
        ),
        (
            columns::WIKIDATA_SITELINKS,
            signals.wikidata_sitelinks.map(|v| v.to_string()).unwrap_or_default(),
        ),
        (columns::HABITABLE, flag(signals.habitable)),
        (columns::SOLAR_SYSTEM, flag(signals.solar_system)),
    ])
}

fn parse_signals(row: &RawRow) -> Result<Option<SignificanceSignals>, RowIssue> {
    let signals = SignificanceSignals {
        named_by_ancients: parse_flag(row, columns::NAMED_BY_ANCIENTS)?,
        active_mission: parse_flag(row, columns::ACTIVE_MISSION)?,
        planned_mission: parse_flag(row, columns::PLANNED_MISSION)?,
        wikipedia_pageviews: parse_count(row, columns::WIKI_PAGEVIEWS)?,
        wikidata_sitelinks: parse_count(row, columns::WIKIDATA_SITELINKS)?,
        habitable: parse_flag(row, columns::HABITABLE)?,
        solar_system: parse_flag(row, columns::SOLAR_SYSTEM)?,
    };
    Ok((!signals.is_blank()).then_some(signals))
}

fn positive(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite() && *x > 0.0)
}

fn issue(column: &'static str, value: &str) -> RowIssue {
    RowIssue {
        column,
        value: value.to_string(),
    }
}

fn parse_number(row: &RawRow, column: &'static str) -> Result<Option<f64>, RowIssue> {
    let Some(raw) = row.get(column) else {
        return Ok(None);
    };
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(issue(column, raw)),
    }
}

/// Catalog numbers; `0` means "not in this catalog".
fn parse_catalog_number(row: &RawRow, column: &'static str) -> Result<Option<u32>, RowIssue> {
    let Some(raw) = row.get(column) else {
        return Ok(None);
    };
    // Some exports write integer columns as floats ("32349.0").
    let parsed = raw
        .parse::<u32>()
        .ok()
        .or_else(|| {
            raw.parse::<f64>()
                .ok()
                .filter(|v| v.fract() == 0.0 && *v >= 0.0 && *v <= u32::MAX as f64)
                .map(|v| v as u32)
        });
    match parsed {
        Some(0) => Ok(None),
        Some(v) => Ok(Some(v)),
        None => Err(issue(column, raw)),
    }
}

fn parse_count<T: std::str::FromStr>(row: &RawRow, column: &'static str) -> Result<Option<T>, RowIssue> {
    let Some(raw) = row.get(column) else {
        return Ok(None);
    };
    raw.parse::<T>().map(Some).map_err(|_| issue(column, raw))
}

fn parse_flag(row: &RawRow, column: &'static str) -> Result<bool, RowIssue> {
    let Some(raw) = row.get(column) else {
        return Ok(false);
    };
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "t" => Ok(true),
        "0" | "false" | "no" | "n" | "f" => Ok(false),
        _ => Err(issue(column, raw)),
    }
}
