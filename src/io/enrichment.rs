//! Significance enrichment supplied by an external producer.
//!
//! The file is a JSON object keyed by object name (proper name or designation,
//! case-insensitive):
//!
//! ```json
//! {
//!   "Sirius": { "namedByAncients": true, "wikipediaPageviews": 412000 },
//!   "HIP 71683": { "wikidataSitelinks": 96, "plannedMission": true }
//! }
//! ```
//!
//! Matching entries replace any signals that came from catalog columns.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::domain::{AstronomicalObject, SignificanceSignals};
use crate::error::EngineError;

#[derive(Debug, Default)]
pub struct EnrichmentTable {
    entries: HashMap<String, SignificanceSignals>,
    matched: HashSet<String>,
}

impl EnrichmentTable {
    pub fn from_map(map: HashMap<String, SignificanceSignals>) -> Self {
        let entries = map
            .into_iter()
            .map(|(k, v)| (k.trim().to_lowercase(), v))
            .collect();
        Self {
            entries,
            matched: HashSet::new(),
        }
    }

    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let file = File::open(path).map_err(|e| EngineError::io(path, e))?;
        let map: HashMap<String, SignificanceSignals> = serde_json::from_reader(BufReader::new(file))?;
        Ok(Self::from_map(map))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Attach signals to `obj` if an entry matches its proper name, display
    /// name, or any designation (checked in that order).
    pub fn apply(&mut self, mut obj: AstronomicalObject) -> AstronomicalObject {
        let candidates = obj
            .proper_name
            .iter()
            .cloned()
            .chain(std::iter::once(obj.name.clone()))
            .chain(obj.catalog_ids.designations());
        for key in candidates {
            let key = key.trim().to_lowercase();
            if let Some(signals) = self.entries.get(&key) {
                obj.signals = Some(signals.clone());
                self.matched.insert(key);
                break;
            }
        }
        obj
    }

    /// Keys that never matched an object, sorted.
    pub fn unmatched_keys(&self) -> Vec<String> {
        let mut out: Vec<String> = self
            .entries
            .keys()
            .filter(|k| !self.matched.contains(*k))
            .cloned()
            .collect();
        out.sort();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CatalogIds;

    fn table() -> EnrichmentTable {
        let json = r#"{
            "Sirius": { "namedByAncients": true, "wikipediaPageviews": 412000 },
            "HIP 71683": { "wikidataSitelinks": 96 },
            "Nowhere": { "habitable": true }
        }"#;
        let map: HashMap<String, SignificanceSignals> = serde_json::from_str(json).unwrap();
        EnrichmentTable::from_map(map)
    }

    #[test]
    fn matches_by_proper_name_case_insensitively() {
        let mut t = table();
        let mut obj = AstronomicalObject::named("SIRIUS");
        obj.proper_name = Some("SIRIUS".to_string());
        let obj = t.apply(obj);
        let s = obj.signals.unwrap();
        assert!(s.named_by_ancients);
        assert_eq!(s.wikipedia_pageviews, Some(412_000));
    }

    #[test]
    fn matches_by_designation_and_reports_unmatched() {
        let mut t = table();
        let mut obj = AstronomicalObject::named("Rigil Kentaurus");
        obj.catalog_ids = CatalogIds {
            hip: Some(71683),
            ..CatalogIds::default()
        };
        let obj = t.apply(obj);
        assert_eq!(obj.signals.unwrap().wikidata_sitelinks, Some(96));
        assert_eq!(t.unmatched_keys(), vec!["nowhere".to_string(), "sirius".to_string()]);
    }

    #[test]
    fn objects_without_entries_are_untouched() {
        let mut t = table();
        let obj = AstronomicalObject::named("HIP 1");
        assert_eq!(t.apply(obj.clone()), obj);
    }
}
