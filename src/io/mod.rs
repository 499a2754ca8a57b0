//! Input/output helpers.
//!
//! - catalog acquisition, gzip sniffing (`source`)
//! - streaming CSV parsing + header validation (`catalog`)
//! - significance enrichment files (`enrichment`)
//! - JSON artifacts (`export`)

pub mod catalog;
pub mod enrichment;
pub mod export;
pub mod source;

pub use catalog::{CatalogReader, RawRow};
pub use enrichment::EnrichmentTable;
pub use export::{ScoredCollection, StatsDocument};
pub use source::{CatalogLocation, CatalogStream, open_source};
