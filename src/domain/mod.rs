//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - normalized catalog objects (`AstronomicalObject`) and their enrichment inputs
//! - score outputs (`ScoreComponents`, `ScoredObject`) and badge tiers (`Tier`)
//! - run configuration (`ScoringConfig`) loaded from TOML

pub mod config;
pub mod types;

pub use config::*;
pub use types::*;
