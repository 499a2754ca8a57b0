//! `star-rank` library crate.
//!
//! The binary (`starrank`) is a thin wrapper around this library so that:
//!
//! - the pipeline is testable without spawning processes
//! - the scoring stages are reusable on their own (parse, normalize, score, tier, aggregate)
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod normalize;
pub mod quality;
pub mod report;
pub mod score;
pub mod stats;
pub mod tier;
