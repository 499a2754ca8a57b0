//! Reporting utilities: formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the scoring code stays clean and testable
//! - output changes are localized

mod format;

pub use format::*;
