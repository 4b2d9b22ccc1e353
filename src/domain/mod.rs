//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the indicator catalogue (`Indicator`, `Section`) and Banxico series ids
//! - raw provider observations (`RawObservation`)
//! - aligned outputs (`AlignedSeries`)
//! - run configuration (`ReportConfig`)
//! - percent-unit conversion (`RawPercent`)

pub mod types;
pub mod units;

pub use types::*;
pub use units::*;
