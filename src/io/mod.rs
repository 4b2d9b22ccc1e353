//! Input/output helpers.
//!
//! - CSV ingest of raw observations (`ingest`)
//! - report exports (CSV/JSON) (`export`)
//! - indicator sheet grid (`sheet`)

pub mod export;
pub mod ingest;
pub mod sheet;

pub use export::*;
pub use ingest::*;
pub use sheet::*;
