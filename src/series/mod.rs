//! Temporal alignment engine.
//!
//! Raw provider observations go through:
//!
//! ```text
//! RawObservation -> normalize -> SeriesMap -> align_as_of(targets) -> AlignedSeries
//! ```
//!
//! The engine is infallible: bad records are dropped during normalization and
//! missing history shows up as blank (`None`) outputs.

pub mod asof;
pub mod calendar;
pub mod map;
pub mod normalize;
pub mod rolling;

pub use asof::*;
pub use calendar::*;
pub use map::*;
pub use normalize::*;
pub use rolling::*;
