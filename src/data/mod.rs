//! Rate-data retrieval.
//!
//! - `banxico`: Banxico SIE series (FX, UDIS, TIIE, CETES)
//! - `inegi`: INEGI UMA values
//! - `fred`: optional FRED series
//! - `http`: blocking client with retry/backoff shared by all sources
//! - `memory`: in-memory source for offline runs and tests

use chrono::NaiveDate;

use crate::domain::RawObservation;

pub mod banxico;
pub mod fred;
pub mod http;
pub mod inegi;
pub mod memory;

pub use banxico::SieClient;
pub use fred::FredClient;
pub use http::{RetryPolicy, RetryingClient};
pub use inegi::{InegiClient, UmaQuote};
pub use memory::MemorySource;

/// A source of raw observations for a series over an inclusive date range.
///
/// Implementations swallow every failure (timeout, auth, empty upstream
/// response) and return an empty list; callers treat that as "no data".
pub trait RateSource {
    fn name(&self) -> &str;

    fn fetch_range(&self, series_id: &str, start: NaiveDate, end: NaiveDate) -> Vec<RawObservation>;
}
