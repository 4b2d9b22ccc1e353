//! Percent units for interest-rate series.
//!
//! Banxico publishes TIIE and CETES in whole percent (`11.25` means 11.25%).
//! Values stay in that raw form through normalization and alignment; the report
//! converts them to a decimal fraction with `RawPercent::to_decimal`, once.

use serde::{Deserialize, Serialize};

use crate::domain::AlignedSeries;

/// A rate in whole-percent units, as published by the source.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawPercent(pub f64);

impl RawPercent {
    /// Decimal fraction (`11.25` -> `0.1125`).
    pub fn to_decimal(self) -> f64 {
        self.0 / 100.0
    }
}

/// Convert an aligned whole-percent series to decimal fractions.
pub fn percent_series_to_decimal(raw: AlignedSeries) -> AlignedSeries {
    raw.map(|v| RawPercent(v).to_decimal())
}
