//! FRED API integration (optional extra series for the report).

use std::time::Duration;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{info, warn};

use crate::config::{FRED_API_KEY, Settings};
use crate::data::{RateSource, RetryingClient};
use crate::domain::RawObservation;
use crate::error::AppError;

const BASE_URL: &str = "https://api.stlouisfed.org/fred/series/observations";
const TIMEOUT: Duration = Duration::from_secs(20);

pub struct FredClient {
    http: RetryingClient,
    api_key: String,
    base_url: String,
}

impl FredClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, AppError> {
        Ok(Self {
            http: RetryingClient::new(TIMEOUT)?,
            api_key: api_key.into(),
            base_url: BASE_URL.to_string(),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, AppError> {
        Self::new(settings.fred.require(FRED_API_KEY)?)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn try_fetch_range(
        &self,
        series_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawObservation>, AppError> {
        let url = reqwest::Url::parse_with_params(
            &self.base_url,
            &[
                ("series_id", series_id),
                ("api_key", self.api_key.as_str()),
                ("file_type", "json"),
                ("units", "lin"),
                ("observation_start", &start.to_string()),
                ("observation_end", &end.to_string()),
            ],
        )
        .map_err(|e| AppError::config(format!("Invalid FRED URL: {e}")))?;

        let body = self.http.get_text(&format!("FRED {series_id}"), url.as_str(), &[])?;
        let obs = parse_fred_response(&body)?;
        info!(series = series_id, observations = obs.len(), "fetched FRED range");
        Ok(obs)
    }
}

impl RateSource for FredClient {
    fn name(&self) -> &str {
        "fred"
    }

    fn fetch_range(&self, series_id: &str, start: NaiveDate, end: NaiveDate) -> Vec<RawObservation> {
        self.try_fetch_range(series_id, start, end).unwrap_or_else(|e| {
            warn!(series = series_id, error = %e, "FRED fetch failed; treating as no data");
            Vec::new()
        })
    }
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    #[serde(default)]
    observations: Vec<Observation>,
}

#[derive(Debug, Deserialize)]
struct Observation {
    date: String,
    value: String,
}

/// Parse a FRED observations body. FRED marks missing values with `"."`.
pub fn parse_fred_response(body: &str) -> Result<Vec<RawObservation>, AppError> {
    let body: ObservationsResponse = serde_json::from_str(body)
        .map_err(|e| AppError::upstream(format!("Failed to parse FRED response: {e}")))?;
    Ok(body
        .observations
        .into_iter()
        .map(|o| RawObservation {
            date: o.date,
            value: Some(o.value),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::normalize;

    #[test]
    fn parses_observations_and_keeps_missing_marker_for_normalization() {
        let body = r#"{"realtime_start":"2024-01-10","observations":[
            {"realtime_start":"2024-01-10","date":"2024-01-02","value":"4.33"},
            {"realtime_start":"2024-01-10","date":"2024-01-03","value":"."}
        ]}"#;
        let obs = parse_fred_response(body).unwrap();
        assert_eq!(obs.len(), 2);
        assert_eq!(obs[1].value.as_deref(), Some("."));

        let map = normalize(&obs);
        assert_eq!(map.len(), 1);
        assert_eq!(map.dropped(), 1);
    }

    #[test]
    fn payload_without_observations_is_empty() {
        let obs = parse_fred_response(r#"{"error_code":400,"error_message":"Bad Request"}"#).unwrap();
        assert!(obs.is_empty());
        assert_eq!(parse_fred_response("oops").unwrap_err().exit_code(), 4);
    }
}
