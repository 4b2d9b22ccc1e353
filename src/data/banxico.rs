//! Banxico SIE REST API integration.
//!
//! Responses look like:
//!
//! ```text
//! {"bmx":{"series":[{"idSerie":"SF43718","titulo":"...","datos":[{"fecha":"02/01/2024","dato":"16.9220"}]}]}}
//! ```
//!
//! `dato` may be `"N/E"` for unpublished values; that is handled by
//! normalization, not here.

use std::time::Duration;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{info, warn};

use crate::config::{BANXICO_TOKEN, Settings};
use crate::data::{RateSource, RetryingClient};
use crate::domain::RawObservation;
use crate::error::AppError;
use crate::series::normalize_observation;

const BASE_URL: &str = "https://www.banxico.org.mx/SieAPIRest/service/v1/series";
const TOKEN_HEADER: &str = "Bmx-Token";
const RANGE_TIMEOUT: Duration = Duration::from_secs(20);

pub struct SieClient {
    http: RetryingClient,
    token: String,
    base_url: String,
}

impl SieClient {
    pub fn new(token: impl Into<String>) -> Result<Self, AppError> {
        Ok(Self {
            http: RetryingClient::new(RANGE_TIMEOUT)?,
            token: token.into(),
            base_url: BASE_URL.to_string(),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, AppError> {
        Self::new(settings.banxico.require(BANXICO_TOKEN)?)
    }

    /// Point the client at a different host (mirrors, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_http(mut self, http: RetryingClient) -> Self {
        self.http = http;
        self
    }

    /// Fetch observations for `series_id` over `[start, end]`.
    pub fn try_fetch_range(
        &self,
        series_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawObservation>, AppError> {
        let url = format!(
            "{}/{series_id}/datos/{}/{}",
            self.base_url,
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d")
        );
        let body = self
            .http
            .get_text(&format!("Banxico {series_id}"), &url, &[(TOKEN_HEADER, self.token.as_str())])?;
        let obs = parse_sie_response(&body)?;
        info!(series = series_id, %start, %end, observations = obs.len(), "fetched Banxico range");
        Ok(obs)
    }

    /// Most recent published observation (`/datos/oportuno`).
    pub fn latest(&self, series_id: &str) -> Result<Option<(NaiveDate, f64)>, AppError> {
        let url = format!("{}/{series_id}/datos/oportuno", self.base_url);
        let body = self
            .http
            .get_text(&format!("Banxico {series_id} (latest)"), &url, &[(TOKEN_HEADER, self.token.as_str())])?;
        let obs = parse_sie_response(&body)?;
        Ok(obs.last().and_then(normalize_observation))
    }
}

impl RateSource for SieClient {
    fn name(&self) -> &str {
        "banxico"
    }

    fn fetch_range(&self, series_id: &str, start: NaiveDate, end: NaiveDate) -> Vec<RawObservation> {
        match self.try_fetch_range(series_id, start, end) {
            Ok(obs) => obs,
            Err(e) => {
                warn!(series = series_id, error = %e, "Banxico fetch failed; treating as no data");
                Vec::new()
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct SieResponse {
    bmx: SieBody,
}

#[derive(Debug, Deserialize)]
struct SieBody {
    #[serde(default)]
    series: Vec<SieSeries>,
}

#[derive(Debug, Deserialize)]
struct SieSeries {
    #[serde(default)]
    datos: Option<Vec<SieDatum>>,
}

#[derive(Debug, Deserialize)]
struct SieDatum {
    fecha: String,
    #[serde(default)]
    dato: Option<String>,
}

/// Parse a SIE response body into raw observations of its first series.
pub fn parse_sie_response(body: &str) -> Result<Vec<RawObservation>, AppError> {
    let resp: SieResponse = serde_json::from_str(body)
        .map_err(|e| AppError::upstream(format!("Failed to parse Banxico response: {e}")))?;
    Ok(resp
        .bmx
        .series
        .into_iter()
        .next()
        .and_then(|s| s.datos)
        .unwrap_or_default()
        .into_iter()
        .map(|d| RawObservation {
            date: d.fecha,
            value: d.dato,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::RetryPolicy;

    #[test]
    fn parses_first_series_data() {
        let body = r#"{"bmx":{"series":[{"idSerie":"SF43718","titulo":"FIX","datos":[
            {"fecha":"02/01/2024","dato":"16.9220"},
            {"fecha":"03/01/2024","dato":"N/E"}
        ]}]}}"#;
        let obs = parse_sie_response(body).unwrap();
        assert_eq!(
            obs,
            vec![
                RawObservation::new("02/01/2024", Some("16.9220")),
                RawObservation::new("03/01/2024", Some("N/E")),
            ]
        );
    }

    #[test]
    fn missing_series_or_data_is_empty() {
        assert!(parse_sie_response(r#"{"bmx":{"series":[]}}"#).unwrap().is_empty());
        assert!(parse_sie_response(r#"{"bmx":{}}"#).unwrap().is_empty());
        assert!(parse_sie_response(r#"{"bmx":{"series":[{"idSerie":"SF1"}]}}"#).unwrap().is_empty());
    }

    #[test]
    fn malformed_body_is_upstream_error() {
        let err = parse_sie_response("<html>maintenance</html>").unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn failed_fetch_degrades_to_empty() {
        let http = RetryingClient::with_policy(Duration::from_millis(200), RetryPolicy::none()).unwrap();
        let client = SieClient::new("token")
            .unwrap()
            .with_base_url("http://127.0.0.1:9")
            .with_http(http);
        let d = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert!(client.fetch_range("SF43718", d, d).is_empty());
        assert_eq!(client.try_fetch_range("SF43718", d, d).unwrap_err().exit_code(), 4);
    }
}
