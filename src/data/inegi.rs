//! INEGI indicators API: UMA (Unidad de Medida y Actualización).
//!
//! The national UMA is published as three indicators (daily, monthly,
//! annual). The `BISE` source is tried first and `BIE` is the fallback.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::{INEGI_TOKEN, Settings};
use crate::data::RetryingClient;
use crate::error::AppError;
use crate::series::parse_value;

const BASE_URL: &str = "https://www.inegi.org.mx/app/api/indicadores/desarrolladores/jsonxml/INDICATOR";
const UMA_DAILY: &str = "620706";
const UMA_MONTHLY: &str = "620707";
const UMA_ANNUAL: &str = "620708";
const SOURCES: [&str; 2] = ["BISE", "BIE"];
const TIMEOUT: Duration = Duration::from_secs(20);

/// Latest UMA values as published; any of them may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UmaQuote {
    /// Reference period as given by INEGI (e.g. `2024`).
    pub period: Option<String>,
    pub daily: Option<f64>,
    pub monthly: Option<f64>,
    pub annual: Option<f64>,
}

pub struct InegiClient {
    http: RetryingClient,
    token: String,
    base_url: String,
}

impl InegiClient {
    pub fn new(token: impl Into<String>) -> Result<Self, AppError> {
        Ok(Self {
            http: RetryingClient::new(TIMEOUT)?,
            token: token.into(),
            base_url: BASE_URL.to_string(),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, AppError> {
        Self::new(settings.inegi.require(INEGI_TOKEN)?)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_http(mut self, http: RetryingClient) -> Self {
        self.http = http;
        self
    }

    /// Fetch the latest UMA, trying each INEGI source in turn.
    pub fn fetch_uma(&self) -> Result<UmaQuote, AppError> {
        let ids = [UMA_DAILY, UMA_MONTHLY, UMA_ANNUAL].join(",");
        let mut last_err = AppError::upstream("INEGI: no source attempted.");

        for source in SOURCES {
            let url = format!(
                "{}/{ids}/es/00/true/{source}/2.0/{}?type=json",
                self.base_url, self.token
            );
            let result = self
                .http
                .get_text(&format!("INEGI UMA ({source})"), &url, &[])
                .and_then(|body| parse_uma_response(&body));
            match result {
                Ok(quote) => {
                    info!(source, period = ?quote.period, daily = ?quote.daily, "fetched UMA");
                    return Ok(quote);
                }
                Err(e) => {
                    warn!(source, error = %e, "INEGI source failed");
                    last_err = e;
                }
            }
        }
        Err(last_err)
    }
}

#[derive(Debug, Deserialize)]
struct InegiResponse {
    #[serde(rename = "Series", alias = "series", default)]
    series: Vec<InegiSeries>,
}

#[derive(Debug, Deserialize)]
struct InegiSeries {
    #[serde(rename = "INDICADOR", alias = "indicador", default)]
    indicator: Option<String>,
    #[serde(rename = "OBSERVATIONS", alias = "observations", default)]
    observations: Option<Vec<InegiObservation>>,
}

#[derive(Debug, Deserialize)]
struct InegiObservation {
    #[serde(rename = "TIME_PERIOD", alias = "time_period", alias = "periodo", alias = "fecha", default)]
    period: Option<String>,
    #[serde(rename = "OBS_VALUE", alias = "value", default)]
    value: Option<String>,
}

/// Parse an INEGI indicator response into a `UmaQuote`.
///
/// Series are matched by indicator id when present, otherwise by position
/// (daily, monthly, annual). Each value is the series' last observation.
pub fn parse_uma_response(body: &str) -> Result<UmaQuote, AppError> {
    let resp: InegiResponse = serde_json::from_str(body)
        .map_err(|e| AppError::upstream(format!("Failed to parse INEGI response: {e}")))?;
    if resp.series.is_empty() {
        return Err(AppError::upstream("INEGI response has no series."));
    }

    let daily = last_observation(&resp.series, UMA_DAILY, 0);
    let monthly = last_observation(&resp.series, UMA_MONTHLY, 1);
    let annual = last_observation(&resp.series, UMA_ANNUAL, 2);

    let value = |o: Option<&InegiObservation>| o.and_then(|o| parse_value(o.value.as_deref()));
    let period = [daily, monthly, annual]
        .into_iter()
        .flatten()
        .find_map(|o| o.period.clone());

    Ok(UmaQuote {
        period,
        daily: value(daily),
        monthly: value(monthly),
        annual: value(annual),
    })
}

fn last_observation<'a>(series: &'a [InegiSeries], id: &str, position: usize) -> Option<&'a InegiObservation> {
    let s = series
        .iter()
        .find(|s| s.indicator.as_deref() == Some(id))
        .or_else(|| series.get(position).filter(|s| s.indicator.is_none()))?;
    s.observations.as_ref()?.last()
}
