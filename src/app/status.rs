//! Data source health probes for the `status` command.

use std::time::Instant;

use tracing::debug;

use crate::config::{BANXICO_TOKEN, FRED_API_KEY, INEGI_TOKEN, Settings};
use crate::data::{InegiClient, SieClient};
use crate::domain::{Indicator, SourceStatus, StatusLevel};

/// Probe Banxico, INEGI, and FRED in turn.
pub fn probe_sources(settings: &Settings) -> Vec<SourceStatus> {
    vec![probe_banxico(settings), probe_inegi(settings), probe_fred(settings)]
}

fn probe_banxico(settings: &Settings) -> SourceStatus {
    timed("banxico", || {
        let client = match SieClient::from_settings(settings) {
            Ok(c) => c,
            Err(_) => return (StatusLevel::Err, format!("{BANXICO_TOKEN} not set")),
        };
        let fix = Indicator::UsdFix;
        match client.latest(fix.series_id()) {
            Ok(Some((date, value))) => (StatusLevel::Ok, format!("{} {value:.4} on {date}", fix.display_name())),
            Ok(None) => (StatusLevel::Warn, format!("{} returned no observations", fix.series_id())),
            Err(e) => (StatusLevel::Err, e.to_string()),
        }
    })
}

fn probe_inegi(settings: &Settings) -> SourceStatus {
    timed("inegi", || {
        let client = match InegiClient::from_settings(settings) {
            Ok(c) => c,
            Err(_) => return (StatusLevel::Warn, format!("{INEGI_TOKEN} not set (manual UMA only)")),
        };
        match client.fetch_uma() {
            Ok(q) => match q.daily {
                Some(daily) => (
                    StatusLevel::Ok,
                    format!("UMA daily {daily:.2} ({})", q.period.as_deref().unwrap_or("period unknown")),
                ),
                None => (StatusLevel::Warn, "UMA daily value missing".to_string()),
            },
            Err(e) => (StatusLevel::Err, e.to_string()),
        }
    })
}

fn probe_fred(settings: &Settings) -> SourceStatus {
    timed("fred", || {
        if settings.fred.is_set() {
            (
                StatusLevel::Ok,
                format!("{FRED_API_KEY} configured ({})", settings.fred.source().label()),
            )
        } else {
            (StatusLevel::Warn, format!("{FRED_API_KEY} not set (optional)"))
        }
    })
}

fn timed(source: &str, probe: impl FnOnce() -> (StatusLevel, String)) -> SourceStatus {
    let started = Instant::now();
    let (level, message) = probe();
    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    debug!(source, level = level.label(), latency_ms, "probed source");
    SourceStatus {
        source: source.to_string(),
        level,
        message,
        latency_ms,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::config::TokenOverrides;

    #[test]
    fn unconfigured_sources_do_not_touch_the_network() {
        let settings = Settings::resolve(&TokenOverrides::default(), &HashMap::new(), |_| None);
        let statuses = probe_sources(&settings);

        let levels: Vec<_> = statuses.iter().map(|s| (s.source.as_str(), s.level)).collect();
        assert_eq!(
            levels,
            vec![
                ("banxico", StatusLevel::Err),
                ("inegi", StatusLevel::Warn),
                ("fred", StatusLevel::Warn),
            ]
        );
        assert!(statuses[0].message.contains(BANXICO_TOKEN));
    }

    #[test]
    fn configured_fred_key_reports_its_source() {
        let overrides = TokenOverrides {
            fred: Some("k".to_string()),
            ..Default::default()
        };
        let settings = Settings::resolve(&overrides, &HashMap::new(), |_| None);
        let fred = probe_fred(&settings);
        assert_eq!(fred.level, StatusLevel::Ok);
        assert!(fred.message.contains(settings.fred.source().label()));
    }
}
