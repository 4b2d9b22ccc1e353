//! Blocking HTTP GET with retries and exponential backoff.

use std::thread;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use tracing::{debug, warn};

use crate::error::AppError;

/// Statuses worth retrying: rate limiting and transient server errors.
const RETRY_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Retry schedule: `backoff * 2^attempt` after each failed attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: Duration::from_millis(800),
        }
    }
}

impl RetryPolicy {
    /// No retries at all.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            backoff: Duration::ZERO,
        }
    }

    /// Delay before retry number `attempt + 1` (0.8s, 1.6s, 3.2s by default).
    pub fn delay(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(1u32 << attempt.min(16))
    }

    pub fn should_retry(status: StatusCode) -> bool {
        RETRY_STATUSES.contains(&status.as_u16())
    }
}

/// A `reqwest` blocking client with a per-request timeout and retry policy.
pub struct RetryingClient {
    client: Client,
    policy: RetryPolicy,
}

impl RetryingClient {
    pub fn new(timeout: Duration) -> Result<Self, AppError> {
        Self::with_policy(timeout, RetryPolicy::default())
    }

    pub fn with_policy(timeout: Duration, policy: RetryPolicy) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("rate-sheet/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client, policy })
    }

    /// GET `url` and return the response body.
    ///
    /// `label` identifies the request in logs and errors; URLs are not logged
    /// because some providers put the token in the path.
    pub fn get_text(&self, label: &str, url: &str, headers: &[(&str, &str)]) -> Result<String, AppError> {
        let mut attempt = 0u32;
        loop {
            let mut req = self.client.get(url);
            for (name, value) in headers {
                req = req.header(*name, *value);
            }

            let retry_reason = match req.send() {
                Ok(resp) if resp.status().is_success() => {
                    debug!(request = label, attempt, "request succeeded");
                    return resp.text().map_err(|e| {
                        AppError::upstream(format!("{label}: failed to read response body: {}", e.without_url()))
                    });
                }
                Ok(resp) if RetryPolicy::should_retry(resp.status()) => format!("status {}", resp.status()),
                Ok(resp) => {
                    return Err(AppError::upstream(format!(
                        "{label}: request failed with status {}.",
                        resp.status()
                    )));
                }
                Err(e) => format!("transport error: {}", e.without_url()),
            };

            if attempt >= self.policy.max_retries {
                return Err(AppError::upstream(format!(
                    "{label}: giving up after {} attempt(s), last error: {retry_reason}",
                    attempt + 1
                )));
            }

            let delay = self.policy.delay(attempt);
            warn!(request = label, attempt, ?delay, reason = %retry_reason, "retrying request");
            thread::sleep(delay);
            attempt += 1;
        }
    }
}
