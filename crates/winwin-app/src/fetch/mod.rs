// Sources for player values and league rosters.
//
// The binary talks to FantasyCalc and Sleeper over HTTP, or reads values from
// a local CSV. Every remote call goes through `with_retry`.

pub mod fantasycalc;
pub mod sleeper;

pub use fantasycalc::FantasyCalcClient;
pub use sleeper::{SleeperClient, SleeperRoster, SleeperUser};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;
use winwin_core::config::SourcesConfig;
use winwin_core::valuation::PlayerValue;

use crate::values::load_values;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("unexpected response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("{what} failed after {attempts} attempts: {last}")]
    Exhausted {
        what: String,
        attempts: u32,
        last: Box<FetchError>,
    },
}

impl FetchError {
    /// Transport failures and error statuses are worth another attempt; a
    /// response we cannot make sense of is not.
    fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Http { .. } | FetchError::Status { .. })
    }
}

// ---------------------------------------------------------------------------
// Retry with linear backoff
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(sources: &SourcesConfig) -> Self {
        RetryPolicy {
            attempts: sources.max_retries,
            delay: Duration::from_millis(sources.retry_delay_ms),
        }
    }

    /// Sleep before attempt `attempt + 1`.
    fn backoff(&self, attempt: u32) -> Duration {
        self.delay * attempt
    }
}

/// Run `op` until it succeeds, fails with a non-retryable error, or the
/// attempts run out.
pub async fn with_retry<T, F, Fut>(what: &str, policy: &RetryPolicy, mut op: F) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if !e.is_retryable() => return Err(e),
            Err(e) => {
                warn!("{} attempt {}/{} failed: {}", what, attempt, attempts, e);
                if attempt >= attempts {
                    return Err(FetchError::Exhausted {
                        what: what.to_string(),
                        attempts,
                        last: Box::new(e),
                    });
                }
                tokio::time::sleep(policy.backoff(attempt)).await;
                attempt += 1;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// HTTP helpers
// ---------------------------------------------------------------------------

/// Shared client with the configured per-request timeout.
pub fn http_client(sources: &SourcesConfig) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(sources.request_timeout_secs))
        .build()
}

pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    query: &[(&str, String)],
) -> Result<T, FetchError> {
    let resp = client
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|e| FetchError::Http {
            url: url.to_string(),
            source: e,
        })?;

    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status,
        });
    }

    let body = resp.text().await.map_err(|e| FetchError::Http {
        url: url.to_string(),
        source: e,
    })?;
    serde_json::from_str(&body).map_err(|e| FetchError::Decode {
        url: url.to_string(),
        message: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Source traits
// ---------------------------------------------------------------------------

/// Where this week's player values come from.
#[async_trait]
pub trait ValueSource: Send + Sync {
    async fn player_values(&self) -> anyhow::Result<Vec<PlayerValue>>;
}

/// Where league rosters and owners come from.
#[async_trait]
pub trait LeagueSource: Send + Sync {
    async fn rosters(&self, league_id: &str) -> anyhow::Result<Vec<SleeperRoster>>;
    async fn users(&self, league_id: &str) -> anyhow::Result<Vec<SleeperUser>>;
}

/// Values read from a local CSV instead of FantasyCalc.
#[derive(Debug, Clone)]
pub struct CsvValues {
    path: PathBuf,
}

impl CsvValues {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CsvValues { path: path.into() }
    }
}

#[async_trait]
impl ValueSource for CsvValues {
    async fn player_values(&self) -> anyhow::Result<Vec<PlayerValue>> {
        Ok(load_values(&self.path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn status_error() -> FetchError {
        FetchError::Status {
            url: "http://test".into(),
            status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn policy(attempts: u32, delay_ms: u64) -> RetryPolicy {
        RetryPolicy {
            attempts,
            delay: Duration::from_millis(delay_ms),
        }
    }

    // -- with_retry --

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_transient_failures() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let start = tokio::time::Instant::now();

        let result = with_retry("test", &policy(3, 1000), move || async move {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(status_error())
            } else {
                Ok(42)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 1s after the first failure, 2s after the second.
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(3000) && elapsed < Duration::from_millis(3100));
    }

    #[tokio::test(start_paused = true)]
    async fn exhaustion_reports_attempts_and_last_error() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<(), _> = with_retry("values", &policy(3, 10), move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(status_error())
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        match result.unwrap_err() {
            FetchError::Exhausted { what, attempts, last } => {
                assert_eq!(what, "values");
                assert_eq!(attempts, 3);
                assert!(matches!(*last, FetchError::Status { .. }));
            }
            other => panic!("expected Exhausted, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn decode_errors_are_not_retried() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<(), _> = with_retry("users", &policy(5, 10), move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(FetchError::Decode {
                url: "http://test".into(),
                message: "expected a list".into(),
            })
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result.unwrap_err(), FetchError::Decode { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_attempts_still_tries_once() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let _ = with_retry("rosters", &policy(0, 10), move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(status_error())
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn policy_follows_config() {
        let p = RetryPolicy::from_config(&SourcesConfig::default());
        assert_eq!(p.attempts, 3);
        assert_eq!(p.delay, Duration::from_millis(1000));
        assert_eq!(p.backoff(2), Duration::from_millis(2000));
    }

    // -- CsvValues --

    #[tokio::test]
    async fn csv_source_surfaces_load_errors() {
        let source = CsvValues::new("/nonexistent/values.csv");
        let err = source.player_values().await.unwrap_err();
        assert!(err.to_string().contains("/nonexistent/values.csv"));
    }
}
