//! Historical data providers.
//!
//! Each provider implements [`HistorySource`]. Callers go through
//! [`fetch_with_retry`], which applies the per-call timeout and bounded retries
//! and turns every failure into "no data".

pub mod deriv;
pub mod yahoo;

pub use deriv::DerivClient;
pub use yahoo::YahooFinanceClient;

use futures_util::future::BoxFuture;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::FetchPolicy;
use crate::types::{Series, Timeframe};

/// Parameters for one history request.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryQuery {
    /// Normalized instrument identifier, e.g. `EURUSD`.
    pub symbol: String,
    pub timeframe: Timeframe,
    /// Start of the range in seconds since the epoch.
    pub start: i64,
    /// End of the range in seconds since the epoch.
    pub end: i64,
    /// Provider credential, if the provider needs one.
    pub credentials: Option<String>,
}

/// Provider failure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Network(String),

    #[error("timed out after {0} ms")]
    Timeout(u128),

    #[error("provider error: {0}")]
    Provider(String),

    #[error("empty payload")]
    Empty,

    #[error("malformed payload: {0}")]
    Malformed(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("timeframe {0} not supported")]
    Unsupported(Timeframe),
}

impl FetchError {
    /// Whether repeating the same call may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            FetchError::Network(_) | FetchError::Timeout(_) | FetchError::Provider(_) | FetchError::Empty
        )
    }
}

/// A source of OHLCV history for one (symbol, timeframe) pair.
pub trait HistorySource: Send + Sync {
    /// Provider name used in logs.
    fn name(&self) -> &'static str;

    /// Perform a single fetch attempt.
    fn fetch<'a>(&'a self, query: &'a HistoryQuery) -> BoxFuture<'a, Result<Series, FetchError>>;
}

/// Fetch with timeout and bounded retries. Returns `None` when every attempt
/// failed or the failure is not worth retrying.
pub async fn fetch_with_retry(
    source: &dyn HistorySource,
    query: &HistoryQuery,
    policy: &FetchPolicy,
) -> Option<Series> {
    if query.start > query.end {
        warn!(
            "[{}] Refusing {} {}: start {} is after end {}",
            source.name(),
            query.symbol,
            query.timeframe,
            query.start,
            query.end
        );
        return None;
    }

    let attempts = policy.attempts.max(1);
    for attempt in 1..=attempts {
        let result = match tokio::time::timeout(policy.timeout, source.fetch(query)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(policy.timeout.as_millis())),
        };

        let error = match result {
            Ok(series) if !series.is_empty() => {
                info!(
                    "[{}] Fetched {} bars for {} at {}",
                    source.name(),
                    series.len(),
                    query.symbol,
                    query.timeframe
                );
                return Some(series);
            }
            Ok(_) => FetchError::Empty,
            Err(e) => e,
        };

        if !error.is_transient() {
            warn!(
                "[{}] Giving up on {} at {}: {}",
                source.name(),
                query.symbol,
                query.timeframe,
                error
            );
            return None;
        }

        if attempt < attempts {
            debug!(
                "[{}] Attempt {}/{} for {} at {} failed: {}",
                source.name(),
                attempt,
                attempts,
                query.symbol,
                query.timeframe,
                error
            );
            tokio::time::sleep(policy.backoff * attempt).await;
        } else {
            warn!(
                "[{}] No data for {} at {} after {} attempts: {}",
                source.name(),
                query.symbol,
                query.timeframe,
                attempts,
                error
            );
        }
    }

    None
}

/// Six ASCII letters, e.g. `EURUSD`.
pub(crate) fn is_currency_pair(symbol: &str) -> bool {
    symbol.len() == 6 && symbol.chars().all(|c| c.is_ascii_alphabetic())
}
