use chrono::{NaiveDate, TimeZone, Utc};
use std::env;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

use crate::types::{ProbabilityModel, SignalPolicy, Timeframe};

const DEFAULT_TIMEFRAMES: [Timeframe; 6] = [
    Timeframe::ThreeMonths,
    Timeframe::OneMonth,
    Timeframe::OneWeek,
    Timeframe::OneDay,
    Timeframe::OneHour,
    Timeframe::ThirtyMinutes,
];

const DEFAULT_PRIORITY: [Timeframe; 3] = [
    Timeframe::ThirtyMinutes,
    Timeframe::OneHour,
    Timeframe::OneDay,
];

const DEFAULT_BALANCE_TIERS: [f64; 7] = [100.0, 200.0, 500.0, 1000.0, 2000.0, 5000.0, 10000.0];

/// Provider call policy: per-call timeout and bounded retries.
#[derive(Debug, Clone)]
pub struct FetchPolicy {
    /// Timeout applied to every single provider call.
    pub timeout: Duration,
    /// Maximum attempts per call, including the first one.
    pub attempts: u32,
    /// Linear backoff step; attempt `n` waits `n * backoff` before retrying.
    pub backoff: Duration,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(15_000),
            attempts: 3,
            backoff: Duration::from_millis(250),
        }
    }
}

/// Read-only settings for the signal engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Timeframes evaluated for every request.
    pub timeframes: Vec<Timeframe>,
    /// Order in which timeframe snapshots are considered by the synthesizer.
    pub priority: Vec<Timeframe>,
    pub policy: SignalPolicy,
    pub probability_model: ProbabilityModel,
    /// Minimum valid bars for a timeframe to produce a frame.
    pub min_lookback: usize,
    pub balance_tiers: Vec<f64>,
    /// Start of the requested history, in seconds since the epoch.
    pub history_start: i64,
    pub fetch: FetchPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timeframes: DEFAULT_TIMEFRAMES.to_vec(),
            priority: DEFAULT_PRIORITY.to_vec(),
            policy: SignalPolicy::default(),
            probability_model: ProbabilityModel::default(),
            min_lookback: 50,
            balance_tiers: DEFAULT_BALANCE_TIERS.to_vec(),
            history_start: date_to_epoch("2020-01-01").unwrap_or(1_577_836_800),
            fetch: FetchPolicy::default(),
        }
    }
}

/// Yahoo Finance (primary provider) settings.
#[derive(Debug, Clone)]
pub struct YahooConfig {
    pub base_url: String,
    /// Suffix appended to six-letter currency pairs, e.g. `EURUSD=X`.
    pub fx_suffix: String,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            base_url: "https://query1.finance.yahoo.com".to_string(),
            fx_suffix: "=X".to_string(),
        }
    }
}

/// Deriv (secondary provider) settings.
#[derive(Debug, Clone)]
pub struct DerivConfig {
    pub ws_url: String,
    pub app_id: String,
    /// Fallback credential when a request carries none.
    pub api_token: Option<String>,
    /// Prefix for six-letter currency pairs, e.g. `frxEURUSD`.
    pub fx_prefix: String,
    /// Candles requested per call.
    pub candle_count: u32,
}

impl Default for DerivConfig {
    fn default() -> Self {
        Self {
            ws_url: "wss://ws.derivws.com/websockets/v3".to_string(),
            app_id: "1089".to_string(),
            api_token: None,
            fx_prefix: "frx".to_string(),
            candle_count: 1000,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    pub engine: EngineConfig,
    pub yahoo: YahooConfig,
    pub deriv: DerivConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = EngineConfig::default();

        let history_start = env::var("HISTORY_START")
            .ok()
            .and_then(|s| {
                let parsed = date_to_epoch(&s);
                if parsed.is_none() {
                    warn!("Ignoring invalid HISTORY_START '{}'", s);
                }
                parsed
            })
            .unwrap_or(defaults.history_start);

        let engine = EngineConfig {
            timeframes: env_list("SIGNAL_TIMEFRAMES", Timeframe::from_str)
                .unwrap_or(defaults.timeframes),
            priority: env_list("SIGNAL_PRIORITY", Timeframe::from_str)
                .unwrap_or(defaults.priority),
            policy: env_parse_with("SIGNAL_POLICY", SignalPolicy::from_str)
                .unwrap_or(defaults.policy),
            probability_model: env_parse_with("PROBABILITY_MODEL", ProbabilityModel::from_str)
                .unwrap_or(defaults.probability_model),
            min_lookback: env_parse("MIN_LOOKBACK_BARS").unwrap_or(defaults.min_lookback),
            balance_tiers: env_list("ACCOUNT_BALANCE_TIERS", |s| s.trim().parse::<f64>().ok())
                .unwrap_or(defaults.balance_tiers),
            history_start,
            fetch: FetchPolicy {
                timeout: env_parse("FETCH_TIMEOUT_MS")
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.fetch.timeout),
                attempts: env_parse::<u32>("FETCH_ATTEMPTS")
                    .map(|n| n.max(1))
                    .unwrap_or(defaults.fetch.attempts),
                backoff: env_parse("FETCH_RETRY_BACKOFF_MS")
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.fetch.backoff),
            },
        };

        let yahoo_defaults = YahooConfig::default();
        let yahoo = YahooConfig {
            base_url: env::var("YAHOO_BASE_URL").unwrap_or(yahoo_defaults.base_url),
            fx_suffix: env::var("YAHOO_FX_SUFFIX").unwrap_or(yahoo_defaults.fx_suffix),
        };

        let deriv_defaults = DerivConfig::default();
        let deriv = DerivConfig {
            ws_url: env::var("DERIV_WS_URL").unwrap_or(deriv_defaults.ws_url),
            app_id: env::var("DERIV_APP_ID").unwrap_or(deriv_defaults.app_id),
            api_token: env::var("DERIV_API_TOKEN").ok().filter(|t| !t.is_empty()),
            fx_prefix: env::var("DERIV_FX_PREFIX").unwrap_or(deriv_defaults.fx_prefix),
            candle_count: env_parse("DERIV_CANDLE_COUNT").unwrap_or(deriv_defaults.candle_count),
        };

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env_parse("PORT").unwrap_or(5000),
            engine,
            yahoo,
            deriv,
        }
    }
}

/// Parse a `YYYY-MM-DD` date as midnight UTC in seconds since the epoch.
pub fn date_to_epoch(s: &str) -> Option<i64> {
    let date = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()?;
    let midnight = date.and_hms_opt(0, 0, 0)?;
    Some(Utc.from_utc_datetime(&midnight).timestamp())
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("Ignoring invalid {} '{}'", key, raw);
            None
        }
    }
}

fn env_parse_with<T>(key: &str, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
    let raw = env::var(key).ok()?;
    let parsed = parse(&raw);
    if parsed.is_none() {
        warn!("Ignoring invalid {} '{}'", key, raw);
    }
    parsed
}

fn env_list<T>(key: &str, parse: impl Fn(&str) -> Option<T>) -> Option<Vec<T>> {
    let raw = env::var(key).ok()?;
    parse_list(&raw, parse).or_else(|| {
        warn!("Ignoring invalid {} '{}'", key, raw);
        None
    })
}

/// Parse a comma separated list; any bad entry rejects the whole list.
pub fn parse_list<T>(raw: &str, parse: impl Fn(&str) -> Option<T>) -> Option<Vec<T>> {
    let items: Option<Vec<T>> = raw
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|s| parse(s))
        .collect();
    items.filter(|v| !v.is_empty())
}
