//! Yahoo Finance chart API client, the primary history provider.
//!
//! Bulk history for stocks, ETFs and FX pairs. Uses the unofficial chart
//! endpoint, which has no rate limits but caps intraday lookback per interval.

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{is_currency_pair, FetchError, HistoryQuery, HistorySource};
use crate::config::YahooConfig;
use crate::types::{Bar, Series, Timeframe};

/// Yahoo Finance chart response.
#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct YahooResult {
    timestamp: Option<Vec<i64>>,
    indicators: YahooIndicators,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    quote: Vec<YahooQuote>,
}

#[derive(Debug, Deserialize)]
struct YahooQuote {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<f64>>>,
}

/// Map a symbol to Yahoo's ticker convention.
/// Currency pairs get the FX suffix (EURUSD=X); share classes use hyphens (BRK-B).
fn normalize_yahoo_symbol(symbol: &str, fx_suffix: &str) -> String {
    let upper = symbol.trim().to_uppercase();
    if is_currency_pair(&upper) {
        format!("{}{}", upper, fx_suffix)
    } else {
        upper.replace('.', "-")
    }
}

/// Yahoo interval parameter for a timeframe.
fn yahoo_interval(timeframe: Timeframe) -> &'static str {
    match timeframe {
        Timeframe::OneMinute => "1m",
        Timeframe::FiveMinutes => "5m",
        Timeframe::FifteenMinutes => "15m",
        Timeframe::ThirtyMinutes => "30m",
        Timeframe::OneHour => "60m",
        Timeframe::OneDay => "1d",
        Timeframe::OneWeek => "1wk",
        Timeframe::OneMonth => "1mo",
        Timeframe::ThreeMonths => "3mo",
    }
}

/// Furthest back Yahoo serves each intraday interval, in days.
fn max_lookback_days(timeframe: Timeframe) -> Option<i64> {
    match timeframe {
        Timeframe::OneMinute => Some(7),
        Timeframe::FiveMinutes | Timeframe::FifteenMinutes | Timeframe::ThirtyMinutes => Some(60),
        Timeframe::OneHour => Some(730),
        _ => None,
    }
}

/// Clamp the start of a range to what Yahoo serves for the interval.
fn clamp_start(timeframe: Timeframe, start: i64, end: i64) -> i64 {
    match max_lookback_days(timeframe) {
        // One day of slack: Yahoo rejects ranges that touch the limit exactly.
        Some(days) => start.max(end - (days - 1) * 86_400),
        None => start,
    }
}

/// Convert a chart response into a series.
fn parse_chart(data: YahooChartResponse) -> Result<Series, FetchError> {
    if let Some(error) = data.chart.error {
        return Err(FetchError::Provider(format!(
            "{} - {}",
            error.code, error.description
        )));
    }

    let result = data
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or(FetchError::Empty)?;

    let timestamps = result.timestamp.unwrap_or_default();
    if timestamps.is_empty() {
        return Err(FetchError::Empty);
    }

    let quote = result
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| FetchError::Malformed("no quote data".to_string()))?;

    let opens = quote.open.unwrap_or_default();
    let highs = quote.high.unwrap_or_default();
    let lows = quote.low.unwrap_or_default();
    let closes = quote.close.unwrap_or_default();
    let volumes = quote.volume.unwrap_or_default();

    let field = |values: &[Option<f64>], i: usize| values.get(i).copied().flatten().unwrap_or(f64::NAN);

    let bars = timestamps
        .iter()
        .enumerate()
        .map(|(i, &timestamp)| Bar {
            time: timestamp * 1000,
            open: field(&opens, i),
            high: field(&highs, i),
            low: field(&lows, i),
            close: field(&closes, i),
            volume: volumes.get(i).copied().flatten().unwrap_or(0.0),
        })
        .collect();

    Ok(Series::from_bars(bars))
}

/// Yahoo Finance API client.
pub struct YahooFinanceClient {
    client: Client,
    config: YahooConfig,
}

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client.
    pub fn new(config: YahooConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| FetchError::Network(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn chart_url(&self, query: &HistoryQuery) -> String {
        let ticker = normalize_yahoo_symbol(&query.symbol, &self.config.fx_suffix);
        let start = clamp_start(query.timeframe, query.start, query.end);
        format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval={}&includePrePost=false",
            self.config.base_url.trim_end_matches('/'),
            ticker,
            start,
            query.end,
            yahoo_interval(query.timeframe)
        )
    }

    /// Fetch historical bars for a query.
    pub async fn get_historical_data(&self, query: &HistoryQuery) -> Result<Series, FetchError> {
        let url = self.chart_url(query);
        debug!("Fetching Yahoo Finance data: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_server_error() || status.as_u16() == 429 {
            return Err(FetchError::Provider(format!("HTTP {}", status)));
        }

        // Yahoo reports bad symbols and ranges as 4xx with a chart error body.
        let data: YahooChartResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Malformed(e.to_string()))?;

        parse_chart(data)
    }
}

impl HistorySource for YahooFinanceClient {
    fn name(&self) -> &'static str {
        "Yahoo"
    }

    fn fetch<'a>(&'a self, query: &'a HistoryQuery) -> BoxFuture<'a, Result<Series, FetchError>> {
        self.get_historical_data(query).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> YahooFinanceClient {
        YahooFinanceClient::new(YahooConfig::default()).unwrap()
    }

    // =========================================================================
    // normalize_yahoo_symbol Tests
    // =========================================================================

    #[test]
    fn test_normalize_currency_pair_gets_suffix() {
        assert_eq!(normalize_yahoo_symbol("EURUSD", "=X"), "EURUSD=X");
        assert_eq!(normalize_yahoo_symbol("gbpjpy", "=X"), "GBPJPY=X");
    }

    #[test]
    fn test_normalize_stock_symbol() {
        assert_eq!(normalize_yahoo_symbol("aapl", "=X"), "AAPL");
        assert_eq!(normalize_yahoo_symbol("BRK.B", "=X"), "BRK-B");
    }

    // =========================================================================
    // Range Tests
    // =========================================================================

    #[test]
    fn test_clamp_start_intraday() {
        let end = 1_700_000_000;
        let clamped = clamp_start(Timeframe::ThirtyMinutes, 0, end);
        assert_eq!(clamped, end - 59 * 86_400);
    }

    #[test]
    fn test_clamp_start_keeps_recent_start() {
        let end = 1_700_000_000;
        let start = end - 86_400;
        assert_eq!(clamp_start(Timeframe::OneHour, start, end), start);
    }

    #[test]
    fn test_clamp_start_daily_untouched() {
        assert_eq!(clamp_start(Timeframe::OneDay, 0, 1_700_000_000), 0);
    }

    #[test]
    fn test_chart_url() {
        let query = HistoryQuery {
            symbol: "EURUSD".to_string(),
            timeframe: Timeframe::OneDay,
            start: 1_577_836_800,
            end: 1_700_000_000,
            credentials: None,
        };
        let url = client().chart_url(&query);
        assert_eq!(
            url,
            "https://query1.finance.yahoo.com/v8/finance/chart/EURUSD=X?period1=1577836800&period2=1700000000&interval=1d&includePrePost=false"
        );
    }

    // =========================================================================
    // parse_chart Tests
    // =========================================================================

    #[test]
    fn test_parse_chart_builds_bars() {
        let json = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1700000060, 1700000000],
                    "indicators": {"quote": [{
                        "open": [1.2, 1.1],
                        "high": [1.3, 1.2],
                        "low": [1.1, 1.0],
                        "close": [1.25, 1.15],
                        "volume": [null, 500]
                    }]}
                }],
                "error": null
            }
        }"#;
        let data: YahooChartResponse = serde_json::from_str(json).unwrap();
        let series = parse_chart(data).unwrap();
        assert_eq!(series.len(), 2);
        let first = series.bars()[0];
        assert_eq!(first.time, 1_700_000_000_000);
        assert_eq!(first.close, 1.15);
        assert_eq!(first.volume, 500.0);
        assert_eq!(series.bars()[1].volume, 0.0);
    }

    #[test]
    fn test_parse_chart_null_prices_become_nan() {
        let json = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1700000000],
                    "indicators": {"quote": [{
                        "open": [null], "high": [1.0], "low": [1.0], "close": [1.0]
                    }]}
                }],
                "error": null
            }
        }"#;
        let data: YahooChartResponse = serde_json::from_str(json).unwrap();
        let series = parse_chart(data).unwrap();
        assert!(series.bars()[0].open.is_nan());
        assert!(!series.bars()[0].is_valid());
    }

    #[test]
    fn test_parse_chart_error_is_provider_failure() {
        let json = r#"{
            "chart": {
                "result": null,
                "error": {"code": "Not Found", "description": "No data found"}
            }
        }"#;
        let data: YahooChartResponse = serde_json::from_str(json).unwrap();
        let err = parse_chart(data).unwrap_err();
        assert_eq!(err, FetchError::Provider("Not Found - No data found".to_string()));
    }

    #[test]
    fn test_parse_chart_without_timestamps_is_empty() {
        let json = r#"{
            "chart": {
                "result": [{"indicators": {"quote": [{}]}}],
                "error": null
            }
        }"#;
        let data: YahooChartResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parse_chart(data).unwrap_err(), FetchError::Empty);
    }
}
