//! Deriv WebSocket API client, the secondary history provider.
//!
//! Used to fill gaps when Yahoo returns nothing or too little. Each fetch opens
//! a short-lived WebSocket session, optionally authorizes, requests candles via
//! `ticks_history` and closes.

use futures_util::future::BoxFuture;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{FutureExt, SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::debug;

use super::{is_currency_pair, FetchError, HistoryQuery, HistorySource};
use crate::config::DerivConfig;
use crate::types::{Bar, Series, Timeframe};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Deriv API response envelope.
#[derive(Debug, Deserialize)]
struct DerivResponse {
    msg_type: Option<String>,
    error: Option<DerivError>,
    candles: Option<Vec<DerivCandle>>,
}

#[derive(Debug, Deserialize)]
struct DerivError {
    code: String,
    message: String,
}

#[derive(Debug, Deserialize)]
struct DerivCandle {
    epoch: i64,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
}

/// Map a symbol to Deriv's convention: currency pairs become `frxEURUSD`,
/// synthetic indices such as `R_50` pass through.
fn normalize_deriv_symbol(symbol: &str, fx_prefix: &str) -> String {
    let trimmed = symbol.trim();
    if is_currency_pair(trimmed) {
        format!("{}{}", fx_prefix, trimmed.to_uppercase())
    } else {
        trimmed.to_string()
    }
}

/// Candle granularity in seconds. Deriv has no weekly or monthly candles.
fn granularity(timeframe: Timeframe) -> Option<i64> {
    match timeframe {
        Timeframe::OneMinute
        | Timeframe::FiveMinutes
        | Timeframe::FifteenMinutes
        | Timeframe::ThirtyMinutes
        | Timeframe::OneHour
        | Timeframe::OneDay => Some(timeframe.seconds()),
        _ => None,
    }
}

fn ticks_history_request(symbol: &str, granularity: i64, start: i64, count: u32) -> Value {
    json!({
        "ticks_history": symbol,
        "adjust_start_time": 1,
        "count": count,
        "end": "latest",
        "start": start,
        "style": "candles",
        "granularity": granularity,
    })
}

fn provider_error(error: DerivError) -> FetchError {
    match error.code.as_str() {
        "InvalidToken" | "AuthorizationRequired" | "PermissionDenied" => {
            FetchError::Unauthorized(error.message)
        }
        _ => FetchError::Provider(format!("{}: {}", error.code, error.message)),
    }
}

/// Convert a candles response into a series.
fn parse_candles(response: DerivResponse) -> Result<Series, FetchError> {
    if let Some(error) = response.error {
        return Err(provider_error(error));
    }

    let candles = response.candles.ok_or(FetchError::Empty)?;
    if candles.is_empty() {
        return Err(FetchError::Empty);
    }

    let bars = candles
        .into_iter()
        .map(|c| Bar {
            time: c.epoch * 1000,
            open: c.open,
            high: c.high,
            low: c.low,
            close: c.close,
            volume: 0.0,
        })
        .collect();

    Ok(Series::from_bars(bars))
}

/// Deriv WebSocket client.
#[derive(Clone)]
pub struct DerivClient {
    config: DerivConfig,
}

impl DerivClient {
    /// Create a new Deriv client.
    pub fn new(config: DerivConfig) -> Self {
        Self { config }
    }

    /// Connection URL with the `app_id` query. The request target always has
    /// a path, so a bare host gets `/`.
    fn endpoint(&self) -> String {
        let base = self.config.ws_url.trim();
        let authority = base.find("://").map_or(0, |i| i + 3);
        let path = if base[authority..].contains('/') { "" } else { "/" };
        let separator = if base.contains('?') { '&' } else { '?' };
        format!("{}{}{}app_id={}", base, path, separator, self.config.app_id)
    }

    /// Fetch candles for a query over a fresh WebSocket session.
    pub async fn get_candles(&self, query: &HistoryQuery) -> Result<Series, FetchError> {
        let granularity =
            granularity(query.timeframe).ok_or(FetchError::Unsupported(query.timeframe))?;
        let symbol = normalize_deriv_symbol(&query.symbol, &self.config.fx_prefix);

        debug!(
            "Fetching Deriv candles for {} at {}s granularity",
            symbol, granularity
        );

        let (ws_stream, _) = connect_async(self.endpoint())
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;
        let (mut write, mut read) = ws_stream.split();

        let token = query
            .credentials
            .as_deref()
            .or(self.config.api_token.as_deref());
        if let Some(token) = token {
            let reply = exchange(&mut write, &mut read, json!({ "authorize": token }), "authorize").await?;
            if let Some(error) = reply.error {
                return Err(provider_error(error));
            }
        }

        let request = ticks_history_request(&symbol, granularity, query.start, self.config.candle_count);
        let reply = exchange(&mut write, &mut read, request, "candles").await?;

        let _ = write.send(Message::Close(None)).await;

        parse_candles(reply)
    }
}

/// Send one request and wait for the reply with the expected `msg_type`
/// (or an error reply).
async fn exchange(
    write: &mut SplitSink<WsStream, Message>,
    read: &mut SplitStream<WsStream>,
    request: Value,
    expected: &str,
) -> Result<DerivResponse, FetchError> {
    write
        .send(Message::Text(request.to_string()))
        .await
        .map_err(|e| FetchError::Network(e.to_string()))?;

    while let Some(msg) = read.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                let response: DerivResponse = serde_json::from_str(&text)
                    .map_err(|e| FetchError::Malformed(e.to_string()))?;
                if response.error.is_some() || response.msg_type.as_deref() == Some(expected) {
                    return Ok(response);
                }
                debug!("Skipping Deriv message of type {:?}", response.msg_type);
            }
            Ok(Message::Ping(data)) => {
                let _ = write.send(Message::Pong(data)).await;
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => return Err(FetchError::Network(e.to_string())),
        }
    }

    Err(FetchError::Network("connection closed before reply".to_string()))
}

impl HistorySource for DerivClient {
    fn name(&self) -> &'static str {
        "Deriv"
    }

    fn fetch<'a>(&'a self, query: &'a HistoryQuery) -> BoxFuture<'a, Result<Series, FetchError>> {
        self.get_candles(query).boxed()
    }
}
