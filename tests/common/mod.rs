//! Shared in-process providers for integration tests.

#![allow(dead_code)]

use augur::config::{EngineConfig, FetchPolicy};
use augur::sources::{FetchError, HistoryQuery, HistorySource};
use augur::{Bar, Series, SignalPolicy, Timeframe};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Serves canned series per timeframe and records every call.
pub struct MockSource {
    name: &'static str,
    series: HashMap<Timeframe, Series>,
    failure: Option<FetchError>,
    calls: AtomicU32,
    credentials: Mutex<Vec<Option<String>>>,
}

impl MockSource {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            series: HashMap::new(),
            failure: None,
            calls: AtomicU32::new(0),
            credentials: Mutex::new(Vec::new()),
        }
    }

    pub fn with(mut self, timeframe: Timeframe, series: Series) -> Self {
        self.series.insert(timeframe, series);
        self
    }

    pub fn failing(mut self, error: FetchError) -> Self {
        self.failure = Some(error);
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn credentials_seen(&self) -> Vec<Option<String>> {
        self.credentials.lock().unwrap().clone()
    }
}

impl HistorySource for MockSource {
    fn name(&self) -> &'static str {
        self.name
    }

    fn fetch<'a>(&'a self, query: &'a HistoryQuery) -> BoxFuture<'a, Result<Series, FetchError>> {
        async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.credentials
                .lock()
                .unwrap()
                .push(query.credentials.clone());
            if let Some(error) = &self.failure {
                return Err(error.clone());
            }
            Ok(self
                .series
                .get(&query.timeframe)
                .cloned()
                .unwrap_or_default())
        }
        .boxed()
    }
}

/// `count` bars one minute apart, closes moving by `step` from `start`.
pub fn trend(count: usize, start: f64, step: f64) -> Series {
    trend_from(0, count, start, step)
}

/// Like [`trend`] but starting at bar index `offset`.
pub fn trend_from(offset: usize, count: usize, start: f64, step: f64) -> Series {
    Series::from_bars(
        (offset..offset + count)
            .map(|i| {
                let close = start + i as f64 * step;
                Bar {
                    time: i as i64 * 60_000,
                    open: close,
                    high: close + 0.5,
                    low: close - 0.5,
                    close,
                    volume: 1_000.0,
                }
            })
            .collect(),
    )
}

/// Engine settings with fast, single-attempt fetches.
pub fn engine_config(policy: SignalPolicy) -> EngineConfig {
    EngineConfig {
        policy,
        fetch: FetchPolicy {
            timeout: Duration::from_millis(500),
            attempts: 1,
            backoff: Duration::ZERO,
        },
        ..EngineConfig::default()
    }
}
