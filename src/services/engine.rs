//! Request orchestration: fetch, reconcile, compute, synthesize, size.

use chrono::Utc;
use futures_util::future::join_all;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::pipeline::IndicatorFrame;
use super::reconcile::{needs_secondary, reconcile};
use super::{risk, synthesizer};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::sources::{fetch_with_retry, HistoryQuery, HistorySource};
use crate::types::{RiskParams, Series, Timeframe, TimeframeSnapshot, TradeRecommendation};

/// What happened in one timeframe lane.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaneReport {
    pub timeframe: Timeframe,
    /// Bars returned by the primary provider (0 when absent).
    pub primary_bars: usize,
    /// Bars returned by the secondary provider (0 when not asked or absent).
    pub secondary_bars: usize,
    /// Providers that contributed bars, primary first.
    pub sources: Vec<&'static str>,
    pub snapshot: Option<TimeframeSnapshot>,
}

/// Lane reports plus the recommendation derived from them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub lanes: Vec<LaneReport>,
    pub recommendation: TradeRecommendation,
}

/// Multi-timeframe signal engine.
///
/// Holds only read-only configuration and the provider clients, so one
/// instance is shared by all requests.
pub struct SignalEngine {
    primary: Arc<dyn HistorySource>,
    secondary: Arc<dyn HistorySource>,
    config: EngineConfig,
}

impl SignalEngine {
    pub fn new(
        primary: Arc<dyn HistorySource>,
        secondary: Arc<dyn HistorySource>,
        config: EngineConfig,
    ) -> Self {
        Self {
            primary,
            secondary,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run every configured timeframe and synthesize a recommendation.
    ///
    /// `credentials` is forwarded to the secondary provider only.
    pub async fn analyze(
        &self,
        symbol: &str,
        params: &RiskParams,
        credentials: Option<&str>,
    ) -> Result<Analysis, EngineError> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(EngineError::EmptySymbol);
        }
        risk::validate(params)?;
        if self.config.timeframes.is_empty() {
            return Err(EngineError::NoTimeframes);
        }

        let end = Utc::now().timestamp();
        let lanes = join_all(
            self.config
                .timeframes
                .iter()
                .map(|tf| self.run_lane(symbol, *tf, credentials, end)),
        )
        .await;

        let snapshots: HashMap<Timeframe, TimeframeSnapshot> = lanes
            .iter()
            .filter_map(|lane| lane.snapshot.clone().map(|s| (lane.timeframe, s)))
            .collect();

        let recommendation = self.recommend(symbol, &snapshots, params);
        Ok(Analysis {
            lanes,
            recommendation,
        })
    }

    /// Synthesize and size a recommendation from precomputed snapshots.
    pub fn recommend(
        &self,
        symbol: &str,
        snapshots: &HashMap<Timeframe, TimeframeSnapshot>,
        params: &RiskParams,
    ) -> TradeRecommendation {
        let synthesis = synthesizer::synthesize(
            snapshots,
            &self.config.priority,
            self.config.probability_model,
        );
        let plan = risk::size(
            synthesis.probability,
            synthesis.direction,
            synthesis.entry_price,
            params,
            &self.config.balance_tiers,
        );

        info!(
            "{}: {} at {:?} from {} (probability {}%)",
            symbol,
            synthesis.direction,
            synthesis.entry_price,
            synthesis.timeframe_used(),
            synthesis.probability
        );

        TradeRecommendation {
            symbol: symbol.to_string(),
            direction: synthesis.direction,
            entry_price: synthesis.entry_price,
            stop_loss: plan.stop_loss,
            take_profit: plan.take_profit,
            probability: synthesis.probability,
            timeframe_used: synthesis.timeframe_used(),
            signal_policy: synthesis.policy,
            lot_sizes: plan.lot_sizes,
        }
    }

    /// One timeframe: primary, optional secondary, reconcile, compute.
    async fn run_lane(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        credentials: Option<&str>,
        end: i64,
    ) -> LaneReport {
        let min_lookback = self.config.min_lookback;
        let query = HistoryQuery {
            symbol: symbol.to_string(),
            timeframe,
            start: self.config.history_start,
            end,
            credentials: None,
        };

        let primary = fetch_with_retry(self.primary.as_ref(), &query, &self.config.fetch).await;

        let secondary = if needs_secondary(primary.as_ref(), min_lookback) {
            info!(
                "[{}] {} {} has {} valid bars, falling back to {}",
                self.primary.name(),
                symbol,
                timeframe,
                primary.as_ref().map_or(0, |s| s.valid_only().len()),
                self.secondary.name()
            );
            let query = HistoryQuery {
                credentials: credentials.map(str::to_string),
                ..query
            };
            fetch_with_retry(self.secondary.as_ref(), &query, &self.config.fetch).await
        } else {
            None
        };

        let primary_bars = primary.as_ref().map_or(0, Series::len);
        let secondary_bars = secondary.as_ref().map_or(0, Series::len);
        let mut sources = Vec::new();
        if primary_bars > 0 {
            sources.push(self.primary.name());
        }
        if secondary_bars > 0 {
            sources.push(self.secondary.name());
        }

        let snapshot = reconcile(primary, secondary)
            .and_then(|series| IndicatorFrame::compute(&series, self.config.policy, min_lookback))
            .and_then(|frame| frame.snapshot(timeframe));

        match &snapshot {
            Some(s) => debug!(
                "{} {}: signal {} position {:?} over {} bars",
                symbol, timeframe, s.signal, s.position, s.bars
            ),
            None => warn!(
                "Dropping {} for {}: not enough data ({} primary, {} secondary bars)",
                timeframe, symbol, primary_bars, secondary_bars
            ),
        }

        LaneReport {
            timeframe,
            primary_bars,
            secondary_bars,
            sources,
            snapshot,
        }
    }
}
