//! Per-timeframe indicator pipeline.
//!
//! Turns a reconciled series into an [`IndicatorFrame`]: the valid bars plus
//! indicator columns, a long/flat signal column and its per-bar change.

use tracing::debug;

use super::indicators::{Atr, BollingerBands, Ema, Macd, Obv, Rsi, Sma, Stochastic};
use crate::types::{Bar, Series, SignalPolicy, Timeframe, TimeframeSnapshot};

const FAST_PERIOD: usize = 50;
const SLOW_PERIOD: usize = 200;
const RSI_OVERSOLD: f64 = 30.0;

/// Indicator columns aligned to the frame's bars.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorColumns {
    pub fast_ma: Vec<Option<f64>>,
    pub slow_ma: Vec<Option<f64>>,
    pub rsi: Vec<Option<f64>>,
    pub macd_line: Vec<Option<f64>>,
    pub macd_signal: Vec<Option<f64>>,
    pub macd_histogram: Vec<Option<f64>>,
    pub bollinger_upper: Vec<Option<f64>>,
    pub bollinger_middle: Vec<Option<f64>>,
    pub bollinger_lower: Vec<Option<f64>>,
    pub stoch_k: Vec<Option<f64>>,
    pub stoch_d: Vec<Option<f64>>,
    pub atr: Vec<Option<f64>>,
    pub obv: Vec<Option<f64>>,
}

impl IndicatorColumns {
    fn compute(series: &Series, policy: SignalPolicy) -> Self {
        let closes = series.closes();
        let highs = series.highs();
        let lows = series.lows();
        let volumes = series.volumes();

        let fast_ma = match policy {
            SignalPolicy::Crossover => Sma::new(FAST_PERIOD).compute(&closes),
            SignalPolicy::Confluence => Ema::new(FAST_PERIOD).compute(&closes),
        };
        let slow_ma = Sma::new(SLOW_PERIOD).compute(&closes);
        let macd = Macd::default().compute(&closes);
        let bollinger = BollingerBands::default().compute(&closes);
        let stochastic = Stochastic::default().compute(&highs, &lows, &closes);

        Self {
            fast_ma,
            slow_ma,
            rsi: Rsi::default().compute(&closes),
            macd_line: macd.line,
            macd_signal: macd.signal,
            macd_histogram: macd.histogram,
            bollinger_upper: bollinger.upper,
            bollinger_middle: bollinger.middle,
            bollinger_lower: bollinger.lower,
            stoch_k: stochastic.k,
            stoch_d: stochastic.d,
            atr: Atr::default().compute(&highs, &lows, &closes),
            obv: Obv.compute(&closes, &volumes),
        }
    }
}

/// A series extended with indicator and signal columns.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorFrame {
    pub policy: SignalPolicy,
    pub bars: Vec<Bar>,
    pub columns: IndicatorColumns,
    /// 1 = long, 0 = flat.
    pub signal: Vec<u8>,
    /// `signal[i] - signal[i - 1]`; `None` on the first bar.
    pub position: Vec<Option<i8>>,
}

impl IndicatorFrame {
    /// Build a frame, or `None` when fewer than `min_lookback` valid bars remain.
    pub fn compute(series: &Series, policy: SignalPolicy, min_lookback: usize) -> Option<Self> {
        let valid = series.valid_only();
        let dropped = series.len() - valid.len();
        if dropped > 0 {
            debug!("Dropped {} invalid bars", dropped);
        }

        if valid.is_empty() || valid.len() < min_lookback {
            debug!(
                "Only {} valid bars, need {}; no frame",
                valid.len(),
                min_lookback
            );
            return None;
        }

        let columns = IndicatorColumns::compute(&valid, policy);
        let signal: Vec<u8> = (0..valid.len())
            .map(|i| signal_at(policy, &valid.bars()[i], &columns, i))
            .collect();
        let position = positions(&signal);

        Some(Self {
            policy,
            bars: valid.into_bars(),
            columns,
            signal,
            position,
        })
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// The last row of the frame.
    pub fn snapshot(&self, timeframe: Timeframe) -> Option<TimeframeSnapshot> {
        let i = self.bars.len().checked_sub(1)?;
        let bar = &self.bars[i];
        let c = &self.columns;

        Some(TimeframeSnapshot {
            timeframe,
            policy: self.policy,
            time: bar.time,
            close: bar.close,
            signal: self.signal[i],
            position: self.position[i],
            fast_ma: c.fast_ma[i],
            slow_ma: c.slow_ma[i],
            rsi: c.rsi[i],
            macd_histogram: c.macd_histogram[i],
            bollinger_lower: c.bollinger_lower[i],
            stoch_k: c.stoch_k[i],
            stoch_d: c.stoch_d[i],
            atr: c.atr[i],
            obv: c.obv[i],
            bars: self.bars.len(),
        })
    }
}

/// Long/flat decision for bar `i`. Conditions with warm-up inputs are false.
fn signal_at(policy: SignalPolicy, bar: &Bar, c: &IndicatorColumns, i: usize) -> u8 {
    let long = match policy {
        SignalPolicy::Crossover => matches!(
            (c.fast_ma[i], c.slow_ma[i]),
            (Some(fast), Some(slow)) if fast > slow
        ),
        SignalPolicy::Confluence => {
            let close = bar.close;
            let above_fast = c.fast_ma[i].is_some_and(|fast| close > fast);
            let oversold = c.rsi[i].is_some_and(|rsi| rsi < RSI_OVERSOLD);
            let momentum = c.macd_histogram[i].is_some_and(|h| h > 0.0);
            let below_band = c.bollinger_lower[i].is_some_and(|lower| close < lower);
            let stoch_cross = matches!(
                (c.stoch_k[i], c.stoch_d[i]),
                (Some(k), Some(d)) if k < d
            );
            above_fast && oversold && momentum && below_band && stoch_cross
        }
    };
    u8::from(long)
}

fn positions(signal: &[u8]) -> Vec<Option<i8>> {
    signal
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let prev = *signal.get(i.checked_sub(1)?)?;
            Some(*s as i8 - prev as i8)
        })
        .collect()
}
