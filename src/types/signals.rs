use serde::{Deserialize, Serialize};
use std::fmt;

use super::Timeframe;

/// Rule that turns an indicator frame into a per-bar long/flat signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SignalPolicy {
    /// Trend following: long while the fast average is above the slow one.
    Crossover,
    /// Mean reversion: long only when every oversold condition lines up.
    #[default]
    Confluence,
}

impl SignalPolicy {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "crossover" | "sma_crossover" => Some(Self::Crossover),
            "confluence" => Some(Self::Confluence),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Crossover => "crossover",
            Self::Confluence => "confluence",
        }
    }
}

impl fmt::Display for SignalPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How the confidence probability is derived from a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProbabilityModel {
    /// ATR relative to a 10%-of-price volatility ceiling.
    #[default]
    Atr,
    /// Relative separation of the fast and slow moving averages.
    MaDivergence,
}

impl ProbabilityModel {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "atr" => Some(Self::Atr),
            "ma_divergence" | "divergence" | "ma" => Some(Self::MaDivergence),
            _ => None,
        }
    }

    /// The model used when this one lacks inputs.
    pub fn alternate(&self) -> Self {
        match self {
            Self::Atr => Self::MaDivergence,
            Self::MaDivergence => Self::Atr,
        }
    }
}

/// Recommended trade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Buy,
    Sell,
    Hold,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
            Self::Hold => "hold",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Last bar of an indicator frame: the only row the synthesizer reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeframeSnapshot {
    pub timeframe: Timeframe,
    pub policy: SignalPolicy,
    pub time: i64,
    pub close: f64,
    /// 1 = long, 0 = flat.
    pub signal: u8,
    /// Change in signal from the previous bar; nonzero marks a transition.
    pub position: Option<i8>,
    pub fast_ma: Option<f64>,
    pub slow_ma: Option<f64>,
    pub rsi: Option<f64>,
    pub macd_histogram: Option<f64>,
    pub bollinger_lower: Option<f64>,
    pub stoch_k: Option<f64>,
    pub stoch_d: Option<f64>,
    pub atr: Option<f64>,
    pub obv: Option<f64>,
    /// Number of valid bars the frame was computed from.
    pub bars: usize,
}

impl TimeframeSnapshot {
    pub fn is_long(&self) -> bool {
        self.signal == 1
    }
}
