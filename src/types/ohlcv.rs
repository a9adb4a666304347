use serde::{Deserialize, Serialize};

/// OHLCV bar for one trading interval.
///
/// `time` is the bar open time in milliseconds since the epoch. Missing
/// provider values are carried as `NaN` and dropped by the indicator pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// Whether every price and volume field is finite and non-negative.
    pub fn is_valid(&self) -> bool {
        [self.open, self.high, self.low, self.close, self.volume]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0)
    }
}

/// Bars ordered by strictly increasing `time`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    bars: Vec<Bar>,
}

impl Series {
    /// Build a series, sorting by time and keeping the first bar seen for any
    /// duplicated timestamp.
    pub fn from_bars(mut bars: Vec<Bar>) -> Self {
        // Stable sort keeps insertion order among equal timestamps.
        bars.sort_by_key(|b| b.time);
        bars.dedup_by_key(|b| b.time);
        Self { bars }
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn into_bars(self) -> Vec<Bar> {
        self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Copy of the series without bars that have missing or negative fields.
    pub fn valid_only(&self) -> Self {
        Self {
            bars: self.bars.iter().filter(|b| b.is_valid()).copied().collect(),
        }
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }
}
