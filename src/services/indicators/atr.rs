//! Average True Range (ATR) indicator.

/// ATR (Average True Range) indicator.
///
/// Measures market volatility by calculating the average of true ranges:
/// TR = max(High-Low, |High-PrevClose|, |Low-PrevClose|)
///
/// Wilder's smoothing. The first true range needs a previous close, so the
/// first value lands on bar `period`.
pub struct Atr {
    period: usize,
}

impl Default for Atr {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl Atr {
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    fn true_range(high: f64, low: f64, prev_close: f64) -> f64 {
        let hl = high - low;
        let hc = (high - prev_close).abs();
        let lc = (low - prev_close).abs();
        hl.max(hc).max(lc)
    }

    pub fn compute(&self, highs: &[f64], lows: &[f64], closes: &[f64]) -> Vec<Option<f64>> {
        let period = self.period;
        let len = closes.len().min(highs.len()).min(lows.len());
        let mut out = vec![None; closes.len()];
        if period == 0 || len < period + 1 {
            return out;
        }

        // true_ranges[i] belongs to bar i + 1
        let true_ranges: Vec<f64> = (1..len)
            .map(|i| Self::true_range(highs[i], lows[i], closes[i - 1]))
            .collect();

        let mut atr = true_ranges.iter().take(period).sum::<f64>() / period as f64;
        out[period] = Some(atr);

        for i in period..true_ranges.len() {
            atr = (atr * (period - 1) as f64 + true_ranges[i]) / period as f64;
            out[i + 1] = Some(atr);
        }

        out
    }
}
