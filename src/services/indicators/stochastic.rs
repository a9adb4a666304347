//! Stochastic Oscillator indicator.

use super::rolling_mean;

/// Slow Stochastic Oscillator.
///
/// Compares closing price to price range over a period:
/// fast %K = (Current Close - Lowest Low) / (Highest High - Lowest Low) * 100
///
/// Slow %K is the SMA of fast %K over `k_smoothing` bars, and %D is the SMA
/// of slow %K over `d_period` bars.
///
/// Signals:
/// - Below 20: Oversold (bullish)
/// - Above 80: Overbought (bearish)
pub struct Stochastic {
    k_period: usize,
    k_smoothing: usize,
    d_period: usize,
}

impl Default for Stochastic {
    fn default() -> Self {
        Self {
            k_period: 14,
            k_smoothing: 3,
            d_period: 3,
        }
    }
}

/// Slow %K and %D, aligned to the input bars.
#[derive(Debug, Clone, PartialEq)]
pub struct StochasticSeries {
    pub k: Vec<Option<f64>>,
    pub d: Vec<Option<f64>>,
}

impl Stochastic {
    pub fn new(k_period: usize, k_smoothing: usize, d_period: usize) -> Self {
        Self {
            k_period,
            k_smoothing,
            d_period,
        }
    }

    fn fast_k(&self, highs: &[f64], lows: &[f64], closes: &[f64]) -> Vec<Option<f64>> {
        let len = closes.len().min(highs.len()).min(lows.len());
        let mut out = vec![None; closes.len()];
        if self.k_period == 0 {
            return out;
        }

        for i in (self.k_period.saturating_sub(1))..len {
            let start = i + 1 - self.k_period;
            let lowest_low = lows[start..=i].iter().copied().fold(f64::INFINITY, f64::min);
            let highest_high = highs[start..=i]
                .iter()
                .copied()
                .fold(f64::NEG_INFINITY, f64::max);

            out[i] = Some(if highest_high != lowest_low {
                ((closes[i] - lowest_low) / (highest_high - lowest_low)) * 100.0
            } else {
                50.0
            });
        }

        out
    }

    pub fn compute(&self, highs: &[f64], lows: &[f64], closes: &[f64]) -> StochasticSeries {
        let fast_k = self.fast_k(highs, lows, closes);
        let k = rolling_mean(&fast_k, self.k_smoothing);
        let d = rolling_mean(&k, self.d_period);
        StochasticSeries { k, d }
    }
}
