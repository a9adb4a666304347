//! Simple Moving Average (SMA) indicator.

use super::rolling_mean;

/// SMA (Simple Moving Average) indicator.
///
/// Unweighted mean of the last `period` values. Defined from bar `period - 1`.
pub struct Sma {
    period: usize,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    pub fn compute(&self, values: &[f64]) -> Vec<Option<f64>> {
        let values: Vec<Option<f64>> = values.iter().map(|v| Some(*v)).collect();
        rolling_mean(&values, self.period)
    }
}
