//! Bollinger Bands indicator.

use super::Sma;

/// Bollinger Bands indicator.
///
/// Consists of:
/// - Middle band: SMA(20)
/// - Upper band: SMA + 2 * StdDev
/// - Lower band: SMA - 2 * StdDev
///
/// StdDev is the population standard deviation of the window.
pub struct BollingerBands {
    period: usize,
    std_dev_multiplier: f64,
}

impl Default for BollingerBands {
    fn default() -> Self {
        Self {
            period: 20,
            std_dev_multiplier: 2.0,
        }
    }
}

/// Upper, middle and lower bands, aligned to the input bars.
#[derive(Debug, Clone, PartialEq)]
pub struct BollingerSeries {
    pub upper: Vec<Option<f64>>,
    pub middle: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
}

impl BollingerBands {
    pub fn new(period: usize, std_dev_multiplier: f64) -> Self {
        Self {
            period,
            std_dev_multiplier,
        }
    }

    fn std_dev(values: &[f64], mean: f64) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        let variance: f64 =
            values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
        variance.sqrt()
    }

    pub fn compute(&self, closes: &[f64]) -> BollingerSeries {
        let middle = Sma::new(self.period).compute(closes);
        let mut upper = vec![None; closes.len()];
        let mut lower = vec![None; closes.len()];

        for (i, mean) in middle.iter().enumerate() {
            if let Some(mean) = *mean {
                let window = &closes[(i + 1 - self.period)..=i];
                let band = Self::std_dev(window, mean) * self.std_dev_multiplier;
                upper[i] = Some(mean + band);
                lower[i] = Some(mean - band);
            }
        }

        BollingerSeries {
            upper,
            middle,
            lower,
        }
    }
}
