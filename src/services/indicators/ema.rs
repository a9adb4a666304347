//! Exponential Moving Average (EMA) indicator.

/// EMA (Exponential Moving Average) indicator.
///
/// Like SMA but gives more weight to recent prices. The first value is the SMA
/// of the first `period` values.
pub struct Ema {
    period: usize,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    pub fn compute(&self, values: &[f64]) -> Vec<Option<f64>> {
        let values: Vec<Option<f64>> = values.iter().map(|v| Some(*v)).collect();
        self.compute_sparse(&values)
    }

    /// EMA over a series that may start with (or contain) gaps, such as the
    /// MACD line. A gap resets the average, which is re-seeded once `period`
    /// consecutive values are available again.
    pub fn compute_sparse(&self, values: &[Option<f64>]) -> Vec<Option<f64>> {
        let mut out = vec![None; values.len()];
        if self.period == 0 {
            return out;
        }

        let multiplier = 2.0 / (self.period as f64 + 1.0);
        let mut ema: Option<f64> = None;
        let mut run: Vec<f64> = Vec::with_capacity(self.period);

        for (i, value) in values.iter().enumerate() {
            match (*value, ema) {
                (None, _) => {
                    ema = None;
                    run.clear();
                }
                (Some(v), Some(prev)) => {
                    let next = (v - prev) * multiplier + prev;
                    ema = Some(next);
                    out[i] = ema;
                }
                (Some(v), None) => {
                    run.push(v);
                    if run.len() == self.period {
                        // First EMA is SMA
                        let seed = run.iter().sum::<f64>() / self.period as f64;
                        ema = Some(seed);
                        out[i] = ema;
                        run.clear();
                    }
                }
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ema_seeded_with_sma() {
        let ema = Ema::new(3);
        let out = ema.compute(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(out[0], None);
        assert_eq!(out[1], None);
        assert_eq!(out[2], Some(2.0));
        // multiplier 0.5: (4 - 2) * 0.5 + 2
        assert_eq!(out[3], Some(3.0));
    }

    #[test]
    fn test_ema_follows_uptrend() {
        let values: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let out = Ema::new(10).compute(&values);
        let last = out[59].unwrap();
        assert!(last < 159.0 && last > 150.0, "EMA lags price, got {}", last);
    }

    #[test]
    fn test_ema_sparse_skips_leading_gaps() {
        let values = vec![None, None, Some(2.0), Some(4.0), Some(6.0)];
        let out = Ema::new(2).compute_sparse(&values);
        assert_eq!(out[2], None);
        assert_eq!(out[3], Some(3.0));
        // multiplier 2/3: (6 - 3) * 2/3 + 3
        assert!((out[4].unwrap() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_ema_sparse_resets_on_gap() {
        let values = vec![Some(1.0), Some(1.0), None, Some(5.0), Some(5.0)];
        let out = Ema::new(2).compute_sparse(&values);
        assert_eq!(out[1], Some(1.0));
        assert_eq!(out[2], None);
        assert_eq!(out[3], None);
        assert_eq!(out[4], Some(5.0));
    }
}
