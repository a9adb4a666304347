//! On-Balance Volume (OBV) indicator.

/// OBV (On-Balance Volume) indicator.
///
/// Cumulative volume indicator starting at 0 on the first bar:
/// - If close > previous close: OBV += volume
/// - If close < previous close: OBV -= volume
#[derive(Default)]
pub struct Obv;

impl Obv {
    pub fn compute(&self, closes: &[f64], volumes: &[f64]) -> Vec<Option<f64>> {
        let mut out = Vec::with_capacity(closes.len());
        let mut obv = 0.0;

        for (i, close) in closes.iter().enumerate() {
            if i > 0 {
                let volume = volumes.get(i).copied().unwrap_or(0.0);
                if *close > closes[i - 1] {
                    obv += volume;
                } else if *close < closes[i - 1] {
                    obv -= volume;
                }
            }
            out.push(Some(obv));
        }

        out
    }
}
