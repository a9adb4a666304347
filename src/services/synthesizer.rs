//! Cross-timeframe signal synthesis.
//!
//! Picks the snapshot to act on by a fixed priority order and scores it.

use std::collections::HashMap;

use super::indicators::round2;
use crate::types::{Direction, ProbabilityModel, Synthesis, Timeframe, TimeframeSnapshot};

/// Share of price treated as the ATR volatility ceiling.
const ATR_PRICE_FRACTION: f64 = 0.1;

/// Choose the first prioritized timeframe with a snapshot and derive the
/// direction, entry price and probability from it. No snapshot means hold.
pub fn synthesize(
    snapshots: &HashMap<Timeframe, TimeframeSnapshot>,
    priority: &[Timeframe],
    model: ProbabilityModel,
) -> Synthesis {
    let Some(snapshot) = priority.iter().find_map(|tf| snapshots.get(tf)) else {
        return Synthesis::hold();
    };

    let direction = if snapshot.is_long() {
        Direction::Buy
    } else {
        Direction::Sell
    };

    Synthesis {
        direction,
        entry_price: Some(snapshot.close),
        probability: probability(snapshot, model),
        timeframe: Some(snapshot.timeframe),
        policy: Some(snapshot.policy),
    }
}

/// Probability under `model`, falling back to the other model when inputs are
/// missing, and to 0 when neither can be computed.
pub fn probability(snapshot: &TimeframeSnapshot, model: ProbabilityModel) -> f64 {
    model_probability(snapshot, model)
        .or_else(|| model_probability(snapshot, model.alternate()))
        .unwrap_or(0.0)
}

fn model_probability(snapshot: &TimeframeSnapshot, model: ProbabilityModel) -> Option<f64> {
    let value = match model {
        ProbabilityModel::Atr => {
            let atr = snapshot.atr?;
            let ceiling = snapshot.close * ATR_PRICE_FRACTION;
            if ceiling == 0.0 {
                return None;
            }
            atr / ceiling * 100.0
        }
        ProbabilityModel::MaDivergence => {
            let fast = snapshot.fast_ma?;
            let slow = snapshot.slow_ma?;
            let reference = fast.max(slow);
            if reference == 0.0 {
                return None;
            }
            (fast - slow).abs() / reference * 100.0
        }
    };

    value.is_finite().then(|| round2(value))
}
