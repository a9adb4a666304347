//! Stop levels and position sizing.

use super::indicators::round2;
use crate::error::EngineError;
use crate::types::{Direction, LotSize, LotSizeTable, RiskParams, RiskPlan};

/// Share of the balance put at risk before the probability factor.
const RISK_FRACTION: f64 = 0.01;

/// Sizing factor for a probability score.
pub fn lot_size_factor(probability: f64) -> f64 {
    if probability >= 80.0 {
        0.02
    } else if probability >= 60.0 {
        0.015
    } else if probability >= 40.0 {
        0.01
    } else {
        0.005
    }
}

/// Recommended size for one account balance.
pub fn recommend_lot_size(probability: f64, balance: f64) -> f64 {
    round2(balance * RISK_FRACTION * lot_size_factor(probability))
}

/// Reject negative or non-finite percentages.
pub fn validate(params: &RiskParams) -> Result<(), EngineError> {
    for (name, value) in [
        ("stop_loss_percent", params.stop_loss_percent),
        ("take_profit_percent", params.take_profit_percent),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(EngineError::InvalidRiskParameter { name, value });
        }
    }
    Ok(())
}

/// Stop-loss and take-profit for the direction, plus a size for every tier.
///
/// Hold (or a missing entry price) leaves both levels absent; sizes are always
/// computed.
pub fn size(
    probability: f64,
    direction: Direction,
    entry_price: Option<f64>,
    params: &RiskParams,
    balances: &[f64],
) -> RiskPlan {
    let sl = params.stop_loss_percent / 100.0;
    let tp = params.take_profit_percent / 100.0;

    let (stop_loss, take_profit) = match (direction, entry_price) {
        (Direction::Buy, Some(entry)) => (Some(entry * (1.0 - sl)), Some(entry * (1.0 + tp))),
        (Direction::Sell, Some(entry)) => (Some(entry * (1.0 + sl)), Some(entry * (1.0 - tp))),
        _ => (None, None),
    };

    let lot_sizes = LotSizeTable(
        balances
            .iter()
            .map(|&balance| LotSize {
                balance,
                size: recommend_lot_size(probability, balance),
            })
            .collect(),
    );

    RiskPlan {
        stop_loss,
        take_profit,
        lot_sizes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIERS: [f64; 7] = [100.0, 200.0, 500.0, 1000.0, 2000.0, 5000.0, 10000.0];

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_factor_thresholds() {
        assert_eq!(lot_size_factor(39.99), 0.005);
        assert_eq!(lot_size_factor(40.0), 0.01);
        assert_eq!(lot_size_factor(60.0), 0.015);
        assert_eq!(lot_size_factor(80.0), 0.02);
        assert_eq!(lot_size_factor(250.0), 0.02);
    }

    #[test]
    fn test_size_for_high_probability() {
        // 1000 * 0.01 * 0.02
        assert_eq!(recommend_lot_size(85.0, 1000.0), 0.2);
    }

    #[test]
    fn test_size_non_decreasing_in_probability() {
        for balance in TIERS {
            let sizes: Vec<f64> = [39.0, 40.0, 60.0, 80.0]
                .iter()
                .map(|p| recommend_lot_size(*p, balance))
                .collect();
            assert!(sizes.windows(2).all(|w| w[0] <= w[1]), "{:?}", sizes);
        }
    }

    #[test]
    fn test_buy_levels() {
        let plan = size(50.0, Direction::Buy, Some(1.1), &RiskParams::default(), &TIERS);
        assert!(close(plan.stop_loss.unwrap(), 1.089));
        assert!(close(plan.take_profit.unwrap(), 1.122));
    }

    #[test]
    fn test_sell_levels() {
        let plan = size(50.0, Direction::Sell, Some(1.1), &RiskParams::default(), &TIERS);
        assert!(close(plan.stop_loss.unwrap(), 1.111));
        assert!(close(plan.take_profit.unwrap(), 1.078));
    }

    #[test]
    fn test_hold_has_no_levels_but_sizes() {
        let plan = size(0.0, Direction::Hold, None, &RiskParams::default(), &TIERS);
        assert_eq!(plan.stop_loss, None);
        assert_eq!(plan.take_profit, None);
        assert_eq!(plan.lot_sizes.0.len(), TIERS.len());
        assert_eq!(plan.lot_sizes.get(10000.0), Some(0.5));
    }

    #[test]
    fn test_sizes_follow_tier_order() {
        let plan = size(85.0, Direction::Buy, Some(1.0), &RiskParams::default(), &TIERS);
        let balances: Vec<f64> = plan.lot_sizes.iter().map(|l| l.balance).collect();
        assert_eq!(balances, TIERS.to_vec());
    }

    #[test]
    fn test_validate_rejects_bad_percentages() {
        assert!(validate(&RiskParams::default()).is_ok());

        let negative = RiskParams {
            stop_loss_percent: -1.0,
            take_profit_percent: 2.0,
        };
        assert_eq!(
            validate(&negative),
            Err(EngineError::InvalidRiskParameter {
                name: "stop_loss_percent",
                value: -1.0
            })
        );

        let nan = RiskParams {
            stop_loss_percent: 1.0,
            take_profit_percent: f64::NAN,
        };
        assert!(validate(&nan).is_err());
    }
}
