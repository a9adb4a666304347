use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{Direction, SignalPolicy, Timeframe};

/// Label reported when no timeframe produced a snapshot.
pub const NO_SIGNAL: &str = "no-signal";

/// Incoming trade request.
///
/// Required fields are optional here so validation can answer with a
/// client error instead of a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TradeRequest {
    pub symbol: Option<String>,
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub amount: Option<f64>,
    pub contract_type: Option<String>,
    pub stop_loss_percent: Option<f64>,
    pub take_profit_percent: Option<f64>,
    /// Credential forwarded to the secondary history provider only.
    pub deriv_api_token: Option<String>,
}

/// Accept `amount` as either a JSON number or a numeric string.
fn deserialize_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Amount {
        Number(f64),
        Text(String),
    }

    Ok(match Option::<Amount>::deserialize(deserializer)? {
        Some(Amount::Number(n)) => Some(n),
        Some(Amount::Text(s)) => s.trim().parse::<f64>().ok(),
        None => None,
    })
}

/// Risk parameters for one analysis run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskParams {
    pub stop_loss_percent: f64,
    pub take_profit_percent: f64,
}

impl Default for RiskParams {
    fn default() -> Self {
        Self {
            stop_loss_percent: 1.0,
            take_profit_percent: 2.0,
        }
    }
}

/// Recommended size for one account-balance tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LotSize {
    pub balance: f64,
    pub size: f64,
}

/// Lot sizes in tier order, serialized as `{"Account Balance N": size}`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LotSizeTable(pub Vec<LotSize>);

impl LotSizeTable {
    pub fn get(&self, balance: f64) -> Option<f64> {
        self.0.iter().find(|l| l.balance == balance).map(|l| l.size)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LotSize> {
        self.0.iter()
    }
}

impl Serialize for LotSizeTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for lot in &self.0 {
            map.serialize_entry(&format!("Account Balance {}", lot.balance), &lot.size)?;
        }
        map.end()
    }
}

/// Outcome of the synthesizer: what to do and how confident it is.
#[derive(Debug, Clone, PartialEq)]
pub struct Synthesis {
    pub direction: Direction,
    pub entry_price: Option<f64>,
    pub probability: f64,
    pub timeframe: Option<Timeframe>,
    pub policy: Option<SignalPolicy>,
}

impl Synthesis {
    /// The no-data result.
    pub fn hold() -> Self {
        Self {
            direction: Direction::Hold,
            entry_price: None,
            probability: 0.0,
            timeframe: None,
            policy: None,
        }
    }

    pub fn timeframe_used(&self) -> String {
        self.timeframe
            .map(|tf| tf.label().to_string())
            .unwrap_or_else(|| NO_SIGNAL.to_string())
    }
}

/// Stop levels and sizes from the risk sizer.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskPlan {
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    pub lot_sizes: LotSizeTable,
}

/// Final recommendation for a symbol.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeRecommendation {
    pub symbol: String,
    pub direction: Direction,
    pub entry_price: Option<f64>,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    pub probability: f64,
    pub timeframe_used: String,
    pub signal_policy: Option<SignalPolicy>,
    pub lot_sizes: LotSizeTable,
}

/// Response body for `POST /api/trade`.
#[derive(Debug, Clone, Serialize)]
pub struct TradeResponse {
    pub status: &'static str,
    pub message: String,
    pub entry_price: Option<f64>,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    pub probability: String,
    pub recommended_lot_sizes: LotSizeTable,
    pub timeframe_used: String,
    pub signal_policy: Option<SignalPolicy>,
}

/// `"12.34%"`, whole values keep one decimal (`"10.0%"`). A hold carries no
/// computed probability and reads `"0%"`.
fn probability_label(direction: Direction, probability: f64) -> String {
    if direction == Direction::Hold {
        "0%".to_string()
    } else if probability.is_finite() && probability.fract() == 0.0 {
        format!("{:.1}%", probability)
    } else {
        format!("{}%", probability)
    }
}

impl From<TradeRecommendation> for TradeResponse {
    fn from(rec: TradeRecommendation) -> Self {
        Self {
            status: "success",
            message: format!("Trade signal: {}", rec.direction),
            entry_price: rec.entry_price,
            stop_loss: rec.stop_loss,
            take_profit: rec.take_profit,
            probability: probability_label(rec.direction, rec.probability),
            recommended_lot_sizes: rec.lot_sizes,
            timeframe_used: rec.timeframe_used,
            signal_policy: rec.signal_policy,
        }
    }
}
