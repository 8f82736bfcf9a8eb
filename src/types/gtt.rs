#![allow(missing_docs)]
//! GTT (good-till-triggered) types.
//!
//! A GTT is parked server-side until the last traded price crosses one of its
//! trigger values, at which point the matching LIMIT order is placed. The
//! shape of the trigger is a closed set: [`GttTrigger::Single`] carries one
//! leg, [`GttTrigger::TwoLeg`] carries a lower (stop-loss) and an upper
//! (target) leg where executing one cancels the other.

use serde::{Deserialize, Serialize};

use crate::error::{KiteError, Result};
use crate::types::enums::*;
use crate::types::orders::Order;
use crate::types::time::Timestamp;

/// GTT kind on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GttType {
    #[serde(rename = "single")]
    Single,
    #[serde(rename = "two-leg")]
    TwoLeg,
}

impl GttType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::TwoLeg => "two-leg",
        }
    }
}

/// One leg of a trigger.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TriggerParams {
    pub trigger_value: f64,
    pub limit_price: f64,
    pub quantity: f64,
}

/// The trigger of a GTT.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GttTrigger {
    Single(TriggerParams),
    /// One-cancels-other. Legs are sent lower first.
    TwoLeg {
        lower: TriggerParams,
        upper: TriggerParams,
    },
}

impl GttTrigger {
    pub fn kind(&self) -> GttType {
        match self {
            Self::Single(_) => GttType::Single,
            Self::TwoLeg { .. } => GttType::TwoLeg,
        }
    }

    fn legs(&self) -> Vec<TriggerParams> {
        match *self {
            Self::Single(leg) => vec![leg],
            Self::TwoLeg { lower, upper } => vec![lower, upper],
        }
    }

    pub fn trigger_values(&self) -> Vec<f64> {
        self.legs().iter().map(|l| l.trigger_value).collect()
    }

    pub fn limit_prices(&self) -> Vec<f64> {
        self.legs().iter().map(|l| l.limit_price).collect()
    }

    pub fn quantities(&self) -> Vec<f64> {
        self.legs().iter().map(|l| l.quantity).collect()
    }

    /// Rebuild a trigger from parallel lists. The three lists must have the
    /// same length, 1 for [`GttType::Single`] and 2 for [`GttType::TwoLeg`].
    pub fn from_parts(
        kind: GttType,
        trigger_values: &[f64],
        limit_prices: &[f64],
        quantities: &[f64],
    ) -> Result<Self> {
        let n = trigger_values.len();
        if limit_prices.len() != n || quantities.len() != n {
            return Err(KiteError::input(format!(
                "trigger lists differ in length: {n} triggers, {} limits, {} quantities",
                limit_prices.len(),
                quantities.len()
            )));
        }
        let leg = |i: usize| TriggerParams {
            trigger_value: trigger_values[i],
            limit_price: limit_prices[i],
            quantity: quantities[i],
        };
        match (kind, n) {
            (GttType::Single, 1) => Ok(Self::Single(leg(0))),
            (GttType::TwoLeg, 2) => Ok(Self::TwoLeg { lower: leg(0), upper: leg(1) }),
            _ => Err(KiteError::input(format!(
                "a {} trigger cannot have {n} legs",
                kind.as_str()
            ))),
        }
    }
}

/// Condition block of a GTT.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GttCondition {
    pub exchange: String,
    pub tradingsymbol: String,
    pub last_price: f64,
    pub trigger_values: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instrument_token: Option<u32>,
}

/// Rejection info attached after a GTT fired.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GttMeta {
    pub rejection_reason: Option<String>,
}

/// A GTT as stored on the server.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Gtt {
    pub id: i64,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub expires_at: Timestamp,
    pub status: String,
    pub condition: GttCondition,
    pub orders: Vec<Order>,
    pub meta: Option<GttMeta>,
}

/// An order leg as sent in the `orders` form field.
#[derive(Debug, Clone, Serialize)]
struct GttOrder<'a> {
    exchange: Exchange,
    tradingsymbol: &'a str,
    transaction_type: TransactionType,
    quantity: f64,
    price: f64,
    order_type: OrderType,
    product: Product,
}

/// Inputs for placing or modifying a GTT.
#[derive(Debug, Clone)]
pub struct GttParams {
    pub tradingsymbol: String,
    pub exchange: Exchange,
    pub last_price: f64,
    pub transaction_type: TransactionType,
    pub trigger: GttTrigger,
}

impl GttParams {
    /// The `type`, `condition` and `orders` form fields. Every leg becomes a
    /// CNC LIMIT order at that leg's limit price.
    pub(crate) fn to_params(&self) -> Result<Vec<(String, String)>> {
        let condition = GttCondition {
            exchange: self.exchange.as_str().to_owned(),
            tradingsymbol: self.tradingsymbol.clone(),
            last_price: self.last_price,
            trigger_values: self.trigger.trigger_values(),
            instrument_token: None,
        };
        let orders: Vec<GttOrder<'_>> = self
            .trigger
            .legs()
            .into_iter()
            .map(|leg| GttOrder {
                exchange: self.exchange,
                tradingsymbol: &self.tradingsymbol,
                transaction_type: self.transaction_type,
                quantity: leg.quantity,
                price: leg.limit_price,
                order_type: OrderType::Limit,
                product: Product::Cnc,
            })
            .collect();

        let encode = |what: &str, v: serde_json::Result<String>| {
            v.map_err(|e| KiteError::input(format!("error while encoding {what}: {e}")).with_source(e))
        };

        Ok(vec![
            ("type".to_owned(), self.trigger.kind().as_str().to_owned()),
            ("condition".to_owned(), encode("condition", serde_json::to_string(&condition))?),
            ("orders".to_owned(), encode("orders", serde_json::to_string(&orders))?),
        ])
    }
}

/// Response of GTT place / modify / delete.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GttResponse {
    pub trigger_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn leg(t: f64, l: f64, q: f64) -> TriggerParams {
        TriggerParams { trigger_value: t, limit_price: l, quantity: q }
    }

    #[test]
    fn lists_have_one_entry_per_leg() {
        let single = GttTrigger::Single(leg(1.0, 1.5, 10.0));
        assert_eq!(single.kind(), GttType::Single);
        assert_eq!(single.trigger_values(), vec![1.0]);

        let two = GttTrigger::TwoLeg { lower: leg(1.0, 1.1, 1.0), upper: leg(2.0, 2.1, 2.0) };
        assert_eq!(two.trigger_values(), vec![1.0, 2.0]);
        assert_eq!(two.limit_prices(), vec![1.1, 2.1]);
        assert_eq!(two.quantities(), vec![1.0, 2.0]);
    }

    #[test]
    fn from_parts_enforces_leg_counts() {
        let t = GttTrigger::from_parts(GttType::TwoLeg, &[1.0, 2.0], &[1.1, 2.1], &[5.0, 5.0]).unwrap();
        assert_eq!(t.kind(), GttType::TwoLeg);

        let err = GttTrigger::from_parts(GttType::Single, &[1.0, 2.0], &[1.1, 2.1], &[5.0, 5.0]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Input);
        assert!(GttTrigger::from_parts(GttType::Single, &[1.0], &[1.1, 2.0], &[5.0]).is_err());
        assert!(GttTrigger::from_parts(GttType::TwoLeg, &[], &[], &[]).is_err());
    }

    #[test]
    fn params_serialize_condition_and_orders() {
        let params = GttParams {
            tradingsymbol: "INFY".into(),
            exchange: Exchange::Nse,
            last_price: 800.0,
            transaction_type: TransactionType::Buy,
            trigger: GttTrigger::TwoLeg { lower: leg(790.0, 789.0, 1.0), upper: leg(810.0, 811.0, 1.0) },
        }
        .to_params()
        .unwrap();

        assert_eq!(params[0], ("type".into(), "two-leg".into()));
        let condition: serde_json::Value = serde_json::from_str(&params[1].1).unwrap();
        assert_eq!(condition["trigger_values"], serde_json::json!([790.0, 810.0]));
        assert_eq!(condition["tradingsymbol"], "INFY");
        let orders: serde_json::Value = serde_json::from_str(&params[2].1).unwrap();
        assert_eq!(orders.as_array().unwrap().len(), 2);
        assert_eq!(orders[1]["price"], 811.0);
        assert_eq!(orders[0]["order_type"], "LIMIT");
        assert_eq!(orders[0]["product"], "CNC");
    }
}
