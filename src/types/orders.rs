#![allow(missing_docs)]
//! Order types: order book records, trades, placement parameters.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::enums::*;
use crate::types::time::Timestamp;

// ---------------------------------------------------------------------------
// Order book
// ---------------------------------------------------------------------------

/// A single order, as returned by the order book and order history, and as
/// pushed over the ticker connection on status changes.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Order {
    pub account_id: Option<String>,
    pub placed_by: String,

    pub order_id: String,
    pub exchange_order_id: Option<String>,
    pub parent_order_id: Option<String>,
    pub status: String,
    pub status_message: Option<String>,
    pub status_message_raw: Option<String>,
    pub order_timestamp: Timestamp,
    pub exchange_update_timestamp: Timestamp,
    pub exchange_timestamp: Timestamp,
    pub variety: String,
    pub meta: Option<HashMap<String, serde_json::Value>>,

    pub exchange: String,
    pub tradingsymbol: String,
    pub instrument_token: u32,

    pub order_type: String,
    pub transaction_type: String,
    pub validity: String,
    pub product: String,
    pub quantity: f64,
    pub disclosed_quantity: f64,
    pub price: f64,
    pub trigger_price: f64,

    pub average_price: f64,
    pub filled_quantity: f64,
    pub pending_quantity: f64,
    pub cancelled_quantity: f64,

    pub tag: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// A single execution.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Trade {
    pub average_price: f64,
    pub quantity: f64,
    pub trade_id: String,
    pub product: String,
    pub fill_timestamp: Timestamp,
    pub exchange_timestamp: Timestamp,
    pub exchange_order_id: Option<String>,
    pub order_id: String,
    pub transaction_type: String,
    pub tradingsymbol: String,
    pub exchange: String,
    pub instrument_token: u32,
}

// ---------------------------------------------------------------------------
// Place / modify
// ---------------------------------------------------------------------------

/// Parameters for placing or modifying an order. Unset fields are not sent.
///
/// ```
/// use kite_rs::types::{Exchange, OrderParams, OrderType, Product, TransactionType};
///
/// let params = OrderParams {
///     exchange: Some(Exchange::Nse),
///     tradingsymbol: Some("INFY".into()),
///     transaction_type: Some(TransactionType::Buy),
///     order_type: Some(OrderType::Market),
///     product: Some(Product::Cnc),
///     quantity: Some(1),
///     ..Default::default()
/// };
/// assert!(params.price.is_none());
/// ```
#[derive(Debug, Clone, Default, Serialize)]
pub struct OrderParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exchange: Option<Exchange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tradingsymbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validity: Option<Validity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validity_ttl: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<Product>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_type: Option<OrderType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_type: Option<TransactionType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disclosed_quantity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger_price: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub squareoff: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stoploss: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trailing_stoploss: Option<f64>,

    /// Iceberg legs (variety `iceberg`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iceberg_legs: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iceberg_quantity: Option<u32>,

    /// Auction number (variety `auction`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auction_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

/// Response of place / modify / cancel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct OrderResponse {
    pub order_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::form_params;

    #[test]
    fn order_tolerates_nulls_and_drifting_times() {
        let json = r#"{
            "placed_by": "XXXXXX",
            "order_id": "100000000000000",
            "exchange_order_id": null,
            "parent_order_id": null,
            "status": "CANCELLED",
            "status_message": null,
            "order_timestamp": "2021-05-31 09:18:57",
            "exchange_timestamp": null,
            "exchange_update_timestamp": "",
            "variety": "regular",
            "exchange": "CDS",
            "tradingsymbol": "USDINR21JUNFUT",
            "instrument_token": 412675,
            "order_type": "LIMIT",
            "transaction_type": "BUY",
            "validity": "DAY",
            "product": "NRML",
            "quantity": 1,
            "price": 72,
            "average_price": 0,
            "tag": null,
            "tags": ["connect test"]
        }"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.instrument_token, 412675);
        assert_eq!(order.price, 72.0);
        assert!(!order.order_timestamp.is_zero());
        assert!(order.exchange_timestamp.is_zero());
        assert!(order.exchange_update_timestamp.is_zero());
        assert_eq!(order.tags.as_deref(), Some(&["connect test".to_owned()][..]));
    }

    #[test]
    fn unset_params_are_not_sent() {
        let params = OrderParams {
            exchange: Some(Exchange::Nse),
            tradingsymbol: Some("INFY".into()),
            order_type: Some(OrderType::SlM),
            quantity: Some(5),
            trigger_price: Some(1490.0),
            ..Default::default()
        };
        let pairs = form_params(&params).unwrap();
        assert_eq!(pairs.len(), 5);
        assert!(pairs.contains(&("order_type".into(), "SL-M".into())));
        assert!(pairs.contains(&("trigger_price".into(), "1490.0".into())));
    }
}
