#![allow(missing_docs)]
//! Mutual fund types: orders, SIPs, holdings.

use serde::{Deserialize, Serialize};

use crate::types::enums::TransactionType;
use crate::types::time::Timestamp;

// ---------------------------------------------------------------------------
// Holdings
// ---------------------------------------------------------------------------

/// A mutual fund holding.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct MFHolding {
    pub folio: String,
    pub fund: String,
    pub tradingsymbol: String,
    pub average_price: f64,
    pub last_price: f64,
    pub last_price_date: String,
    pub pnl: f64,
    pub quantity: f64,
}

/// One allotment behind a holding.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct MFTrade {
    pub fund: String,
    pub tradingsymbol: String,
    pub average_price: f64,
    pub variety: String,
    pub exchange_timestamp: Timestamp,
    pub amount: f64,
    pub folio: String,
    pub quantity: f64,
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

/// A mutual fund order.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct MFOrder {
    pub order_id: String,
    pub exchange_order_id: Option<String>,
    pub tradingsymbol: String,
    pub status: String,
    pub status_message: Option<String>,
    pub folio: Option<String>,
    pub fund: String,
    pub order_timestamp: Timestamp,
    pub exchange_timestamp: Timestamp,
    pub settlement_id: Option<String>,

    pub transaction_type: String,
    pub variety: String,
    pub purchase_type: String,
    pub quantity: f64,
    pub amount: f64,
    pub last_price: f64,
    pub average_price: f64,
    pub placed_by: String,
    pub tag: Option<String>,
}

/// Parameters for placing a mutual fund order.
#[derive(Debug, Clone, Serialize)]
pub struct MFOrderParams {
    pub tradingsymbol: String,
    pub transaction_type: TransactionType,
    /// Units to redeem (sell orders).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    /// Amount to invest (buy orders).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

/// Response of placing or cancelling a mutual fund order.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct MFOrderResponse {
    pub order_id: String,
}

// ---------------------------------------------------------------------------
// SIPs
// ---------------------------------------------------------------------------

/// A systematic investment plan.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct MFSIP {
    #[serde(rename = "sip_id")]
    pub id: String,
    pub tradingsymbol: String,
    #[serde(rename = "fund")]
    pub fund_name: String,
    pub dividend_type: String,
    pub transaction_type: String,

    pub status: String,
    pub sip_type: Option<String>,
    pub created: Timestamp,
    pub frequency: String,
    pub instalment_amount: f64,
    pub instalments: i64,
    pub last_instalment: Timestamp,
    pub pending_instalments: i64,
    pub instalment_day: i64,
    pub completed_instalments: i64,
    pub next_instalment: String,
    pub tag: Option<String>,
}

/// Parameters for starting a SIP.
#[derive(Debug, Clone, Serialize)]
pub struct MFSIPParams {
    pub tradingsymbol: String,
    pub amount: f64,
    /// `-1` runs until cancelled.
    pub instalments: i64,
    /// `weekly`, `monthly` or `quarterly`.
    pub frequency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instalment_day: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

/// Parameters for modifying a SIP. Unset fields are left as they are.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MFSIPModifyParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instalment_day: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instalments: Option<i64>,
    /// `active` or `paused`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Response of SIP place / modify / cancel.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct MFSIPResponse {
    pub order_id: Option<String>,
    pub sip_id: String,
}
