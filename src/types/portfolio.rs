#![allow(missing_docs)]
//! Portfolio types: holdings, positions, position conversion and holdings
//! authorisation.

use serde::{Deserialize, Serialize};

use crate::types::enums::*;
use crate::types::time::Timestamp;

// ---------------------------------------------------------------------------
// Holdings
// ---------------------------------------------------------------------------

/// A single long-term equity holding.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Holding {
    pub tradingsymbol: String,
    pub exchange: String,
    pub instrument_token: u32,
    pub isin: String,
    pub product: String,

    pub price: f64,
    pub used_quantity: i64,
    pub quantity: i64,
    pub t1_quantity: i64,
    pub realised_quantity: i64,
    pub authorised_quantity: i64,
    pub authorised_date: Timestamp,
    pub opening_quantity: i64,
    pub collateral_quantity: i64,
    pub collateral_type: Option<String>,

    pub discrepancy: bool,
    pub average_price: f64,
    pub last_price: f64,
    pub close_price: f64,
    pub pnl: f64,
    pub day_change: f64,
    pub day_change_percentage: f64,
}

// ---------------------------------------------------------------------------
// Positions
// ---------------------------------------------------------------------------

/// A single open position.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Position {
    pub tradingsymbol: String,
    pub exchange: String,
    pub instrument_token: u32,
    pub product: String,

    pub quantity: i64,
    pub overnight_quantity: i64,
    pub multiplier: f64,

    pub average_price: f64,
    pub close_price: f64,
    pub last_price: f64,
    pub value: f64,
    pub pnl: f64,
    pub m2m: f64,
    pub unrealised: f64,
    pub realised: f64,

    pub buy_quantity: i64,
    pub buy_price: f64,
    pub buy_value: f64,
    #[serde(rename = "buy_m2m")]
    pub buy_m2m_value: f64,

    pub sell_quantity: i64,
    pub sell_price: f64,
    pub sell_value: f64,
    #[serde(rename = "sell_m2m")]
    pub sell_m2m_value: f64,

    pub day_buy_quantity: i64,
    pub day_buy_price: f64,
    pub day_buy_value: f64,

    pub day_sell_quantity: i64,
    pub day_sell_price: f64,
    pub day_sell_value: f64,
}

/// Net and day-wise positions.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Positions {
    pub net: Vec<Position>,
    pub day: Vec<Position>,
}

/// Request body for converting a position's product.
#[derive(Debug, Clone, Serialize)]
pub struct ConvertPositionParams {
    pub exchange: Exchange,
    pub tradingsymbol: String,
    pub old_product: Product,
    pub new_product: Product,
    pub position_type: PositionType,
    pub transaction_type: TransactionType,
    pub quantity: u32,
}

// ---------------------------------------------------------------------------
// Holdings authorisation
// ---------------------------------------------------------------------------

/// An ISIN and the quantity to authorise for it.
#[derive(Debug, Clone, PartialEq)]
pub struct HoldingsAuthInstrument {
    pub isin: String,
    pub quantity: f64,
}

/// Inputs for starting a holdings authorisation. All fields are optional;
/// without instruments the whole holding is presented for authorisation.
#[derive(Debug, Clone, Default)]
pub struct HoldingAuthParams {
    pub auth_type: Option<HoldingAuthType>,
    pub transfer_type: Option<HoldingAuthTransferType>,
    pub exec_date: Option<String>,
    pub instruments: Vec<HoldingsAuthInstrument>,
}

impl HoldingAuthParams {
    /// Form pairs; `isin`/`quantity` repeat per instrument, quantities with
    /// six decimals.
    pub(crate) fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::with_capacity(self.instruments.len() * 2 + 3);
        if let Some(t) = self.auth_type {
            params.push(("type".to_owned(), t.as_str().to_owned()));
        }
        if let Some(t) = self.transfer_type {
            params.push(("transfer_type".to_owned(), t.as_str().to_owned()));
        }
        if let Some(date) = self.exec_date.as_ref().filter(|d| !d.is_empty()) {
            params.push(("exec_date".to_owned(), date.clone()));
        }
        for inst in &self.instruments {
            params.push(("isin".to_owned(), inst.isin.clone()));
            params.push(("quantity".to_owned(), format!("{:.6}", inst.quantity)));
        }
        params
    }
}

/// Response of a holdings authorisation request.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct HoldingsAuthResponse {
    pub request_id: String,
    /// Where to send the user; derived locally from the api key and request id.
    #[serde(skip_deserializing)]
    pub redirect_url: String,
}
