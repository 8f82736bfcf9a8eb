#![allow(missing_docs)]
//! Margin calculator types.

use serde::{Deserialize, Serialize};

use crate::types::enums::*;

/// One order sent to the margin calculator.
#[derive(Debug, Clone, Serialize)]
pub struct OrderMarginParam {
    pub exchange: Exchange,
    pub tradingsymbol: String,
    pub transaction_type: TransactionType,
    pub variety: Variety,
    pub product: Product,
    pub order_type: OrderType,
    pub quantity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger_price: Option<f64>,
}

/// Realised and unrealised P&L.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Pnl {
    pub realised: f64,
    pub unrealised: f64,
}

/// GST components.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Gst {
    pub igst: f64,
    pub cgst: f64,
    pub sgst: f64,
    pub total: f64,
}

/// Charges applied to an order.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Charges {
    pub transaction_tax: f64,
    pub transaction_tax_type: String,
    pub exchange_turnover_charge: f64,
    pub sebi_turnover_charge: f64,
    pub brokerage: f64,
    pub stamp_duty: f64,
    pub gst: Gst,
    pub total: f64,
}

/// Margin required for one order.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct OrderMargins {
    #[serde(rename = "type")]
    pub kind: String,
    pub tradingsymbol: String,
    pub exchange: String,

    pub span: f64,
    pub exposure: f64,
    pub option_premium: f64,
    pub additional: f64,
    pub bo: f64,
    pub cash: f64,
    pub var: f64,
    pub pnl: Pnl,
    pub leverage: f64,
    pub charges: Charges,
    pub total: f64,
}

/// Margins for a basket of orders.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct BasketMargins {
    pub initial: OrderMargins,
    #[serde(rename = "final")]
    pub final_margins: OrderMargins,
    pub orders: Vec<OrderMargins>,
}

/// Input of the order margin calculator.
#[derive(Debug, Clone, Default)]
pub struct GetMarginParams {
    pub orders: Vec<OrderMarginParam>,
    /// Ask for the compact response (totals only).
    pub compact: bool,
}

/// Input of the basket margin calculator.
#[derive(Debug, Clone, Default)]
pub struct GetBasketParams {
    pub orders: Vec<OrderMarginParam>,
    pub compact: bool,
    /// Net the basket against existing positions.
    pub consider_positions: bool,
}
