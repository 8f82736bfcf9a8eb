//! Request and response types for the Kite Connect v3 API.
//!
//! This module contains the strongly-typed structs used for serializing
//! requests and deserializing responses across every Kite Connect endpoint.
//!
//! ## Organization
//!
//! - [`enums`]: Shared enumerations (exchanges, products, order types, etc.)
//! - [`time`]: The tolerant [`Timestamp`] codec used by every record
//! - [`user`]: Session, profile and funds types
//! - [`orders`]: Order book, trades and order placement types
//! - [`portfolio`]: Holdings, positions, conversion, holdings authorisation
//! - [`market`]: Quotes, historical candles, instrument dumps
//! - [`mutual_funds`]: Mutual fund orders, SIPs and holdings
//! - [`gtt`]: Good-till-triggered orders
//! - [`margins`]: Margin calculator types
//!
//! Response records default missing fields to zero values, so a field the
//! server stops sending never fails a decode.

pub mod enums;
pub mod gtt;
pub mod margins;
pub mod market;
pub mod mutual_funds;
pub mod orders;
pub mod portfolio;
pub mod time;
pub mod user;

pub use enums::*;
pub use gtt::{GttParams, GttTrigger, GttType, TriggerParams};
pub use orders::{Order, OrderParams};
pub use time::Timestamp;
