//! REST API endpoint implementations.
//!
//! Each sub-module adds high-level `async` methods to
//! [`KiteClient`](crate::client::KiteClient) via `impl` blocks. All methods
//! handle form encoding, HTTP transport, envelope decoding and error mapping
//! automatically.
//!
//! ## Usage
//!
//! ```no_run
//! use kite_rs::KiteClient;
//!
//! # #[tokio::main]
//! # async fn main() -> kite_rs::Result<()> {
//! let client = KiteClient::builder("api_key").access_token("access_token").build()?;
//! let orders = client.get_orders().await?;
//! let holdings = client.get_holdings().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! | Module | Endpoints | Description |
//! |---|---|---|
//! | [`user`] | 7 | Session exchange, renewal, invalidation, profile, funds |
//! | [`orders`] | 8 | Order placement, modification, cancellation, order book, trades |
//! | [`portfolio`] | 4 | Holdings, positions, conversion, holdings authorisation |
//! | [`market`] | 8 | Quotes, historical candles, instrument dumps, trigger ranges |
//! | [`mutual_funds`] | 12 | Mutual fund orders, SIPs, holdings, allotments |
//! | [`gtt`] | 5 | Good-till-triggered orders |
//! | [`margins`] | 2 | Order and basket margin calculator |

pub mod gtt;
pub mod margins;
pub mod market;
pub mod mutual_funds;
pub mod orders;
pub mod portfolio;
pub mod user;

/// Owned form pairs from borrowed ones.
pub(crate) fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
    items
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect()
}
