//! # kite-rs
//!
//! A Rust client library for the [Kite Connect v3 API](https://kite.trade/docs/connect/v3/).
//!
//! Two independent halves share only the api key and access token:
//!
//! - [`KiteClient`] wraps the REST API: login session, orders, portfolio,
//!   quotes, historical candles, instrument dumps, mutual funds, GTTs and
//!   margin calculators.
//! - [`KiteTicker`] streams binary ticks and order updates over WebSocket,
//!   reconnecting and resubscribing on its own.
//!
//! ## Quick Start
//!
//! ```no_run
//! use kite_rs::KiteClient;
//!
//! #[tokio::main]
//! async fn main() -> kite_rs::Result<()> {
//!     let mut client = KiteClient::new("your-api-key")?;
//!     println!("log in at {}", client.login_url());
//!
//!     // After the redirect, exchange the request token for a session.
//!     let session = client.generate_session("request-token", "api-secret").await?;
//!     println!("logged in as {}", session.user_id);
//!
//!     let holdings = client.get_holdings().await?;
//!     println!("{} holdings", holdings.len());
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod client;
pub mod constants;
pub mod error;
pub mod http;
pub mod types;
pub mod ws;

/// Re-export the REST client at crate root for convenience.
pub use client::{KiteClient, KiteClientBuilder};
/// Re-export the error type and Result alias.
pub use error::{ErrorKind, KiteError, Result};
/// Re-export the streaming ticker.
pub use ws::ticker::KiteTicker;
