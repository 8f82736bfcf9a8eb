//! Streaming market data over WebSocket.
//!
//! ## [`market_feed`]: binary tick decoding
//!
//! The ticker streams prices as big-endian binary frames. A frame carries
//! one or more packets whose length selects the layout:
//!
//! - **LTP**: last traded price only (8 bytes)
//! - **Quote**: LTP, OHLC, volume, buy/sell totals (44 bytes; 28 for indices)
//! - **Full**: quote plus OI, timestamps and 5-level depth (184 bytes; 32 for
//!   indices)
//!
//! Prices are sent in paise, or in units of 1e-7 rupee for currency
//! derivatives.
//!
//! ## [`ticker`]: connection lifecycle
//!
//! [`ticker::KiteTicker`] dials `wss://ws.kite.trade`, delivers ticks and
//! order updates to callbacks, watches the connection for silence and
//! reconnects with exponential backoff, replaying subscriptions afterwards.

pub mod market_feed;
pub mod ticker;
