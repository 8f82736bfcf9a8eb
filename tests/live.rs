//! Read-only checks against the real Kite Connect API.
//!
//! # Running
//!
//! ```sh
//! export KITE_API_KEY="your-api-key"
//! export KITE_ACCESS_TOKEN="your-access-token"
//! cargo test --test live -- --nocapture
//! ```
//!
//! Without these env vars, every test is silently skipped. Nothing here
//! places, modifies or cancels orders.

use std::time::Duration;

use chrono::{Duration as ChronoDuration, Local};
use tokio::sync::mpsc;

use kite_rs::types::enums::{Exchange, Interval, MarginSegment};
use kite_rs::{ErrorKind, KiteClient, KiteTicker};

/// INFY on NSE.
const INFY_TOKEN: u32 = 408065;

fn credentials() -> Option<(String, String)> {
    let api_key = std::env::var("KITE_API_KEY").ok()?;
    let token = std::env::var("KITE_ACCESS_TOKEN").ok()?;
    if api_key.is_empty() || token.is_empty() {
        return None;
    }
    Some((api_key, token))
}

fn live_client() -> Option<KiteClient> {
    let (api_key, token) = credentials()?;
    KiteClient::builder(api_key).access_token(token).build().ok()
}

macro_rules! require_client {
    () => {
        match live_client() {
            Some(c) => c,
            None => {
                eprintln!("skipped (KITE_API_KEY / KITE_ACCESS_TOKEN not set)");
                return;
            }
        }
    };
}

// ===================================================================
// User
// ===================================================================

#[tokio::test]
async fn test_profile_and_margins() {
    let client = require_client!();

    let profile = client.get_user_profile().await.expect("get_user_profile failed");
    assert!(!profile.user_id.is_empty());
    println!("profile: {} ({})", profile.user_id, profile.broker);

    let margins = client.get_user_margins().await.expect("get_user_margins failed");
    let equity = client
        .get_user_segment_margins(MarginSegment::Equity)
        .await
        .expect("get_user_segment_margins failed");
    println!("equity net: {} / {}", margins.equity.net, equity.net);
}

// ===================================================================
// Portfolio & order book
// ===================================================================

#[tokio::test]
async fn test_portfolio_and_books() {
    let client = require_client!();

    let holdings = client.get_holdings().await.expect("get_holdings failed");
    let positions = client.get_positions().await.expect("get_positions failed");
    let orders = client.get_orders().await.expect("get_orders failed");
    let trades = client.get_trades().await.expect("get_trades failed");
    println!(
        "holdings={} net positions={} orders={} trades={}",
        holdings.len(),
        positions.net.len(),
        orders.len(),
        trades.len()
    );
}

// ===================================================================
// Market data
// ===================================================================

#[tokio::test]
async fn test_quotes() {
    let client = require_client!();

    let quote = client.get_quote(&["NSE:INFY"]).await.expect("get_quote failed");
    let infy = &quote["NSE:INFY"];
    assert_eq!(infy.instrument_token, INFY_TOKEN);

    let ltp = client.get_ltp(&["NSE:INFY"]).await.expect("get_ltp failed");
    assert!(ltp["NSE:INFY"].last_price > 0.0);

    let ohlc = client.get_ohlc(&["NSE:INFY"]).await.expect("get_ohlc failed");
    println!("INFY ohlc: {:?}", ohlc["NSE:INFY"].ohlc);
}

#[tokio::test]
async fn test_historical_daily() {
    let client = require_client!();

    let to = Local::now().naive_local();
    let from = to - ChronoDuration::days(30);
    let candles = client
        .get_historical_data(INFY_TOKEN, Interval::Day, from, to, false, false)
        .await
        .expect("get_historical_data failed");
    assert!(!candles.is_empty());
    assert!(candles.iter().all(|c| !c.date.is_zero()));
    println!("{} daily candles", candles.len());
}

#[tokio::test]
async fn test_instrument_dump() {
    let client = require_client!();

    let rows = client
        .get_instruments_by_exchange(Exchange::Nse)
        .await
        .expect("get_instruments_by_exchange failed");
    assert!(rows.iter().any(|r| r.instrument_token == INFY_TOKEN));
}

#[tokio::test]
async fn test_bad_token_is_token_error() {
    let Some((api_key, _)) = credentials() else {
        eprintln!("skipped (KITE_API_KEY / KITE_ACCESS_TOKEN not set)");
        return;
    };
    let client = KiteClient::builder(api_key)
        .access_token("definitely-not-valid")
        .build()
        .unwrap();

    let err = client.get_user_profile().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Token);
    assert_eq!(err.code(), 403);
}

// ===================================================================
// Ticker
// ===================================================================

#[tokio::test]
async fn test_ticker_connects() {
    let Some((api_key, token)) = credentials() else {
        eprintln!("skipped (KITE_API_KEY / KITE_ACCESS_TOKEN not set)");
        return;
    };

    let (connected_tx, mut connected_rx) = mpsc::unbounded_channel();
    let ticker = KiteTicker::builder(api_key, token)
        .on_connect(move || {
            let _ = connected_tx.send(());
        })
        .build()
        .unwrap();
    let handle = ticker.handle();
    let serve = tokio::spawn(async move { ticker.serve().await });

    tokio::time::timeout(Duration::from_secs(10), connected_rx.recv())
        .await
        .expect("ticker did not connect");
    handle.subscribe(&[INFY_TOKEN]).await.expect("subscribe failed");

    handle.close().await.expect("close failed");
    let _ = serve.await;
}
