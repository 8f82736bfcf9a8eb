//! Connect to the Kite ticker, subscribe to a few instruments in full mode
//! and print what arrives for a while.
//!
//! # Usage
//!
//! ```sh
//! export KITE_API_KEY="your-api-key"
//! export KITE_ACCESS_TOKEN="your-access-token"
//! # Optional, comma separated. Defaults to NIFTY 50 and INFY.
//! export KITE_TOKENS="256265,408065"
//! cargo run --bin ticker_check --features cli
//! ```

use std::env;
use std::time::Duration;

use kite_rs::ws::market_feed::Mode;
use kite_rs::{KiteError, KiteTicker, Result};
use tokio::sync::mpsc;
use tokio::time;

const DEFAULT_TOKENS: [u32; 2] = [256265, 408065];
const RUN_FOR: Duration = Duration::from_secs(15);

fn required_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| KiteError::input(format!("set {name} before running")))
}

fn tokens_from_env() -> Result<Vec<u32>> {
    match env::var("KITE_TOKENS") {
        Ok(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<u32>()
                    .map_err(|_| KiteError::input(format!("bad instrument token {s:?}")))
            })
            .collect(),
        Err(_) => Ok(DEFAULT_TOKENS.to_vec()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let api_key = required_env("KITE_API_KEY")?;
    let access_token = required_env("KITE_ACCESS_TOKEN")?;
    let tokens = tokens_from_env()?;

    let (connected_tx, mut connected_rx) = mpsc::unbounded_channel();

    let ticker = KiteTicker::builder(api_key, access_token)
        .on_connect(move || {
            let _ = connected_tx.send(());
        })
        .on_tick(|tick| println!("{tick:#?}"))
        .on_order_update(|order| println!("order {} -> {}", order.order_id, order.status))
        .on_error(|err| eprintln!("error: {err}"))
        .on_close(|code, reason| println!("closed: {code} {reason}"))
        .on_reconnect(|attempt, delay| println!("reconnect #{attempt} in {delay:?}"))
        .on_no_reconnect(|attempt| eprintln!("gave up after {attempt} attempts"))
        .build()?;

    let handle = ticker.handle();
    let serve = tokio::spawn(async move { ticker.serve().await });

    println!("Streaming {tokens:?} for {}s…", RUN_FOR.as_secs());
    println!("(Ticks only flow during market hours, 9:15-15:30 IST)\n");

    let deadline = time::sleep(RUN_FOR);
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = &mut deadline => break,
            connected = connected_rx.recv() => {
                if connected.is_none() {
                    break;
                }
                // Fresh connections after the first replay subscriptions themselves.
                if handle.subscriptions().await.is_empty() {
                    handle.subscribe(&tokens).await?;
                    handle.set_mode(Mode::Full, &tokens).await?;
                }
            }
        }
    }

    handle.close().await?;
    let _ = serve.await;
    println!("Done.");

    Ok(())
}
