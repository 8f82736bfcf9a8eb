//! Streaming ticker over `wss://ws.kite.trade`.
//!
//! [`KiteTicker`] owns one WebSocket connection and keeps it alive: a failed
//! dial or a dead connection is retried with exponential backoff, a silent
//! connection is torn down by a liveness watcher, and the subscription table
//! is replayed after every reconnect.
//!
//! Events are delivered to callbacks registered on the [`TickerBuilder`].
//! Callbacks run on the task driving [`KiteTicker::serve`]; a slow callback
//! stalls frame intake, so hand heavy work off to a channel.
//!
//! # Lifecycle
//!
//! ```text
//!               +---------+
//!   start ----->| Dialing |--fail--> Backoff --> Dialing
//!               +----+----+                        ^
//!                    | ok                          |
//!                    v                             |
//!               +---------+  close/err/timeout     |
//!               |Connected|------------------------+
//!               +----+----+
//!                    | user close
//!                    v
//!                 Closed
//! ```
//!
//! # Example
//!
//! ```no_run
//! use kite_rs::ws::market_feed::Mode;
//! use kite_rs::ws::ticker::KiteTicker;
//!
//! # #[tokio::main]
//! # async fn main() -> kite_rs::Result<()> {
//! let ticker = KiteTicker::builder("api_key", "access_token")
//!     .on_tick(|tick| println!("{} {}", tick.instrument_token, tick.last_price))
//!     .on_error(|err| eprintln!("ticker error: {err}"))
//!     .build()?;
//!
//! let handle = ticker.handle();
//! let serve = tokio::spawn(async move { ticker.serve().await });
//!
//! // Once connected:
//! handle.subscribe(&[408065]).await?;
//! handle.set_mode(Mode::Full, &[408065]).await?;
//!
//! handle.close().await?;
//! let _ = serve.await;
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::net::TcpStream;
use tokio::sync::{Mutex, Notify, watch};
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use url::Url;

use crate::constants::WS_TICKER_URL;
use crate::constants::ticker::{
    CONNECTION_CHECK_INTERVAL, DATA_TIMEOUT_INTERVAL, DEFAULT_CONNECT_TIMEOUT,
    DEFAULT_RECONNECT_MAX_DELAY, DEFAULT_RECONNECT_MAX_RETRIES, RECONNECT_MIN_DELAY,
};
use crate::error::{ErrorKind, KiteError, Result};
use crate::types::orders::Order;
use crate::ws::market_feed::{Mode, Tick, decode_frame};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WriterHalf = SplitSink<WsStream, Message>;
type ReaderHalf = SplitStream<WsStream>;

/// Token subscriptions and the mode each was last set to. `None` means
/// subscribed without an explicit mode.
pub type Subscriptions = HashMap<u32, Option<Mode>>;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Connection and reconnect settings for a [`KiteTicker`].
#[derive(Debug, Clone)]
pub struct TickerConfig {
    /// WebSocket root, without query parameters.
    pub root_url: String,
    /// Handshake timeout.
    pub connect_timeout: Duration,
    /// Whether a lost connection is re-dialled.
    pub auto_reconnect: bool,
    /// Reconnect attempts before giving up.
    pub reconnect_max_retries: u32,
    /// Cap on the exponential backoff. Never below 5 seconds.
    pub reconnect_max_delay: Duration,
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            root_url: WS_TICKER_URL.to_owned(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            auto_reconnect: true,
            reconnect_max_retries: DEFAULT_RECONNECT_MAX_RETRIES,
            reconnect_max_delay: DEFAULT_RECONNECT_MAX_DELAY,
        }
    }
}

fn check_max_delay(delay: Duration) -> Result<()> {
    if delay < RECONNECT_MIN_DELAY {
        return Err(KiteError::input(format!(
            "reconnect max delay can't be less than {}s",
            RECONNECT_MIN_DELAY.as_secs()
        )));
    }
    Ok(())
}

/// Backoff before reconnect attempt `attempt`: `2^attempt` seconds, capped
/// at `max`.
pub fn reconnect_delay(attempt: u32, max: Duration) -> Duration {
    if attempt >= 63 {
        return max;
    }
    Duration::from_secs(1u64 << attempt).min(max)
}

// ---------------------------------------------------------------------------
// Callbacks
// ---------------------------------------------------------------------------

/// Kind of a raw message passed to the `on_message` callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Text,
    Binary,
}

#[derive(Default)]
struct Callbacks {
    on_connect: Option<Box<dyn Fn() + Send + Sync>>,
    on_close: Option<Box<dyn Fn(u16, &str) + Send + Sync>>,
    on_error: Option<Box<dyn Fn(&KiteError) + Send + Sync>>,
    on_message: Option<Box<dyn Fn(MessageKind, &[u8]) + Send + Sync>>,
    on_tick: Option<Box<dyn Fn(Tick) + Send + Sync>>,
    on_order_update: Option<Box<dyn Fn(Order) + Send + Sync>>,
    on_reconnect: Option<Box<dyn Fn(u32, Duration) + Send + Sync>>,
    on_no_reconnect: Option<Box<dyn Fn(u32) + Send + Sync>>,
}

impl Callbacks {
    fn connect(&self) {
        if let Some(f) = &self.on_connect {
            f();
        }
    }

    fn close(&self, code: u16, reason: &str) {
        if let Some(f) = &self.on_close {
            f(code, reason);
        }
    }

    fn error(&self, err: &KiteError) {
        if let Some(f) = &self.on_error {
            f(err);
        }
    }

    fn message(&self, kind: MessageKind, data: &[u8]) {
        if let Some(f) = &self.on_message {
            f(kind, data);
        }
    }

    fn tick(&self, tick: Tick) {
        if let Some(f) = &self.on_tick {
            f(tick);
        }
    }

    fn order_update(&self, order: Order) {
        if let Some(f) = &self.on_order_update {
            f(order);
        }
    }

    fn reconnect(&self, attempt: u32, delay: Duration) {
        if let Some(f) = &self.on_reconnect {
            f(attempt, delay);
        }
    }

    fn no_reconnect(&self, attempt: u32) {
        if let Some(f) = &self.on_no_reconnect {
            f(attempt);
        }
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for a [`KiteTicker`].
///
/// ```
/// use std::time::Duration;
/// use kite_rs::ws::ticker::TickerBuilder;
///
/// let ticker = TickerBuilder::new("api_key", "access_token")
///     .reconnect_max_retries(50)
///     .reconnect_max_delay(Duration::from_secs(30))
///     .on_connect(|| println!("connected"))
///     .build()
///     .unwrap();
/// assert_eq!(ticker.config().reconnect_max_retries, 50);
///
/// // The backoff cap has a 5 second floor.
/// assert!(
///     TickerBuilder::new("api_key", "access_token")
///         .reconnect_max_delay(Duration::from_secs(4))
///         .build()
///         .is_err()
/// );
/// ```
pub struct TickerBuilder {
    api_key: String,
    access_token: String,
    config: TickerConfig,
    callbacks: Callbacks,
}

impl TickerBuilder {
    pub fn new(api_key: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            access_token: access_token.into(),
            config: TickerConfig::default(),
            callbacks: Callbacks::default(),
        }
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: TickerConfig) -> Self {
        self.config = config;
        self
    }

    /// WebSocket root. Default: `wss://ws.kite.trade`.
    pub fn root_url(mut self, url: impl Into<String>) -> Self {
        self.config.root_url = url.into();
        self
    }

    /// Handshake timeout. Default: 7 s.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Enable or disable reconnecting. Default: true.
    pub fn auto_reconnect(mut self, enable: bool) -> Self {
        self.config.auto_reconnect = enable;
        self
    }

    /// Reconnect attempts before giving up. Default: 300.
    pub fn reconnect_max_retries(mut self, n: u32) -> Self {
        self.config.reconnect_max_retries = n;
        self
    }

    /// Backoff cap. Default: 60 s. Values under 5 s fail at [`build`](Self::build).
    pub fn reconnect_max_delay(mut self, delay: Duration) -> Self {
        self.config.reconnect_max_delay = delay;
        self
    }

    pub fn on_connect(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.callbacks.on_connect = Some(Box::new(f));
        self
    }

    /// Called with the close code and reason when the connection closes.
    pub fn on_close(mut self, f: impl Fn(u16, &str) + Send + Sync + 'static) -> Self {
        self.callbacks.on_close = Some(Box::new(f));
        self
    }

    /// Called for dial failures, read errors, bad frames and server-reported
    /// errors. None of these stop the ticker on their own.
    pub fn on_error(mut self, f: impl Fn(&KiteError) + Send + Sync + 'static) -> Self {
        self.callbacks.on_error = Some(Box::new(f));
        self
    }

    /// Called with every text or binary message before it is decoded.
    pub fn on_message(mut self, f: impl Fn(MessageKind, &[u8]) + Send + Sync + 'static) -> Self {
        self.callbacks.on_message = Some(Box::new(f));
        self
    }

    pub fn on_tick(mut self, f: impl Fn(Tick) + Send + Sync + 'static) -> Self {
        self.callbacks.on_tick = Some(Box::new(f));
        self
    }

    /// Called with order updates pushed by the server.
    pub fn on_order_update(mut self, f: impl Fn(Order) + Send + Sync + 'static) -> Self {
        self.callbacks.on_order_update = Some(Box::new(f));
        self
    }

    /// Called with the attempt number and the delay before each reconnect.
    pub fn on_reconnect(mut self, f: impl Fn(u32, Duration) + Send + Sync + 'static) -> Self {
        self.callbacks.on_reconnect = Some(Box::new(f));
        self
    }

    /// Called once when the reconnect budget is exhausted.
    pub fn on_no_reconnect(mut self, f: impl Fn(u32) + Send + Sync + 'static) -> Self {
        self.callbacks.on_no_reconnect = Some(Box::new(f));
        self
    }

    pub fn build(self) -> Result<KiteTicker> {
        check_max_delay(self.config.reconnect_max_delay)?;
        Ok(KiteTicker {
            api_key: self.api_key,
            access_token: self.access_token,
            config: self.config,
            callbacks: self.callbacks,
            shared: Arc::new(Shared::new()),
        })
    }
}

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

struct Shared {
    /// Write half of the live connection. Every write goes through this lock.
    writer: Mutex<Option<WriterHalf>>,
    subscriptions: Mutex<Subscriptions>,
    closed: AtomicBool,
    shutdown: watch::Sender<bool>,
}

impl Shared {
    fn new() -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            writer: Mutex::new(None),
            subscriptions: Mutex::new(HashMap::new()),
            closed: AtomicBool::new(false),
            shutdown,
        }
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    async fn send_text(&self, text: String) -> Result<()> {
        let mut guard = self.writer.lock().await;
        let writer = guard
            .as_mut()
            .ok_or_else(|| KiteError::network("ticker is not connected"))?;
        writer.send(Message::Text(text.into())).await?;
        Ok(())
    }
}

#[derive(Serialize)]
struct ControlFrame<'a, V: Serialize> {
    a: &'a str,
    v: V,
}

fn subscribe_frame(tokens: &[u32]) -> Result<String> {
    Ok(serde_json::to_string(&ControlFrame { a: "subscribe", v: tokens })?)
}

fn unsubscribe_frame(tokens: &[u32]) -> Result<String> {
    Ok(serde_json::to_string(&ControlFrame { a: "unsubscribe", v: tokens })?)
}

fn mode_frame(mode: Mode, tokens: &[u32]) -> Result<String> {
    Ok(serde_json::to_string(&ControlFrame { a: "mode", v: (mode, tokens) })?)
}

/// Frames that restore `subs` on a fresh connection: one `subscribe` for
/// every token, then one `mode` frame per mode in use.
fn resubscribe_frames(subs: &Subscriptions) -> Result<Vec<String>> {
    if subs.is_empty() {
        return Ok(Vec::new());
    }

    let mut tokens: Vec<u32> = subs.keys().copied().collect();
    tokens.sort_unstable();

    let mut frames = vec![subscribe_frame(&tokens)?];
    for mode in [Mode::Ltp, Mode::Quote, Mode::Full] {
        let group: Vec<u32> = tokens
            .iter()
            .copied()
            .filter(|t| subs.get(t).copied().flatten() == Some(mode))
            .collect();
        if !group.is_empty() {
            frames.push(mode_frame(mode, &group)?);
        }
    }
    Ok(frames)
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

/// Cloneable control surface of a running [`KiteTicker`].
///
/// Control calls write to the live connection and fail with a `Network`
/// error while the ticker is between connections.
#[derive(Clone)]
pub struct TickerHandle {
    shared: Arc<Shared>,
}

impl TickerHandle {
    /// Start streaming `tokens`. An empty slice is a no-op.
    pub async fn subscribe(&self, tokens: &[u32]) -> Result<()> {
        if tokens.is_empty() {
            return Ok(());
        }
        self.shared.send_text(subscribe_frame(tokens)?).await?;

        let mut subs = self.shared.subscriptions.lock().await;
        for token in tokens {
            subs.insert(*token, None);
        }
        tracing::debug!(count = tokens.len(), "subscribed");
        Ok(())
    }

    /// Stop streaming `tokens`. An empty slice is a no-op.
    pub async fn unsubscribe(&self, tokens: &[u32]) -> Result<()> {
        if tokens.is_empty() {
            return Ok(());
        }
        self.shared.send_text(unsubscribe_frame(tokens)?).await?;

        let mut subs = self.shared.subscriptions.lock().await;
        for token in tokens {
            subs.remove(token);
        }
        tracing::debug!(count = tokens.len(), "unsubscribed");
        Ok(())
    }

    /// Switch `tokens` to `mode`. An empty slice is a no-op.
    pub async fn set_mode(&self, mode: Mode, tokens: &[u32]) -> Result<()> {
        if tokens.is_empty() {
            return Ok(());
        }
        self.shared.send_text(mode_frame(mode, tokens)?).await?;

        let mut subs = self.shared.subscriptions.lock().await;
        for token in tokens {
            subs.insert(*token, Some(mode));
        }
        tracing::debug!(%mode, count = tokens.len(), "mode set");
        Ok(())
    }

    /// Re-send the whole subscription table on the current connection.
    pub async fn resubscribe(&self) -> Result<()> {
        let frames = {
            let subs = self.shared.subscriptions.lock().await;
            resubscribe_frames(&subs)?
        };
        for frame in frames {
            self.shared.send_text(frame).await?;
        }
        Ok(())
    }

    /// Snapshot of the subscription table.
    pub async fn subscriptions(&self) -> Subscriptions {
        self.shared.subscriptions.lock().await.clone()
    }

    /// Close the connection with a normal-closure frame and stop
    /// [`KiteTicker::serve`] without reconnecting.
    pub async fn close(&self) -> Result<()> {
        self.shared.closed.store(true, Ordering::SeqCst);
        self.shared.shutdown.send_replace(true);

        let mut guard = self.shared.writer.lock().await;
        if let Some(writer) = guard.as_mut() {
            let frame = CloseFrame {
                code: CloseCode::Normal,
                reason: String::new().into(),
            };
            writer.send(Message::Close(Some(frame))).await?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Liveness
// ---------------------------------------------------------------------------

struct Liveness {
    started: Instant,
    last_seen_ms: AtomicU64,
    /// Wakes the reader when the watcher gives up on the connection.
    kill: Notify,
    /// Wakes the watcher when the reader has finished.
    reader_done: Notify,
}

impl Liveness {
    fn new() -> Self {
        Self {
            started: Instant::now(),
            last_seen_ms: AtomicU64::new(0),
            kill: Notify::new(),
            reader_done: Notify::new(),
        }
    }

    fn touch(&self) {
        let ms = self.started.elapsed().as_millis() as u64;
        self.last_seen_ms.store(ms, Ordering::SeqCst);
    }

    fn idle(&self) -> Duration {
        let last = Duration::from_millis(self.last_seen_ms.load(Ordering::SeqCst));
        self.started.elapsed().saturating_sub(last)
    }
}

// ---------------------------------------------------------------------------
// Server text messages
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ServerMessage {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: serde_json::Value,
}

#[derive(Debug)]
enum TextEvent {
    Error(String),
    Order(Box<Order>),
    Ignored,
}

fn decode_text(text: &str) -> Result<TextEvent> {
    let msg: ServerMessage = serde_json::from_str(text)?;
    match msg.kind.as_str() {
        "error" => Ok(TextEvent::Error(match msg.data {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        })),
        "order" => Ok(TextEvent::Order(Box::new(serde_json::from_value(msg.data)?))),
        _ => Ok(TextEvent::Ignored),
    }
}

// ---------------------------------------------------------------------------
// KiteTicker
// ---------------------------------------------------------------------------

/// Reconnecting client for the Kite streaming ticker.
pub struct KiteTicker {
    api_key: String,
    access_token: String,
    config: TickerConfig,
    callbacks: Callbacks,
    shared: Arc<Shared>,
}

impl KiteTicker {
    /// A ticker with default settings and no callbacks.
    pub fn new(api_key: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            access_token: access_token.into(),
            config: TickerConfig::default(),
            callbacks: Callbacks::default(),
            shared: Arc::new(Shared::new()),
        }
    }

    pub fn builder(api_key: impl Into<String>, access_token: impl Into<String>) -> TickerBuilder {
        TickerBuilder::new(api_key, access_token)
    }

    pub fn config(&self) -> &TickerConfig {
        &self.config
    }

    /// Change the backoff cap. Values under 5 s are rejected.
    pub fn set_reconnect_max_delay(&mut self, delay: Duration) -> Result<()> {
        check_max_delay(delay)?;
        self.config.reconnect_max_delay = delay;
        Ok(())
    }

    pub fn set_access_token(&mut self, access_token: impl Into<String>) {
        self.access_token = access_token.into();
    }

    /// A control handle usable from other tasks while [`serve`](Self::serve)
    /// runs.
    pub fn handle(&self) -> TickerHandle {
        TickerHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Connection URL with credentials attached.
    pub fn url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.config.root_url)?;
        url.query_pairs_mut()
            .append_pair("api_key", &self.api_key)
            .append_pair("access_token", &self.access_token);
        Ok(url)
    }

    /// Connect and stream until the handle is closed, reconnecting is
    /// disabled and the connection drops, or the reconnect budget runs out.
    ///
    /// A [`TickerHandle::close`] is honoured at every stage: while dialling,
    /// while backing off and while streaming. `on_close(1000, "")` fires once
    /// when `serve` returns because of it.
    ///
    /// Only one `serve` may run per ticker.
    pub async fn serve(&self) {
        let mut shutdown = self.shared.shutdown.subscribe();
        let mut attempt: u32 = 0;

        loop {
            if self.shared.is_closed() {
                self.closed_by_user();
                return;
            }

            if attempt > self.config.reconnect_max_retries {
                tracing::error!(attempt, "reconnect attempts exhausted");
                self.callbacks.no_reconnect(attempt);
                return;
            }

            if attempt > 0 {
                let delay = reconnect_delay(attempt, self.config.reconnect_max_delay);
                tracing::warn!(attempt, delay_ms = delay.as_millis() as u64, "reconnecting");
                self.callbacks.reconnect(attempt, delay);

                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = shutdown.changed() => {
                        self.closed_by_user();
                        return;
                    }
                }
            }

            let dialled = tokio::select! {
                res = self.dial() => res,
                _ = shutdown.changed() => {
                    self.closed_by_user();
                    return;
                }
            };
            let ws = match dialled {
                Ok(ws) => ws,
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "ticker dial failed");
                    self.callbacks.error(&e);
                    if !self.config.auto_reconnect {
                        return;
                    }
                    attempt += 1;
                    continue;
                }
            };

            let (write, read) = ws.split();
            *self.shared.writer.lock().await = Some(write);

            // A close that raced the handshake found no writer to send on.
            if self.shared.is_closed() {
                self.release_writer().await;
                self.closed_by_user();
                return;
            }

            tracing::info!(root_url = %self.config.root_url, "ticker connected");
            self.callbacks.connect();

            if attempt > 0 {
                if let Err(e) = self.handle().resubscribe().await {
                    tracing::warn!(error = %e, "resubscribe failed");
                    self.callbacks.error(&e);
                }
            }
            attempt = 0;

            let live = Liveness::new();
            live.touch();
            tokio::join!(self.read_loop(read, &live, &mut shutdown), self.watch(&live));

            self.release_writer().await;

            if self.shared.is_closed() {
                self.closed_by_user();
                return;
            }
            if !self.config.auto_reconnect {
                return;
            }
            attempt += 1;
        }
    }

    fn closed_by_user(&self) {
        tracing::info!("ticker closed");
        self.callbacks.close(u16::from(CloseCode::Normal), "");
    }

    /// Drop the write half. After a user close, a normal-closure frame goes
    /// out first; it may already have been sent by the handle.
    async fn release_writer(&self) {
        let writer = self.shared.writer.lock().await.take();
        let Some(mut writer) = writer else { return };
        if self.shared.is_closed() {
            let frame = CloseFrame {
                code: CloseCode::Normal,
                reason: String::new().into(),
            };
            if let Err(e) = writer.send(Message::Close(Some(frame))).await {
                tracing::debug!(error = %e, "close frame not sent");
            }
        }
    }

    async fn dial(&self) -> Result<WsStream> {
        let url = self.url()?;
        match tokio::time::timeout(self.config.connect_timeout, connect_async(url.as_str())).await {
            Ok(Ok((ws, _resp))) => Ok(ws),
            Ok(Err(e)) => Err(e.into()),
            Err(_) => Err(KiteError::network(format!(
                "WebSocket handshake timed out after {}ms",
                self.config.connect_timeout.as_millis()
            ))),
        }
    }

    /// Read frames until the connection ends, the watcher kills it or the
    /// handle is closed.
    async fn read_loop(&self, mut read: ReaderHalf, live: &Liveness, shutdown: &mut watch::Receiver<bool>) {
        loop {
            let next = tokio::select! {
                _ = live.kill.notified() => break,
                _ = shutdown.changed() => break,
                next = read.next() => next,
            };

            let msg = match next {
                Some(Ok(msg)) => msg,
                Some(Err(e)) => {
                    if !self.shared.is_closed() {
                        let err = KiteError::from(e);
                        tracing::warn!(error = %err, "ticker read failed");
                        self.callbacks.error(&err);
                    }
                    break;
                }
                None => break,
            };

            live.touch();

            match msg {
                Message::Binary(data) => {
                    self.callbacks.message(MessageKind::Binary, &data);
                    let (ticks, err) = decode_frame(&data);
                    for tick in ticks {
                        self.callbacks.tick(tick);
                    }
                    if let Some(e) = err {
                        tracing::warn!(error = %e, len = data.len(), "bad tick frame");
                        self.callbacks.error(&e);
                    }
                }
                Message::Text(text) => {
                    self.callbacks.message(MessageKind::Text, text.as_bytes());
                    self.on_text(&text);
                }
                Message::Close(frame) => {
                    if !self.shared.is_closed() {
                        let (code, reason) = frame
                            .map(|f| (u16::from(f.code), f.reason.as_str().to_owned()))
                            .unwrap_or((u16::from(CloseCode::Status), String::new()));
                        tracing::info!(code, %reason, "ticker closed by server");
                        self.callbacks.close(code, &reason);
                    }
                    break;
                }
                _ => {}
            }
        }

        live.reader_done.notify_one();
    }

    fn on_text(&self, text: &str) {
        match decode_text(text) {
            Ok(TextEvent::Error(message)) => {
                let err = KiteError::new(ErrorKind::General, message);
                self.callbacks.error(&err);
            }
            Ok(TextEvent::Order(order)) => self.callbacks.order_update(*order),
            Ok(TextEvent::Ignored) => {}
            Err(e) => tracing::debug!(error = %e, "unreadable ticker text message"),
        }
    }

    /// Tear the connection down once it has been silent for too long.
    async fn watch(&self, live: &Liveness) {
        let mut interval = tokio::time::interval(CONNECTION_CHECK_INTERVAL);
        interval.tick().await;

        loop {
            tokio::select! {
                _ = live.reader_done.notified() => return,
                _ = interval.tick() => {
                    let idle = live.idle();
                    if idle > DATA_TIMEOUT_INTERVAL {
                        tracing::warn!(idle_ms = idle.as_millis() as u64, "ticker connection timed out");
                        if !self.shared.is_closed() {
                            self.callbacks.error(&KiteError::network("no data received from ticker"));
                        }
                        live.kill.notify_one();
                        return;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_until_cap() {
        let max = DEFAULT_RECONNECT_MAX_DELAY;
        let seq: Vec<u64> = (1..=8).map(|a| reconnect_delay(a, max).as_secs()).collect();
        assert_eq!(seq, vec![2, 4, 8, 16, 32, 60, 60, 60]);
        assert_eq!(reconnect_delay(300, max), max);
        assert_eq!(reconnect_delay(3, Duration::from_secs(5)).as_secs(), 5);
    }

    #[test]
    fn max_delay_floor() {
        let err = check_max_delay(Duration::from_millis(4_999)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Input);
        assert!(check_max_delay(Duration::from_secs(5)).is_ok());

        let mut ticker = KiteTicker::new("k", "t");
        assert!(ticker.set_reconnect_max_delay(Duration::from_secs(1)).is_err());
        assert!(ticker.set_reconnect_max_delay(Duration::from_secs(10)).is_ok());
        assert_eq!(ticker.config().reconnect_max_delay, Duration::from_secs(10));
    }

    #[test]
    fn defaults() {
        let c = TickerConfig::default();
        assert_eq!(c.root_url, "wss://ws.kite.trade");
        assert_eq!(c.connect_timeout, Duration::from_secs(7));
        assert!(c.auto_reconnect);
        assert_eq!(c.reconnect_max_retries, 300);
        assert_eq!(c.reconnect_max_delay, Duration::from_secs(60));
    }

    #[test]
    fn url_carries_credentials() {
        let ticker = KiteTicker::new("my_key", "tok/en");
        assert_eq!(
            ticker.url().unwrap().as_str(),
            "wss://ws.kite.trade/?api_key=my_key&access_token=tok%2Fen"
        );
    }

    #[test]
    fn control_frames() {
        assert_eq!(
            subscribe_frame(&[408065, 884737]).unwrap(),
            r#"{"a":"subscribe","v":[408065,884737]}"#
        );
        assert_eq!(unsubscribe_frame(&[1]).unwrap(), r#"{"a":"unsubscribe","v":[1]}"#);
        assert_eq!(
            mode_frame(Mode::Full, &[408065]).unwrap(),
            r#"{"a":"mode","v":["full",[408065]]}"#
        );
    }

    #[test]
    fn resubscribe_plan() {
        let mut subs = Subscriptions::new();
        subs.insert(3, Some(Mode::Full));
        subs.insert(1, None);
        subs.insert(2, Some(Mode::Quote));
        subs.insert(4, Some(Mode::Full));

        let frames = resubscribe_frames(&subs).unwrap();
        assert_eq!(
            frames,
            vec![
                r#"{"a":"subscribe","v":[1,2,3,4]}"#.to_owned(),
                r#"{"a":"mode","v":["quote",[2]]}"#.to_owned(),
                r#"{"a":"mode","v":["full",[3,4]]}"#.to_owned(),
            ]
        );

        assert!(resubscribe_frames(&Subscriptions::new()).unwrap().is_empty());
    }

    #[test]
    fn text_messages() {
        match decode_text(r#"{"type":"error","data":"bad token"}"#).unwrap() {
            TextEvent::Error(m) => assert_eq!(m, "bad token"),
            other => panic!("unexpected {other:?}"),
        }

        let order = r#"{"type":"order","data":{"order_id":"151220000000000","status":"COMPLETE"}}"#;
        match decode_text(order).unwrap() {
            TextEvent::Order(o) => {
                assert_eq!(o.order_id, "151220000000000");
                assert_eq!(o.status, "COMPLETE");
            }
            other => panic!("unexpected {other:?}"),
        }

        assert!(matches!(
            decode_text(r#"{"type":"message","data":"hi"}"#).unwrap(),
            TextEvent::Ignored
        ));
        assert!(decode_text("not json").is_err());
    }

    #[tokio::test]
    async fn control_calls_need_a_connection() {
        let handle = KiteTicker::new("k", "t").handle();
        assert!(handle.subscribe(&[]).await.is_ok());

        let err = handle.subscribe(&[1]).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);
        assert!(handle.subscriptions().await.is_empty());
    }
}
