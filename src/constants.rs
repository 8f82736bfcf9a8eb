//! Constants for the Kite Connect v3 API.
//!
//! Contains base URLs, request headers, REST endpoint templates and the
//! WebSocket ticker timings. These are used internally by
//! [`KiteClient`](crate::client::KiteClient) and
//! [`KiteTicker`](crate::ws::ticker::KiteTicker), but are also exported for
//! advanced usage.
//!
//! Endpoint templates use positional substitution: `%s` for strings and `%d`
//! for integers. See [`fill_template`].

use std::time::Duration;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

// ---------------------------------------------------------------------------
// Base URLs
// ---------------------------------------------------------------------------

/// Base URL for the Kite Connect REST API.
pub const API_BASE_URL: &str = "https://api.kite.trade";

/// Browser login URL; `%s` is the api key.
pub const LOGIN_URL: &str = "https://kite.trade/connect/login?api_key=%s&v=3";

/// Base URL of the Kite web app (holdings authorisation redirects live here).
pub const KITE_BASE_URL: &str = "https://kite.zerodha.com";

/// Default WebSocket root for the ticker.
pub const WS_TICKER_URL: &str = "wss://ws.kite.trade";

// ---------------------------------------------------------------------------
// Headers
// ---------------------------------------------------------------------------

/// Value of the `X-Kite-Version` header sent on every request.
pub const KITE_HEADER_VERSION: &str = "3";

/// Product name used in the `User-Agent` header.
pub const CLIENT_NAME: &str = env!("CARGO_PKG_NAME");

/// Version used in the `User-Agent` header.
pub const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");

// ---------------------------------------------------------------------------
// HTTP defaults
// ---------------------------------------------------------------------------

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(7_000);

/// Upper bound on establishing a connection before the request is abandoned.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Idle keep-alive connections kept per host.
pub const DEFAULT_POOL_IDLE_PER_HOST: usize = 10;

// ---------------------------------------------------------------------------
// REST endpoints
// ---------------------------------------------------------------------------

/// REST endpoint templates relative to the base URL.
pub mod endpoints {
    pub const USER_SESSION: &str = "/session/token";
    pub const USER_SESSION_INVALIDATE: &str = "/session/token";
    pub const USER_SESSION_RENEW: &str = "/session/refresh_token";
    pub const USER_PROFILE: &str = "/user/profile";
    pub const USER_MARGINS: &str = "/user/margins";
    pub const USER_MARGINS_SEGMENT: &str = "/user/margins/%s";

    pub const GET_ORDERS: &str = "/orders";
    pub const GET_TRADES: &str = "/trades";
    pub const GET_ORDER_HISTORY: &str = "/orders/%s";
    pub const GET_ORDER_TRADES: &str = "/orders/%s/trades";
    pub const PLACE_ORDER: &str = "/orders/%s";
    pub const MODIFY_ORDER: &str = "/orders/%s/%s";
    pub const CANCEL_ORDER: &str = "/orders/%s/%s";

    pub const GET_POSITIONS: &str = "/portfolio/positions";
    pub const GET_HOLDINGS: &str = "/portfolio/holdings";
    pub const CONVERT_POSITION: &str = "/portfolio/positions";
    pub const INIT_HOLDINGS_AUTH: &str = "/portfolio/holdings/authorise";

    pub const GET_MF_ORDERS: &str = "/mf/orders";
    pub const GET_MF_ORDER_INFO: &str = "/mf/orders/%s";
    pub const PLACE_MF_ORDER: &str = "/mf/orders";
    pub const CANCEL_MF_ORDER: &str = "/mf/orders/%s";
    pub const GET_MF_SIPS: &str = "/mf/sips";
    pub const GET_MF_SIP_INFO: &str = "/mf/sips/%s";
    pub const PLACE_MF_SIP: &str = "/mf/sips";
    pub const MODIFY_MF_SIP: &str = "/mf/sips/%s";
    pub const CANCEL_MF_SIP: &str = "/mf/sips/%s";
    pub const GET_MF_HOLDINGS: &str = "/mf/holdings";
    pub const GET_MF_HOLDING_INFO: &str = "/mf/holdings/%s";
    pub const GET_ALLOTTED_ISINS: &str = "/mf/allotments";
    pub const GET_MF_INSTRUMENTS: &str = "/mf/instruments";

    pub const PLACE_GTT: &str = "/gtt/triggers";
    pub const GET_GTTS: &str = "/gtt/triggers";
    pub const GET_GTT: &str = "/gtt/triggers/%d";
    pub const MODIFY_GTT: &str = "/gtt/triggers/%d";
    pub const DELETE_GTT: &str = "/gtt/triggers/%d";

    pub const GET_INSTRUMENTS: &str = "/instruments";
    pub const GET_INSTRUMENTS_EXCHANGE: &str = "/instruments/%s";
    pub const GET_HISTORICAL: &str = "/instruments/historical/%d/%s";
    pub const GET_TRIGGER_RANGE: &str = "/instruments/%s/%s/trigger_range";

    pub const GET_QUOTE: &str = "/quote";
    pub const GET_LTP: &str = "/quote/ltp";
    pub const GET_OHLC: &str = "/quote/ohlc";

    pub const ORDER_MARGINS: &str = "/margins/orders";
    pub const BASKET_MARGINS: &str = "/margins/basket";
}

/// A single positional argument for [`fill_template`].
#[derive(Debug, Clone, Copy)]
pub enum PathArg<'a> {
    /// Substituted for `%s`.
    Str(&'a str),
    /// Substituted for `%d`.
    Int(i64),
}

impl<'a> From<&'a str> for PathArg<'a> {
    fn from(s: &'a str) -> Self {
        PathArg::Str(s)
    }
}

impl From<i64> for PathArg<'_> {
    fn from(n: i64) -> Self {
        PathArg::Int(n)
    }
}

impl From<u32> for PathArg<'_> {
    fn from(n: u32) -> Self {
        PathArg::Int(n.into())
    }
}

/// Bytes escaped inside a single path segment: everything outside the RFC 3986
/// unreserved set.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'$')
    .add(b'%')
    .add(b'&')
    .add(b'\'')
    .add(b'(')
    .add(b')')
    .add(b'*')
    .add(b'+')
    .add(b',')
    .add(b'/')
    .add(b':')
    .add(b';')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'?')
    .add(b'@')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}')
    .add(b'!');

/// Substitute positional `%s` / `%d` placeholders in an endpoint template.
///
/// String arguments are percent-encoded as a single path segment. Returns
/// `None` when the number or type of arguments does not match the template.
///
/// ```
/// use kite_rs::constants::{endpoints, fill_template};
///
/// let path = fill_template(endpoints::MODIFY_ORDER, &["regular".into(), "151220000000000".into()]);
/// assert_eq!(path.as_deref(), Some("/orders/regular/151220000000000"));
/// ```
pub fn fill_template(template: &str, args: &[PathArg<'_>]) -> Option<String> {
    let mut out = String::with_capacity(template.len() + 16);
    let mut args = args.iter();
    let mut rest = template;

    while let Some(idx) = rest.find('%') {
        out.push_str(&rest[..idx]);
        let placeholder = rest.as_bytes().get(idx + 1).copied();
        match (placeholder, args.next()) {
            (Some(b's'), Some(PathArg::Str(s))) => {
                out.extend(utf8_percent_encode(s, PATH_SEGMENT));
            }
            (Some(b'd'), Some(PathArg::Int(n))) => out.push_str(&n.to_string()),
            _ => return None,
        }
        rest = &rest[idx + 2..];
    }
    out.push_str(rest);

    if args.next().is_some() {
        return None;
    }
    Some(out)
}

// ---------------------------------------------------------------------------
// Ticker
// ---------------------------------------------------------------------------

/// Ticker timings and limits.
pub mod ticker {
    use std::time::Duration;

    /// Default maximum number of reconnect attempts.
    pub const DEFAULT_RECONNECT_MAX_RETRIES: u32 = 300;

    /// Reconnect delay can't be configured below this.
    pub const RECONNECT_MIN_DELAY: Duration = Duration::from_millis(5_000);

    /// Default cap on the exponential reconnect delay.
    pub const DEFAULT_RECONNECT_MAX_DELAY: Duration = Duration::from_millis(60_000);

    /// Default timeout for the WebSocket handshake.
    pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(7_000);

    /// Period of the liveness watcher.
    pub const CONNECTION_CHECK_INTERVAL: Duration = Duration::from_millis(2_000);

    /// A connection that has been silent for longer than this is dead.
    pub const DATA_TIMEOUT_INTERVAL: Duration = Duration::from_millis(5_000);
}
