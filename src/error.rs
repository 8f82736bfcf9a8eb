//! Error types for the `kite-rs` crate.
//!
//! All fallible operations in this crate return [`Result<T>`], which is an
//! alias for `std::result::Result<T, KiteError>`.
//!
//! Every [`KiteError`] carries a symbolic [`ErrorKind`] (mirroring the
//! `*Exception` names the Kite Connect API reports in `error_type`), the HTTP
//! status code associated with that kind, a user-visible message and the
//! optional `data` payload the server attached to the error envelope.
//!
//! The two maps between kinds and HTTP codes are total:
//!
//! | kind | code |
//! |---|---|
//! | General | 500 |
//! | Token, Permission, User, TwoFA | 403 |
//! | Order, Input | 400 |
//! | Data | 504 |
//! | Network | 503 |
//! | TPINAuth | 428 |

use std::fmt;

/// Symbolic error category reported by the Kite Connect API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// `GeneralException`: unclassified server-side failure.
    General,
    /// `TokenException`: session expired or invalidated.
    Token,
    /// `PermissionException`: the api key is not allowed this operation.
    Permission,
    /// `UserException`: account-level problem.
    User,
    /// `TwoFAException`: second factor failed.
    TwoFA,
    /// `OrderException`: order placement or fetch failed.
    Order,
    /// `InputException`: missing or invalid parameters.
    Input,
    /// `DataException`: the response could not be read or decoded.
    Data,
    /// `NetworkException`: transport failure talking to the API or OMS.
    Network,
    /// `TPINAuthException`: holdings need CDSL TPIN authorisation.
    TPINAuth,
}

impl ErrorKind {
    /// All kinds, in declaration order.
    pub const ALL: [ErrorKind; 10] = [
        Self::General,
        Self::Token,
        Self::Permission,
        Self::User,
        Self::TwoFA,
        Self::Order,
        Self::Input,
        Self::Data,
        Self::Network,
        Self::TPINAuth,
    ];

    /// The `error_type` string used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::General => "GeneralException",
            Self::Token => "TokenException",
            Self::Permission => "PermissionException",
            Self::User => "UserException",
            Self::TwoFA => "TwoFAException",
            Self::Order => "OrderException",
            Self::Input => "InputException",
            Self::Data => "DataException",
            Self::Network => "NetworkException",
            Self::TPINAuth => "TPINAuthException",
        }
    }

    /// Look up a kind by its wire name. Returns `None` for unknown names.
    ///
    /// `PermissionError` is accepted as an alias of `PermissionException`
    /// since the API has used both spellings.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "GeneralException" => Some(Self::General),
            "TokenException" => Some(Self::Token),
            "PermissionException" | "PermissionError" => Some(Self::Permission),
            "UserException" => Some(Self::User),
            "TwoFAException" => Some(Self::TwoFA),
            "OrderException" => Some(Self::Order),
            "InputException" => Some(Self::Input),
            "DataException" => Some(Self::Data),
            "NetworkException" => Some(Self::Network),
            "TPINAuthException" => Some(Self::TPINAuth),
            _ => None,
        }
    }

    /// Canonical HTTP status code for this kind.
    pub fn http_code(self) -> u16 {
        match self {
            Self::General => 500,
            Self::Token | Self::Permission | Self::User | Self::TwoFA => 403,
            Self::Order | Self::Input => 400,
            Self::Data => 504,
            Self::Network => 503,
            Self::TPINAuth => 428,
        }
    }

    /// Map an HTTP status code to a kind. Total: unmapped codes are `General`.
    pub fn from_http_code(code: i32) -> Self {
        match code {
            500 => Self::General,
            401 | 403 => Self::Token,
            400 => Self::Input,
            503 | 504 => Self::Network,
            428 => Self::TPINAuth,
            _ => Self::General,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// All errors produced by the `kite-rs` client.
///
/// `Display` renders only the message, so the error can be shown to users
/// as-is. Use [`kind`](Self::kind) to branch on the category.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct KiteError {
    kind: ErrorKind,
    code: u16,
    message: String,
    data: Option<serde_json::Value>,
    #[source]
    source: Option<BoxError>,
}

impl KiteError {
    /// Create an error of the given kind; `code` is the kind's canonical code.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: kind.http_code(),
            message: message.into(),
            data: None,
            source: None,
        }
    }

    /// Create an error from a wire `error_type` name.
    ///
    /// Unknown names collapse to [`ErrorKind::General`] with code 500.
    pub fn from_name(name: &str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::from_name(name).unwrap_or(ErrorKind::General), message)
    }

    /// Shorthand for an [`ErrorKind::Input`] error.
    pub fn input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Input, message)
    }

    /// Shorthand for an [`ErrorKind::Data`] error.
    pub fn data(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Data, message)
    }

    /// Shorthand for an [`ErrorKind::Network`] error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, message)
    }

    /// Override the HTTP code (used when the server's status differs from the
    /// kind's canonical code).
    pub fn with_code(mut self, code: u16) -> Self {
        self.code = code;
        self
    }

    /// Attach the server-supplied `data` payload.
    pub fn with_data(mut self, data: Option<serde_json::Value>) -> Self {
        self.data = data.filter(|v| !v.is_null());
        self
    }

    /// Attach the underlying cause.
    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// The symbolic category.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The HTTP status code.
    pub fn code(&self) -> u16 {
        self.code
    }

    /// The user-visible message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Diagnostic payload from the server's error envelope, if any.
    pub fn server_data(&self) -> Option<&serde_json::Value> {
        self.data.as_ref()
    }
}

impl From<reqwest::Error> for KiteError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() || e.is_body() {
            return Self::data("Error reading response.").with_source(e);
        }
        let message = if e.is_timeout() {
            "Request timed out."
        } else {
            "Request failed."
        };
        Self::network(message).with_source(e)
    }
}

impl From<serde_json::Error> for KiteError {
    fn from(e: serde_json::Error) -> Self {
        Self::data(format!("Error parsing response: {e}")).with_source(e)
    }
}

impl From<csv::Error> for KiteError {
    fn from(e: csv::Error) -> Self {
        Self::data(format!("Error parsing csv response: {e}")).with_source(e)
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for KiteError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::network(format!("WebSocket error: {e}")).with_source(e)
    }
}

impl From<url::ParseError> for KiteError {
    fn from(e: url::ParseError) -> Self {
        Self::input(format!("Invalid URL: {e}")).with_source(e)
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, KiteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_its_tabulated_code() {
        let expected = [500, 403, 403, 403, 403, 400, 400, 504, 503, 428];
        for (kind, code) in ErrorKind::ALL.into_iter().zip(expected) {
            let err = KiteError::new(kind, "boom");
            assert_eq!(err.code(), code, "{kind}");
            assert_eq!(err.kind(), kind);
        }
    }

    #[test]
    fn unknown_name_collapses_to_general() {
        let err = KiteError::from_name("SomethingElse", "x");
        assert_eq!(err.kind(), ErrorKind::General);
        assert_eq!(err.code(), 500);
    }

    #[test]
    fn inverse_map_is_total() {
        let cases = [
            (500, ErrorKind::General),
            (401, ErrorKind::Token),
            (403, ErrorKind::Token),
            (400, ErrorKind::Input),
            (503, ErrorKind::Network),
            (504, ErrorKind::Network),
            (428, ErrorKind::TPINAuth),
            (-1, ErrorKind::General),
            (418, ErrorKind::General),
        ];
        for (code, kind) in cases {
            assert_eq!(ErrorKind::from_http_code(code), kind, "code {code}");
        }
    }

    #[test]
    fn round_trip_is_stable_on_canonical_codes() {
        for kind in [
            ErrorKind::General,
            ErrorKind::Token,
            ErrorKind::Input,
            ErrorKind::Network,
            ErrorKind::TPINAuth,
        ] {
            assert_eq!(ErrorKind::from_http_code(kind.http_code().into()), kind);
        }
    }

    #[test]
    fn names_round_trip() {
        for kind in ErrorKind::ALL {
            assert_eq!(ErrorKind::from_name(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn display_is_the_message() {
        let err = KiteError::input("quantity must be positive");
        assert_eq!(err.to_string(), "quantity must be positive");
    }

    #[test]
    fn null_data_is_dropped() {
        let err = KiteError::data("x").with_data(Some(serde_json::Value::Null));
        assert!(err.server_data().is_none());
    }

    #[test]
    fn data_kind_and_server_payload_are_separate() {
        let err = KiteError::data("bad frame");
        assert_eq!(err.kind(), ErrorKind::Data);
        assert_eq!(err.code(), 504);
        assert!(err.server_data().is_none());

        let err = KiteError::input("x").with_data(Some(serde_json::json!({ "field": "qty" })));
        assert_eq!(err.server_data().and_then(|d| d["field"].as_str()), Some("qty"));
    }
}
