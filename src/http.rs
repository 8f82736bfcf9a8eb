//! HTTP transport and response envelope decoding.
//!
//! [`HttpTransport`] is the thin layer over [`reqwest::Client`]: it
//! form-encodes parameters (into the body for `POST`/`PUT`, into the query
//! string otherwise), reads the whole body and hands back the raw status,
//! headers and bytes. It knows nothing about Kite's JSON wrapper.
//!
//! [`decode_envelope`] interprets that wrapper:
//!
//! ```text
//! {"status": "success", "data": <T>}
//! {"status": "error", "error_type": "...", "message": "...", "data": ...}
//! ```
//!
//! Any HTTP status >= 400 is routed to the error branch regardless of what
//! the body claims.

use bytes::Bytes;
use reqwest::Method;
use reqwest::header::{self, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::constants::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_POOL_IDLE_PER_HOST};
use crate::error::{ErrorKind, KiteError, Result};

/// Form parameters. Keys may repeat (`i=NSE:INFY&i=NSE:TCS`).
pub type Params = Vec<(String, String)>;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Raw response as read off the wire.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HeaderMap,
    /// Fully drained response body.
    pub body: Bytes,
}

/// Form-encoding HTTP transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    debug: bool,
}

impl HttpTransport {
    /// Build a transport with the default pool and the given request timeout.
    pub fn new(timeout: std::time::Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .pool_max_idle_per_host(DEFAULT_POOL_IDLE_PER_HOST)
            .build()
            .map_err(|e| KiteError::new(ErrorKind::General, "failed to build HTTP client").with_source(e))?;
        Ok(Self::with_client(client))
    }

    /// Wrap a caller-configured [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client, debug: false }
    }

    /// Enable or disable the per-request debug log line.
    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// Whether the per-request debug log line is enabled.
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Issue a request with form parameters.
    pub async fn execute(
        &self,
        method: Method,
        url: &str,
        params: &[(String, String)],
        mut headers: HeaderMap,
    ) -> Result<HttpResponse> {
        let mut target = url::Url::parse(url)?;

        let body = if method == Method::POST || method == Method::PUT {
            if !headers.contains_key(header::CONTENT_TYPE) {
                headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
            }
            Some(encode_form(params))
        } else {
            if !params.is_empty() {
                target.query_pairs_mut().extend_pairs(params);
            }
            None
        };

        self.send(method, target, body, headers).await
    }

    /// Issue a request with a pre-serialized body.
    pub async fn execute_raw(
        &self,
        method: Method,
        url: &str,
        body: Vec<u8>,
        headers: HeaderMap,
    ) -> Result<HttpResponse> {
        let target = url::Url::parse(url)?;
        self.send(method, target, Some(body), headers).await
    }

    async fn send(
        &self,
        method: Method,
        url: url::Url,
        body: Option<impl Into<reqwest::Body>>,
        headers: HeaderMap,
    ) -> Result<HttpResponse> {
        let path = url.path().to_owned();
        let logged_headers = self.debug.then(|| masked_headers(&headers));

        let mut req = self.client.request(method.clone(), url).headers(headers);
        if let Some(body) = body {
            req = req.body(body);
        }

        let resp = req.send().await?;
        let status = resp.status().as_u16();
        let headers = resp.headers().clone();
        let body = resp
            .bytes()
            .await
            .map_err(|e| KiteError::data("Error reading response.").with_source(e))?;

        if let Some(request_headers) = logged_headers {
            tracing::debug!(%method, %path, status, headers = ?request_headers, "kite request");
        }

        Ok(HttpResponse { status, headers, body })
    }
}

/// `application/x-www-form-urlencoded` serialization of `params`.
pub fn encode_form(params: &[(String, String)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish()
}

/// Flatten a serializable parameter struct into form pairs.
///
/// `null` fields are skipped, arrays become repeated keys, nested objects are
/// sent as JSON text.
pub fn form_params<T: serde::Serialize + ?Sized>(value: &T) -> Result<Params> {
    let value = serde_json::to_value(value)
        .map_err(|e| KiteError::input(format!("Error encoding params: {e}")).with_source(e))?;
    let Value::Object(fields) = value else {
        return Err(KiteError::input("params must serialize to an object"));
    };

    let mut params = Params::with_capacity(fields.len());
    for (key, field) in fields {
        match field {
            Value::Null => {}
            Value::Array(items) => {
                for item in items {
                    if let Some(text) = scalar_text(item) {
                        params.push((key.clone(), text));
                    }
                }
            }
            other => {
                if let Some(text) = scalar_text(other) {
                    params.push((key, text));
                }
            }
        }
    }
    Ok(params)
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        nested => Some(nested.to_string()),
    }
}

/// Header list for logging, with the `Authorization` secret masked.
fn masked_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let value = value.to_str().unwrap_or("<binary>");
            let value = if name == header::AUTHORIZATION {
                mask_authorization(value)
            } else {
                value.to_owned()
            };
            (name.as_str().to_owned(), value)
        })
        .collect()
}

/// `token key:secret` becomes `token key:se****`.
fn mask_authorization(value: &str) -> String {
    match value.rsplit_once(':') {
        Some((prefix, secret)) => {
            let shown: String = secret.chars().take(2).collect();
            format!("{prefix}:{shown}****")
        }
        None => "****".to_owned(),
    }
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error_type: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    data: Value,
    #[serde(default)]
    error_type: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Decode a Kite response envelope into `T`.
///
/// Status >= 400 always yields an error. The kind is taken from
/// `error_type` when recognised, otherwise from the HTTP code; 428 is always
/// [`ErrorKind::TPINAuth`]. A success body whose `data` does not decode as `T`
/// is a [`ErrorKind::Data`] error.
pub fn decode_envelope<T: DeserializeOwned>(status: u16, body: &[u8]) -> Result<T> {
    if status >= 400 {
        return Err(error_from_body(status, body));
    }

    let envelope: Envelope = serde_json::from_slice(body)
        .map_err(|e| KiteError::data("Error parsing response.").with_source(e))?;

    if envelope.status.as_deref() == Some("error") {
        let env = ErrorEnvelope {
            error_type: envelope.error_type,
            message: envelope.message,
            data: Some(envelope.data),
        };
        return Err(error_from_envelope(status, env));
    }

    serde_json::from_value(envelope.data)
        .map_err(|e| KiteError::data(format!("Error parsing response: {e}")).with_source(e))
}

/// Like [`decode_envelope`] for endpoints whose success body is CSV.
pub fn decode_csv<T: DeserializeOwned>(status: u16, body: &[u8]) -> Result<Vec<T>> {
    if status >= 400 {
        return Err(error_from_body(status, body));
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(body);
    reader
        .deserialize()
        .collect::<std::result::Result<Vec<T>, csv::Error>>()
        .map_err(KiteError::from)
}

/// Build the error for a response with status >= 400.
pub fn error_from_body(status: u16, body: &[u8]) -> KiteError {
    match serde_json::from_slice::<ErrorEnvelope>(body) {
        Ok(env) => error_from_envelope(status, env),
        Err(_) => {
            let kind = kind_for_status(status, None);
            let text = String::from_utf8_lossy(body);
            let message = if text.trim().is_empty() {
                format!("HTTP {status}")
            } else {
                text.trim().to_owned()
            };
            KiteError::new(kind, message).with_code(status)
        }
    }
}

fn error_from_envelope(status: u16, env: ErrorEnvelope) -> KiteError {
    let kind = kind_for_status(status, env.error_type.as_deref());
    let message = env
        .message
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| kind.as_str().to_owned());
    let code = if status >= 400 { status } else { kind.http_code() };
    KiteError::new(kind, message).with_code(code).with_data(env.data)
}

fn kind_for_status(status: u16, error_type: Option<&str>) -> ErrorKind {
    if status == 428 {
        return ErrorKind::TPINAuth;
    }
    error_type
        .and_then(ErrorKind::from_name)
        .unwrap_or_else(|| ErrorKind::from_http_code(status.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Profile {
        user_id: String,
    }

    #[test]
    fn error_status_routes_to_the_server_kind() {
        let body = br#"{"status":"error","error_type":"TokenException","message":"bad","data":null}"#;
        let err = decode_envelope::<Profile>(403, body).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Token);
        assert_eq!(err.code(), 403);
        assert_eq!(err.message(), "bad");
        assert!(err.server_data().is_none());
    }

    #[test]
    fn tpin_status_wins_over_body() {
        for body in [
            &br#"{"status":"error","error_type":"InputException","message":"x"}"#[..],
            b"<html>nope</html>",
            b"",
        ] {
            let err = decode_envelope::<Value>(428, body).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::TPINAuth);
            assert_eq!(err.code(), 428);
        }
    }

    #[test]
    fn unknown_error_type_falls_back_to_status() {
        let body = br#"{"status":"error","error_type":"WeirdException","message":"slow down"}"#;
        let err = decode_envelope::<Value>(504, body).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);
        assert_eq!(err.code(), 504);

        let err = decode_envelope::<Value>(502, b"Bad Gateway").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::General);
        assert_eq!(err.message(), "Bad Gateway");
    }

    #[test]
    fn error_status_never_decodes_as_success() {
        let body = br#"{"status":"success","data":{"user_id":"AB1234"}}"#;
        let err = decode_envelope::<Profile>(400, body).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Input);
    }

    #[test]
    fn error_data_is_propagated() {
        let body = br#"{"status":"error","error_type":"OrderException","message":"rejected","data":{"order_id":"1"}}"#;
        let err = decode_envelope::<Value>(400, body).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Order);
        assert_eq!(err.server_data().and_then(|d| d["order_id"].as_str()), Some("1"));
    }

    #[test]
    fn success_populates_target() {
        let body = br#"{"status":"success","data":{"user_id":"AB1234"}}"#;
        let profile: Profile = decode_envelope(200, body).unwrap();
        assert_eq!(profile.user_id, "AB1234");
    }

    #[test]
    fn success_with_wrong_shape_is_a_data_error() {
        let body = br#"{"status":"success","data":{"user_id":42}}"#;
        let err = decode_envelope::<Profile>(200, body).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Data);

        let err = decode_envelope::<Profile>(200, b"not json").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Data);
    }

    #[test]
    fn error_status_field_under_ok_status_is_an_error() {
        let body = br#"{"status":"error","error_type":"InputException","message":"missing"}"#;
        let err = decode_envelope::<Value>(200, body).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Input);
        assert_eq!(err.code(), 400);
    }

    #[test]
    fn absent_data_decodes_into_optional_targets() {
        let body = br#"{"status":"success"}"#;
        let out: Option<Profile> = decode_envelope(200, body).unwrap();
        assert!(out.is_none());
        assert!(decode_envelope::<Profile>(200, body).is_err());
    }

    #[test]
    fn form_encoding_keeps_repeated_keys() {
        let params: Params = vec![
            ("i".into(), "NSE:INFY".into()),
            ("i".into(), "BSE:SENSEX 50".into()),
        ];
        assert_eq!(encode_form(&params), "i=NSE%3AINFY&i=BSE%3ASENSEX+50");
    }

    #[test]
    fn struct_params_flatten_to_pairs() {
        #[derive(serde::Serialize)]
        struct P {
            exchange: &'static str,
            quantity: u32,
            price: Option<f64>,
            trigger_price: Option<f64>,
            isin: Vec<&'static str>,
        }
        let params = form_params(&P {
            exchange: "NSE",
            quantity: 10,
            price: Some(1520.5),
            trigger_price: None,
            isin: vec!["INE002A01018", "INE009A01021"],
        })
        .unwrap();

        assert!(params.contains(&("exchange".into(), "NSE".into())));
        assert!(params.contains(&("quantity".into(), "10".into())));
        assert!(params.contains(&("price".into(), "1520.5".into())));
        assert!(!params.iter().any(|(k, _)| k == "trigger_price"));
        assert_eq!(params.iter().filter(|(k, _)| k == "isin").count(), 2);

        assert!(form_params(&5).is_err());
    }

    #[test]
    fn authorization_is_masked() {
        assert_eq!(mask_authorization("token abc:secret"), "token abc:se****");
        assert_eq!(mask_authorization("garbage"), "****");

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("token k:tok"));
        headers.insert("x-kite-version", HeaderValue::from_static("3"));
        let logged = masked_headers(&headers);
        assert!(logged.contains(&("authorization".into(), "token k:to****".into())));
        assert!(logged.contains(&("x-kite-version".into(), "3".into())));
    }

    #[test]
    fn csv_rows_decode() {
        #[derive(Debug, Deserialize)]
        struct Row {
            instrument_token: u32,
            tradingsymbol: String,
        }
        let body = b"instrument_token,tradingsymbol\n408065,INFY\n2953217,TCS\n";
        let rows: Vec<Row> = decode_csv(200, body).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].instrument_token, 2953217);
        assert_eq!(rows[0].tradingsymbol, "INFY");

        let err = decode_csv::<Row>(403, br#"{"error_type":"TokenException","message":"x"}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Token);
    }
}
