//! Core HTTP client for the Kite Connect v3 REST API.
//!
//! The [`KiteClient`] struct is the main entry point for interacting with all
//! Kite Connect REST endpoints. It composes the form-encoding
//! [`HttpTransport`] with the envelope decoder and attaches the
//! version and authorization headers to every request.
//!
//! API endpoint methods are added to `KiteClient` via `impl` blocks in the
//! [`crate::api`] module.

use std::time::Duration;

use reqwest::Method;
use reqwest::header::{self, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::constants::{
    API_BASE_URL, CLIENT_NAME, CLIENT_VERSION, DEFAULT_REQUEST_TIMEOUT, KITE_HEADER_VERSION,
    LOGIN_URL, PathArg, fill_template,
};
use crate::error::{KiteError, Result};
use crate::http::{self, HttpResponse, HttpTransport};

const KITE_VERSION_HEADER: &str = "x-kite-version";

/// Core HTTP client for the Kite Connect v3 REST API.
///
/// Cheap to clone: clones share the underlying connection pool.
///
/// # Example
///
/// ```no_run
/// use kite_rs::KiteClient;
///
/// # #[tokio::main]
/// # async fn main() -> kite_rs::Result<()> {
/// let mut client = KiteClient::new("my_api_key")?;
/// println!("log in at {}", client.login_url());
/// // after the redirect hands back a request token:
/// let session = client.generate_session("request_token", "api_secret").await?;
/// println!("hello {}", session.user_name);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct KiteClient {
    transport: HttpTransport,
    api_key: String,
    access_token: String,
    base_url: String,
}

/// Builder for [`KiteClient`].
#[derive(Debug, Clone)]
pub struct KiteClientBuilder {
    api_key: String,
    access_token: String,
    base_url: String,
    timeout: Duration,
    debug: bool,
    http: Option<reqwest::Client>,
}

impl KiteClientBuilder {
    /// Start a builder for the given api key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            access_token: String::new(),
            base_url: API_BASE_URL.to_owned(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
            debug: false,
            http: None,
        }
    }

    /// Access token from an earlier session.
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = token.into();
        self
    }

    /// Point at a different REST root (sandbox or mock server).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Per-request timeout. Ignored when a custom client is supplied.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Log one `debug` line per request.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Use a caller-configured [`reqwest::Client`].
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http = Some(client);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<KiteClient> {
        let mut transport = match self.http {
            Some(client) => HttpTransport::with_client(client),
            None => HttpTransport::new(self.timeout)?,
        };
        transport.set_debug(self.debug);

        Ok(KiteClient {
            transport,
            api_key: self.api_key,
            access_token: self.access_token,
            base_url: self.base_url.trim_end_matches('/').to_owned(),
        })
    }
}

impl KiteClient {
    /// Create a client with default settings and no access token.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        KiteClientBuilder::new(api_key).build()
    }

    /// Start a [`KiteClientBuilder`].
    pub fn builder(api_key: impl Into<String>) -> KiteClientBuilder {
        KiteClientBuilder::new(api_key)
    }

    /// Returns the api key.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Returns the current access token.
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Replace the access token (e.g. after a session exchange).
    pub fn set_access_token(&mut self, token: impl Into<String>) {
        self.access_token = token.into();
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Change the REST root.
    pub fn set_base_url(&mut self, url: impl Into<String>) {
        self.base_url = url.into().trim_end_matches('/').to_owned();
    }

    /// Toggle the per-request debug log.
    pub fn set_debug(&mut self, debug: bool) {
        self.transport.set_debug(debug);
    }

    /// Browser URL that starts the login flow for this api key.
    pub fn login_url(&self) -> String {
        fill_template(LOGIN_URL, &[PathArg::Str(&self.api_key)])
            .unwrap_or_else(|| LOGIN_URL.replace("%s", &self.api_key))
    }

    // -----------------------------------------------------------------------
    // Generic HTTP helpers
    // -----------------------------------------------------------------------

    /// Perform a GET request and decode the envelope's `data`.
    pub async fn get<R: DeserializeOwned>(&self, path: &str, params: &[(String, String)]) -> Result<R> {
        self.request(Method::GET, path, params).await
    }

    /// Perform a form-encoded POST request and decode the envelope's `data`.
    pub async fn post<R: DeserializeOwned>(&self, path: &str, params: &[(String, String)]) -> Result<R> {
        self.request(Method::POST, path, params).await
    }

    /// Perform a form-encoded PUT request and decode the envelope's `data`.
    pub async fn put<R: DeserializeOwned>(&self, path: &str, params: &[(String, String)]) -> Result<R> {
        self.request(Method::PUT, path, params).await
    }

    /// Perform a DELETE request and decode the envelope's `data`.
    pub async fn delete<R: DeserializeOwned>(&self, path: &str, params: &[(String, String)]) -> Result<R> {
        self.request(Method::DELETE, path, params).await
    }

    /// POST a JSON body and decode the envelope's `data`.
    pub async fn post_json<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R> {
        let raw = serde_json::to_vec(body)
            .map_err(|e| KiteError::input(format!("Error encoding request: {e}")).with_source(e))?;
        let mut headers = self.request_headers()?;
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let resp = self
            .transport
            .execute_raw(Method::POST, &self.url(path), raw, headers)
            .await?;
        http::decode_envelope(resp.status, &resp.body)
    }

    /// GET a CSV document and decode every row.
    pub async fn get_csv<R: DeserializeOwned>(&self, path: &str) -> Result<Vec<R>> {
        let resp = self.execute(Method::GET, path, &[]).await?;
        http::decode_csv(resp.status, &resp.body)
    }

    /// Issue a request and decode the envelope.
    pub async fn request<R: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        params: &[(String, String)],
    ) -> Result<R> {
        let resp = self.execute(method, path, params).await?;
        http::decode_envelope(resp.status, &resp.body)
    }

    /// Issue a request and return the raw response without decoding.
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        params: &[(String, String)],
    ) -> Result<HttpResponse> {
        let headers = self.request_headers()?;
        self.transport
            .execute(method, &self.url(path), params, headers)
            .await
    }

    // -----------------------------------------------------------------------
    // Private helpers
    // -----------------------------------------------------------------------

    /// Build the full URL from a path segment.
    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Headers attached to every request. `Authorization` is only sent when
    /// both the api key and the access token are set.
    pub(crate) fn request_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::with_capacity(3);
        headers.insert(KITE_VERSION_HEADER, HeaderValue::from_static(KITE_HEADER_VERSION));
        headers.insert(
            header::USER_AGENT,
            header_value(&format!("{CLIENT_NAME}/{CLIENT_VERSION}"))?,
        );
        if !self.api_key.is_empty() && !self.access_token.is_empty() {
            headers.insert(
                header::AUTHORIZATION,
                header_value(&format!("token {}:{}", self.api_key, self.access_token))?,
            );
        }
        Ok(headers)
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| KiteError::input("credentials contain invalid header characters").with_source(e))
}

/// Substitute `args` into an endpoint template, failing with an input error
/// when the arguments do not fit.
pub(crate) fn endpoint(template: &str, args: &[PathArg<'_>]) -> Result<String> {
    fill_template(template, args)
        .ok_or_else(|| KiteError::input(format!("bad arguments for endpoint {template}")))
}
