//! Order dispatch boundary.
//!
//! Provides a trait-based abstraction for sending signed requests to the
//! exchange. This allows for:
//! - Dependency injection for testing
//! - Separation of signing from transport
//!
//! The dispatcher performs exactly one attempt. Non-success statuses are
//! returned as responses; only transport failures are errors.

use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method};
use tracing::{debug, warn};

use crate::credentials::ApiKeys;
use crate::error::{ExecutorError, ExecutorResult};
use crate::signer::SignedRequest;

/// Boxed future for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

/// Bitget authentication headers.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthHeaders {
    pub access_key: String,
    pub access_sign: String,
    pub access_timestamp: String,
    pub access_passphrase: String,
}

impl fmt::Debug for AuthHeaders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthHeaders")
            .field("access_key", &"<redacted>")
            .field("access_sign", &self.access_sign)
            .field("access_timestamp", &self.access_timestamp)
            .field("access_passphrase", &"<redacted>")
            .finish()
    }
}

/// Fully formed outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchRequest {
    pub method: String,
    pub url: String,
    pub headers: AuthHeaders,
    pub locale: String,
    /// Exactly the bytes that were signed.
    pub body: String,
}

impl DispatchRequest {
    /// Combine a signed request with the account's key and passphrase.
    pub fn new(signed: SignedRequest, url: String, keys: &ApiKeys<'_>, locale: &str) -> Self {
        Self {
            method: signed.method,
            url,
            headers: AuthHeaders {
                access_key: keys.api_key.to_string(),
                access_sign: signed.signature,
                access_timestamp: signed.timestamp_ms,
                access_passphrase: keys.passphrase.to_string(),
            },
            locale: locale.to_string(),
            body: signed.body,
        }
    }

    /// Header list in wire form.
    pub fn header_pairs(&self) -> [(&'static str, &str); 6] {
        [
            ("ACCESS-KEY", self.headers.access_key.as_str()),
            ("ACCESS-SIGN", self.headers.access_sign.as_str()),
            ("ACCESS-TIMESTAMP", self.headers.access_timestamp.as_str()),
            ("ACCESS-PASSPHRASE", self.headers.access_passphrase.as_str()),
            ("Content-Type", "application/json"),
            ("locale", self.locale.as_str()),
        ]
    }
}

/// Raw exchange response, passed through unmodified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchResponse {
    pub status: u16,
    pub body: String,
}

impl DispatchResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for sending signed requests to the exchange.
pub trait OrderDispatcher: Send + Sync {
    /// Send a request once. No retries.
    fn dispatch(&self, request: DispatchRequest) -> BoxFuture<'_, ExecutorResult<DispatchResponse>>;
}

/// Arc wrapper for OrderDispatcher trait objects.
pub type DynDispatcher = Arc<dyn OrderDispatcher>;

/// reqwest-backed dispatcher with a bounded per-request timeout.
#[derive(Debug, Clone)]
pub struct HttpDispatcher {
    client: Client,
}

impl HttpDispatcher {
    pub fn new(timeout: Duration) -> ExecutorResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ExecutorError::HttpClient(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }

    fn headers(request: &DispatchRequest) -> ExecutorResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        for (name, value) in request.header_pairs() {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ExecutorError::HttpClient(format!("invalid header name {name}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|_| ExecutorError::HttpClient(format!("invalid value for header {name}")))?;
            headers.insert(header_name, value);
        }
        Ok(headers)
    }

    async fn send(&self, request: DispatchRequest) -> ExecutorResult<DispatchResponse> {
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|e| ExecutorError::HttpClient(format!("invalid method: {e}")))?;
        let headers = Self::headers(&request)?;

        debug!(url = %request.url, method = %method, "Dispatching order request");

        let response = self
            .client
            .request(method, &request.url)
            .headers(headers)
            .body(request.body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ExecutorError::Timeout(e.to_string())
                } else {
                    ExecutorError::Transport(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            warn!(status, error = %e, "Failed to read exchange response body");
            ExecutorError::Transport(format!("failed to read response body: {e}"))
        })?;

        Ok(DispatchResponse { status, body })
    }
}

impl OrderDispatcher for HttpDispatcher {
    fn dispatch(&self, request: DispatchRequest) -> BoxFuture<'_, ExecutorResult<DispatchResponse>> {
        Box::pin(self.send(request))
    }
}

/// Outcome a `MockDispatcher` returns.
#[derive(Debug, Clone)]
pub enum MockOutcome {
    Respond(DispatchResponse),
    TransportError(String),
}

/// Mock dispatcher for testing.
#[derive(Debug)]
pub struct MockDispatcher {
    /// Recorded requests for verification.
    requests: parking_lot::Mutex<Vec<DispatchRequest>>,
    /// Next outcome to return.
    next_outcome: parking_lot::Mutex<MockOutcome>,
}

impl Default for MockDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDispatcher {
    /// Create a mock that answers `200 {"code":"00000"}`.
    pub fn new() -> Self {
        Self {
            requests: parking_lot::Mutex::new(Vec::new()),
            next_outcome: parking_lot::Mutex::new(MockOutcome::Respond(DispatchResponse {
                status: 200,
                body: r#"{"code":"00000","msg":"success","data":{"orderId":"1"}}"#.to_string(),
            })),
        }
    }

    /// Set the response to return.
    pub fn respond_with(&self, status: u16, body: impl Into<String>) {
        *self.next_outcome.lock() = MockOutcome::Respond(DispatchResponse {
            status,
            body: body.into(),
        });
    }

    /// Fail the next dispatches with a transport error.
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.next_outcome.lock() = MockOutcome::TransportError(message.into());
    }

    /// Get recorded requests.
    pub fn requests(&self) -> Vec<DispatchRequest> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

impl OrderDispatcher for MockDispatcher {
    fn dispatch(&self, request: DispatchRequest) -> BoxFuture<'_, ExecutorResult<DispatchResponse>> {
        Box::pin(async move {
            self.requests.lock().push(request);
            match self.next_outcome.lock().clone() {
                MockOutcome::Respond(response) => Ok(response),
                MockOutcome::TransportError(message) => Err(ExecutorError::Transport(message)),
            }
        })
    }
}
