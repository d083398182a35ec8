//! Transport abstraction layer for Linkdeck.
//!
//! Provides the [`ApiTransport`] trait that abstracts "send one HTTP
//! request to the backend, give me back the status and body", plus the
//! request/response value types the rest of the stack is written
//! against. The session layer never touches a concrete HTTP client —
//! it talks to this trait, so tests drive it with scripted fakes and
//! production uses [`HttpTransport`].
//!
//! # Feature Flags
//!
//! - `http` (default) — real HTTP transport via `reqwest`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "http")]
mod http;

pub use error::TransportError;
#[cfg(feature = "http")]
pub use http::HttpTransport;

use std::fmt;

use serde::de::DeserializeOwned;

// ---------------------------------------------------------------------------
// Method
// ---------------------------------------------------------------------------

/// The subset of HTTP methods the backend API uses.
///
/// A local enum rather than a re-export so the trait (and every fake
/// implementation in tests) compiles without the `http` feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        };
        write!(f, "{name}")
    }
}

// ---------------------------------------------------------------------------
// ApiRequest
// ---------------------------------------------------------------------------

/// One request to the backend, described as a value.
///
/// The path is relative to the transport's base URL (`"/urls"`, not a
/// full URL), so the same request value works against production, a
/// staging host, or a mock server in tests.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    /// Query parameters, appended in order.
    pub query: Vec<(String, String)>,
    /// Bearer token for the `Authorization` header, if this request is
    /// authenticated.
    pub bearer: Option<String>,
    /// JSON body, if any.
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            bearer: None,
            body: None,
        }
    }

    /// A `GET` request for `path`.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    /// A `POST` request for `path`.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    /// A `DELETE` request for `path`.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Appends one query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Sets the JSON body.
    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Attaches a bearer token.
    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }
}

// ---------------------------------------------------------------------------
// ApiResponse
// ---------------------------------------------------------------------------

/// The backend's answer: a status code and the raw body bytes.
///
/// Status interpretation (401 vs 429 vs 404...) is deliberately NOT done
/// here — that classification is session policy and lives in the session
/// layer's state machine. The transport reports what happened on the
/// wire and nothing more.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// Builds a response value. Mostly useful for test fakes.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// `true` for any 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decodes the body as JSON into `T`.
    ///
    /// # Errors
    /// Returns [`TransportError::Decode`] if the body is malformed or
    /// doesn't match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TransportError> {
        serde_json::from_slice(&self.body).map_err(TransportError::Decode)
    }
}

// ---------------------------------------------------------------------------
// ApiTransport
// ---------------------------------------------------------------------------

/// Sends one [`ApiRequest`] and returns the backend's [`ApiResponse`].
///
/// # Trait bounds
///
/// - `Send + Sync` → the transport is shared across async tasks.
/// - `'static` → it owns its connections/configuration and lives as
///   long as the client.
///
/// # Contract
///
/// - Any HTTP status is an `Ok` response — only transport-level
///   failures (connect, TLS, decode-on-demand) are `Err`.
/// - No retries, no timeouts beyond the underlying client's defaults,
///   no cancellation: once issued, a request runs to completion or
///   failure.
pub trait ApiTransport: Send + Sync + 'static {
    /// Executes the request against the backend.
    async fn execute(
        &self,
        request: ApiRequest,
    ) -> Result<ApiResponse, TransportError>;
}
