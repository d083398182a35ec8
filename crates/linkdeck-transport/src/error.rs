//! Error types for the transport layer.

/// Errors that can occur while talking to the backend.
///
/// Note what is NOT here: non-2xx statuses. A 401 or 429 is a successful
/// transport exchange carrying session-level meaning, so it arrives as
/// an [`ApiResponse`](crate::ApiResponse) and is classified upstream.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The base URL (or a request URL derived from it) failed to parse.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[source] url::ParseError),

    /// The HTTP exchange itself failed: connection refused, DNS, TLS,
    /// or the connection died mid-response.
    #[cfg(feature = "http")]
    #[error("request failed: {0}")]
    Http(#[source] reqwest::Error),

    /// A request body could not be serialized to JSON.
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// A response body could not be decoded as the expected JSON shape.
    #[error("decode failed: {0}")]
    Decode(#[source] serde_json::Error),
}
