//! The error taxonomy surfaced to calling views.
//!
//! Each variant is a distinct user-facing situation: the page decides
//! what to render, this enum decides what happened. Only one failure is
//! ever resolved internally (an expired access token, via one refresh);
//! everything else propagates unchanged. There are deliberately no
//! retry loops behind any of these — repeated failures surface rather
//! than hammer a possibly rate-limited backend.

use linkdeck_protocol::InvalidLongUrl;
use linkdeck_transport::TransportError;

/// Everything a guarded call or auth operation can report.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No credentials are stored. The call was short-circuited locally;
    /// no network request was made.
    #[error("authentication required")]
    AuthRequired,

    /// The access token expired and the refresh cycle could not renew
    /// it (refresh token missing, expired, or rejected). The session
    /// has been cleared.
    #[error("session expired, please sign in again")]
    AuthExpired,

    /// The backend answered 429. The session has been cleared as a
    /// protective measure, even though the tokens may still have been
    /// valid.
    #[error("too many requests, signed out for security reasons")]
    RateLimited,

    /// 404 on a resource-specific call.
    #[error("not found")]
    NotFound,

    /// 403 on a resource-specific call.
    #[error("permission denied")]
    Forbidden,

    /// Client-side rejection of a URL submitted for shortening. Nothing
    /// was sent to the backend.
    #[error("invalid URL: {0}")]
    Validation(#[from] InvalidLongUrl),

    /// Any other non-2xx answer, with the backend's `message` when it
    /// sent one.
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// The exchange itself failed: connection, TLS, or a body that
    /// didn't decode.
    #[error(transparent)]
    Transport(#[from] TransportError),
}
