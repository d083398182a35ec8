//! # Linkdeck
//!
//! Session-aware client for a URL-shortening service.
//!
//! Linkdeck wraps the service's REST API with the one piece of a
//! front-end that actually has engineering subtlety: the session
//! lifecycle. You get login/registration, guarded resource calls with
//! transparent token refresh, protective sign-out on rate limiting, and
//! session-change notifications that propagate to every consumer — in
//! the same client or in a sibling "tab" sharing the same storage.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use linkdeck::prelude::*;
//!
//! # async fn run() -> Result<(), linkdeck::Error> {
//! let client = Client::builder("https://api.sho.rt").build()?;
//! client.login("alice", "hunter2").await?;
//!
//! match client.list_links().await? {
//!     Fetch::Ready(links) => println!("{} links", links.len()),
//!     // The access token expired and was silently renewed — just
//!     // reissue the call.
//!     Fetch::RetryAfterRefresh => { /* call list_links() again */ }
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod links;

pub use client::{Client, ClientBuilder};
pub use links::Fetch;

// The facade re-exports the full public surface of the sub-crates so
// embedders depend on one crate.
pub use linkdeck_protocol::{
    validate_long_url, AnalyticsSnapshot, AuthRequest, AuthResponse,
    InvalidLongUrl, RegistrationRequest, ShortenedLink,
};
pub use linkdeck_session::{
    AuthState, GuardedReply, SessionCoordinator, SessionError, SessionEvent,
    SessionEvents, SignOutReason,
};
pub use linkdeck_store::{
    MemoryBackend, Session, SessionStore, StorageBackend, StoreConfig,
};
pub use linkdeck_transport::{
    ApiRequest, ApiResponse, ApiTransport, HttpTransport, TransportError,
};

/// The error type for every fallible client operation.
pub type Error = SessionError;

/// Commonly used imports for embedders.
pub mod prelude {
    pub use crate::{
        AnalyticsSnapshot, AuthState, Client, ClientBuilder, Fetch,
        MemoryBackend, Session, SessionError, SessionEvent, SessionEvents,
        ShortenedLink, SignOutReason, StoreConfig,
    };
}
