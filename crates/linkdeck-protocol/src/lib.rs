//! Wire protocol for the Linkdeck client.
//!
//! This crate defines the "language" the client and the URL-shortening
//! backend speak over HTTP:
//!
//! - **Types** ([`AuthResponse`], [`ShortenedLink`], [`AnalyticsSnapshot`],
//!   etc.) — the JSON structures that travel on the wire.
//! - **Validation** ([`validate_long_url`]) — the one check the client
//!   performs before a request is ever built: that a URL submitted for
//!   shortening is a well-formed absolute web URL.
//! - **Errors** ([`InvalidLongUrl`]) — what can go wrong during that
//!   validation.
//!
//! # Architecture
//!
//! The protocol layer sits below everything else. It doesn't know about
//! HTTP, tokens, or storage — it only knows what the backend's JSON looks
//! like.
//!
//! ```text
//! Transport (HTTP) → Protocol (typed JSON) → Session (token context)
//! ```

mod types;
mod validate;

pub use types::{
    AnalyticsSnapshot, ApiErrorBody, AuthRequest, AuthResponse,
    RegistrationRequest, ShortenRequest, ShortenedLink,
};
pub use validate::{validate_long_url, InvalidLongUrl};
