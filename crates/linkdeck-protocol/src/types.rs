//! The JSON shapes exchanged with the URL-shortening backend.
//!
//! Every type here mirrors one backend payload exactly. The backend emits
//! camelCase keys, so each struct carries `#[serde(rename_all = "camelCase")]`
//! and the Rust fields stay snake_case.
//!
//! None of these types contain client logic. They are read-through copies
//! of server state: fetched per view, never cached across sessions.

use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Authentication payloads
// ---------------------------------------------------------------------------

/// Credentials for `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthRequest {
    pub username: String,
    pub password: String,
}

/// Body for `POST /auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// What the backend returns from a successful login, registration, or
/// token refresh.
///
/// Both tokens are opaque to the client: their expiry is discovered only
/// through a `401` response, never by decoding them locally. A refresh
/// replaces the whole set — the backend rotates the refresh token along
/// with the access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// Short-lived bearer credential attached to every guarded request.
    pub access_token: String,
    /// Longer-lived credential exchanged for a new access token.
    pub refresh_token: String,
    /// Token scheme. The backend only ever issues `"Bearer"`.
    pub token_type: String,
    /// Display name of the authenticated account.
    pub username: String,
}

// ---------------------------------------------------------------------------
// Link payloads
// ---------------------------------------------------------------------------

/// Body for `POST /urls/shorten`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortenRequest {
    pub long_url: String,
}

/// One shortened link, as listed by `GET /urls` and returned by the
/// shorten/detail endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortenedLink {
    pub id: String,
    pub short_code: String,
    pub short_url: String,
    pub long_url: String,
    /// Creation time as the backend reports it: an ISO-8601 timestamp
    /// without a zone offset.
    pub created_at: NaiveDateTime,
    pub clicks: u64,
}

/// Per-link analytics from `GET /urls/analytics/{shortCode}`.
///
/// `clicks_by_day` is a `BTreeMap` so the histogram iterates in date
/// order — the order charts want — without re-sorting on the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSnapshot {
    pub url_id: String,
    pub short_code: String,
    pub short_url: String,
    pub long_url: String,
    pub total_clicks: u64,
    pub clicks_by_day: BTreeMap<NaiveDate, u64>,
    pub referrer_counts: HashMap<String, u64>,
    pub browser_counts: HashMap<String, u64>,
}

// ---------------------------------------------------------------------------
// Error payload
// ---------------------------------------------------------------------------

/// The backend's error body: `{ "message": "..." }`.
///
/// Parsed best-effort — error responses are not guaranteed to carry a
/// body at all, so `message` defaults to empty and callers substitute
/// their own wording when it is.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: String,
}
