//! Resource-access functions: thin wrappers over guarded requests.
//!
//! Each function maps one backend endpoint, delegates the auth state
//! machine to the coordinator, and decodes the payload. None of them
//! hold state, and none of them retry — when a call comes back
//! [`Fetch::RetryAfterRefresh`], the *caller* reissues it, exactly as a
//! page re-runs its own data fetch after a silent re-login.

use linkdeck_protocol::{
    validate_long_url, AnalyticsSnapshot, ShortenRequest, ShortenedLink,
};
use linkdeck_session::GuardedReply;
use linkdeck_transport::{ApiRequest, ApiTransport, TransportError};
use serde::de::DeserializeOwned;

use crate::{Client, Error};

/// The outcome of a guarded fetch that didn't fail.
#[derive(Debug)]
pub enum Fetch<T> {
    /// The payload, fresh from the backend.
    Ready(T),
    /// The access token had expired and was silently renewed. Reissue
    /// the same call — it will run against the new token, with no
    /// credential prompt.
    RetryAfterRefresh,
}

impl<T> Fetch<T> {
    /// The payload, if this fetch produced one.
    pub fn ready(self) -> Option<T> {
        match self {
            Fetch::Ready(value) => Some(value),
            Fetch::RetryAfterRefresh => None,
        }
    }

    /// `true` if the session was renewed instead of a payload delivered.
    pub fn was_refreshed(&self) -> bool {
        matches!(self, Fetch::RetryAfterRefresh)
    }
}

impl<T: ApiTransport> Client<T> {
    /// `GET /urls` — every link owned by the signed-in account.
    pub async fn list_links(&self) -> Result<Fetch<Vec<ShortenedLink>>, Error> {
        self.fetch_json(ApiRequest::get("/urls")).await
    }

    /// `POST /urls/shorten` — creates a short link for `long_url`.
    ///
    /// The URL is validated locally first; a malformed or non-web URL
    /// fails with [`SessionError::Validation`](crate::SessionError) and
    /// never reaches the network.
    pub async fn shorten(
        &self,
        long_url: &str,
    ) -> Result<Fetch<ShortenedLink>, Error> {
        validate_long_url(long_url)?;
        let body = serde_json::to_value(ShortenRequest {
            long_url: long_url.trim().to_string(),
        })
        .map_err(TransportError::Encode)?;
        self.fetch_json(ApiRequest::post("/urls/shorten").json(body))
            .await
    }

    /// `GET /urls/{shortCode}` — one link's details.
    pub async fn link_details(
        &self,
        short_code: &str,
    ) -> Result<Fetch<ShortenedLink>, Error> {
        self.fetch_json(ApiRequest::get(format!("/urls/{short_code}")))
            .await
    }

    /// `GET /urls/analytics/{shortCode}` — click totals, per-day
    /// histogram, referrer and browser breakdowns.
    pub async fn analytics(
        &self,
        short_code: &str,
    ) -> Result<Fetch<AnalyticsSnapshot>, Error> {
        self.fetch_json(ApiRequest::get(format!("/urls/analytics/{short_code}")))
            .await
    }

    /// `DELETE /urls/{shortCode}`.
    pub async fn delete_link(&self, short_code: &str) -> Result<Fetch<()>, Error> {
        match self
            .coordinator()
            .guarded(ApiRequest::delete(format!("/urls/{short_code}")))
            .await?
        {
            GuardedReply::Response(_) => Ok(Fetch::Ready(())),
            GuardedReply::SessionRefreshed => Ok(Fetch::RetryAfterRefresh),
        }
    }

    /// Probes whether the stored session is still usable, refreshing it
    /// if the backend says the access token expired.
    ///
    /// Uses `GET /urls` as the probe — the cheapest guarded endpoint —
    /// so `true` means either "token accepted" or "token renewed".
    pub async fn check_auth(&self) -> bool {
        self.coordinator()
            .guarded(ApiRequest::get("/urls"))
            .await
            .is_ok()
    }

    async fn fetch_json<R: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> Result<Fetch<R>, Error> {
        match self.coordinator().guarded(request).await? {
            GuardedReply::Response(response) => {
                Ok(Fetch::Ready(response.json()?))
            }
            GuardedReply::SessionRefreshed => Ok(Fetch::RetryAfterRefresh),
        }
    }
}
