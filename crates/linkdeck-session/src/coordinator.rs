//! The session coordinator: the driver for the auth state machine.
//!
//! This is the central piece of the session layer. It owns the three
//! collaborators — transport, store, event bus — and is responsible for:
//! - Logging in / registering and persisting the issued session
//! - Attaching the access token to guarded requests
//! - Resolving a 401 with exactly one refresh exchange
//! - Clearing the session and broadcasting on logout, expiry, or 429
//!
//! # Concurrency note
//!
//! Execution is cooperative and event-loop driven — the only shared
//! mutable state is the store, and the only thing that must be
//! serialized is the refresh cycle. `refresh_gate` does that: concurrent
//! guarded requests that all observe a 401 queue on the gate, the first
//! performs the exchange, and each later waiter discovers the store
//! already changed and reports success without a second network call.

use linkdeck_protocol::{
    ApiErrorBody, AuthRequest, AuthResponse, RegistrationRequest,
};
use linkdeck_store::{Session, SessionStore};
use linkdeck_transport::{
    ApiRequest, ApiResponse, ApiTransport, TransportError,
};
use tokio::sync::{broadcast, Mutex};

use crate::state::{
    AuthState, Denial, LoadAction, RefreshAction, ResponseAction,
};
use crate::{SessionError, SessionEvent, SessionEvents, SignOutReason};

/// What a guarded request resolves to when it doesn't fail.
#[derive(Debug)]
pub enum GuardedReply {
    /// The backend answered 2xx; here is its response.
    Response(ApiResponse),
    /// The access token had expired and was silently renewed. The
    /// original request was NOT replayed — the caller owns its own
    /// retry, so a refresh can never multiply in-flight requests.
    SessionRefreshed,
}

/// Coordinates one session across any number of concurrent callers.
///
/// Generic over the transport so tests drive it with scripted fakes and
/// production uses the HTTP implementation. Cheap to share behind an
/// `Arc`; all methods take `&self`.
pub struct SessionCoordinator<T: ApiTransport> {
    transport: T,
    store: SessionStore,
    events: SessionEvents,
    /// Serializes the refresh cycle. Holding the guard is what
    /// `RefreshPending` looks like at runtime.
    refresh_gate: Mutex<()>,
}

impl<T: ApiTransport> SessionCoordinator<T> {
    /// Creates a coordinator over the given collaborators.
    pub fn new(transport: T, store: SessionStore, events: SessionEvents) -> Self {
        Self {
            transport,
            store,
            events,
            refresh_gate: Mutex::new(()),
        }
    }

    /// The session store this coordinator writes.
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// The event bus this coordinator publishes to.
    pub fn events(&self) -> &SessionEvents {
        &self.events
    }

    /// Subscribes to session changes. Shorthand for `events().subscribe()`.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// `true` iff an access token is stored. Existence check only.
    pub fn is_authenticated(&self) -> bool {
        self.store.is_authenticated()
    }

    /// The stored display username, if any.
    pub fn username(&self) -> Option<String> {
        self.store.username()
    }

    /// A snapshot of the auth lifecycle for display purposes.
    ///
    /// Reports [`AuthState::RefreshPending`] while a refresh exchange is
    /// in flight, otherwise derives the state from the store.
    pub fn auth_state(&self) -> AuthState {
        if self.refresh_gate.try_lock().is_err() {
            AuthState::RefreshPending
        } else if self.store.is_authenticated() {
            AuthState::Authenticated
        } else {
            AuthState::Unauthenticated
        }
    }

    // -- Authentication ---------------------------------------------------

    /// `POST /auth/login`. On success the issued session is stored (one
    /// atomic write of all three fields) and `SignedIn` is broadcast.
    ///
    /// # Errors
    /// [`SessionError::Server`] with the backend's message on rejected
    /// credentials; [`SessionError::RateLimited`] on 429.
    pub async fn login(
        &self,
        credentials: &AuthRequest,
    ) -> Result<Session, SessionError> {
        let body = serde_json::to_value(credentials)
            .map_err(TransportError::Encode)?;
        self.authenticate(
            "/auth/login",
            body,
            "Login failed. Please check your credentials.",
        )
        .await
    }

    /// `POST /auth/register`. The backend logs the new account straight
    /// in, so this stores a session exactly like [`login`](Self::login).
    pub async fn register(
        &self,
        registration: &RegistrationRequest,
    ) -> Result<Session, SessionError> {
        let body = serde_json::to_value(registration)
            .map_err(TransportError::Encode)?;
        self.authenticate(
            "/auth/register",
            body,
            "Registration failed. Please try again.",
        )
        .await
    }

    async fn authenticate(
        &self,
        path: &str,
        body: serde_json::Value,
        rejection_fallback: &str,
    ) -> Result<Session, SessionError> {
        let response = self
            .transport
            .execute(ApiRequest::post(path).json(body))
            .await?;

        if response.is_success() {
            let issued: AuthResponse = response.json()?;
            let session = Session {
                access_token: issued.access_token,
                refresh_token: issued.refresh_token,
                username: issued.username,
                token_type: issued.token_type,
            };
            self.store.write(&session);
            self.events.publish(SessionEvent::SignedIn {
                username: session.username.clone(),
            });
            tracing::info!(username = %session.username, "signed in");
            return Ok(session);
        }

        if response.status == 429 {
            // Protective clear, same as on guarded calls. Idempotent
            // when no session existed yet.
            self.force_sign_out(SignOutReason::RateLimited);
            return Err(SessionError::RateLimited);
        }

        Err(server_error(&response, rejection_fallback))
    }

    /// Logs out: best-effort backend notification, unconditional local
    /// cleanup.
    ///
    /// Infallible by design — a dead backend must never trap the user in
    /// a logged-in shell. The backend call's failure is logged and
    /// dropped; the store is cleared and `SignedOut` broadcast either
    /// way.
    pub async fn logout(&self) {
        if let Some(session) = self.store.read() {
            let request = ApiRequest::post("/auth/logout")
                .bearer(session.access_token.as_str());
            match self.transport.execute(request).await {
                Ok(response) if response.is_success() => {
                    tracing::debug!("backend acknowledged logout");
                }
                Ok(response) => {
                    tracing::warn!(
                        status = response.status,
                        "backend rejected logout, clearing locally anyway"
                    );
                }
                Err(error) => {
                    tracing::warn!(
                        error = %error,
                        "backend logout failed, clearing locally anyway"
                    );
                }
            }
        }
        self.force_sign_out(SignOutReason::UserRequested);
    }

    // -- Guarded requests -------------------------------------------------

    /// Executes one request under the auth state machine.
    ///
    /// Attaches the stored access token, classifies the response, and
    /// resolves a 401 with at most one (coalesced) refresh exchange. On
    /// a successful refresh the reply is
    /// [`GuardedReply::SessionRefreshed`] and the caller reissues its
    /// request — now against a valid session, with no credential
    /// re-prompt.
    ///
    /// # Errors
    /// Every variant of [`SessionError`] except `Validation`; see the
    /// taxonomy for what each means to the calling view.
    pub async fn guarded(
        &self,
        request: ApiRequest,
    ) -> Result<GuardedReply, SessionError> {
        let path = request.path.clone();

        let step = AuthState::on_session(self.store.read());
        tracing::trace!(%path, state = ?step.next, "guard: session loaded");
        let session = match step.action {
            LoadAction::FailAuthRequired => {
                tracing::debug!(%path, "guarded call without a session");
                return Err(SessionError::AuthRequired);
            }
            LoadAction::Send(session) => session,
        };

        let response = self
            .transport
            .execute(request.bearer(session.access_token.as_str()))
            .await?;

        let step = AuthState::on_response(response.status);
        tracing::trace!(
            %path,
            status = response.status,
            state = ?step.next,
            "guard: response classified"
        );
        match step.action {
            ResponseAction::Deliver => Ok(GuardedReply::Response(response)),
            ResponseAction::BeginRefresh => {
                self.refresh(&session.access_token).await
            }
            ResponseAction::SignOut(reason) => {
                self.force_sign_out(reason);
                Err(sign_out_error(reason))
            }
            ResponseAction::Deny(Denial::NotFound) => Err(SessionError::NotFound),
            ResponseAction::Deny(Denial::Forbidden) => Err(SessionError::Forbidden),
            ResponseAction::Deny(Denial::Server(status)) => {
                Err(server_error_with_status(&response, status))
            }
        }
    }

    /// Resolves one observed 401.
    ///
    /// All concurrent requests that saw a 401 funnel through here;
    /// `rejected_token` is the access token the backend refused. The
    /// gate plus a store re-read coalesce them: two guarded calls that
    /// both observe a 401 produce at most one refresh network call.
    async fn refresh(
        &self,
        rejected_token: &str,
    ) -> Result<GuardedReply, SessionError> {
        let _serialized = self.refresh_gate.lock().await;

        // While we waited for the gate a sibling may have finished the
        // job. The store is the source of truth:
        //   token changed  → session already renewed, nothing to do
        //   store empty    → no refresh token to present
        //   token unchanged → this request performs the exchange
        let session = match self.store.read() {
            Some(session) if session.access_token != rejected_token => {
                tracing::debug!("refresh coalesced with a concurrent request");
                return Ok(GuardedReply::SessionRefreshed);
            }
            Some(session) => session,
            None => {
                let step = AuthState::on_refresh_unavailable();
                tracing::debug!(state = ?step.next, "no refresh token stored");
                self.force_sign_out(step.action);
                return Err(sign_out_error(step.action));
            }
        };

        let request = ApiRequest::post("/auth/refresh")
            .query("refreshToken", session.refresh_token.as_str());
        let response = self.transport.execute(request).await?;

        let step = AuthState::on_refresh_response(response.status);
        tracing::trace!(
            status = response.status,
            state = ?step.next,
            "guard: refresh classified"
        );
        match step.action {
            RefreshAction::Commit => {
                let issued: AuthResponse = response.json()?;
                let renewed = Session {
                    access_token: issued.access_token,
                    refresh_token: issued.refresh_token,
                    username: issued.username,
                    token_type: issued.token_type,
                };
                // The single store write for this refresh cycle.
                self.store.write(&renewed);
                self.events.publish(SessionEvent::Refreshed {
                    username: renewed.username.clone(),
                });
                tracing::info!(username = %renewed.username, "session refreshed");
                Ok(GuardedReply::SessionRefreshed)
            }
            RefreshAction::SignOut(reason) => {
                self.force_sign_out(reason);
                Err(sign_out_error(reason))
            }
        }
    }

    /// Clears the store and broadcasts, unconditionally. Idempotent:
    /// consumers re-read the store on every event, so a duplicate
    /// `SignedOut` is harmless.
    fn force_sign_out(&self, reason: SignOutReason) {
        self.store.clear();
        self.events.publish(SessionEvent::SignedOut { reason });
        tracing::info!(?reason, "signed out");
    }
}

/// The error a forced sign-out surfaces to the caller that triggered it.
fn sign_out_error(reason: SignOutReason) -> SessionError {
    match reason {
        SignOutReason::RateLimited => SessionError::RateLimited,
        SignOutReason::Expired | SignOutReason::UserRequested => {
            SessionError::AuthExpired
        }
    }
}

/// Builds a `Server` error, preferring the backend's own message.
fn server_error(response: &ApiResponse, fallback: &str) -> SessionError {
    server_error_inner(response, response.status, fallback)
}

fn server_error_with_status(response: &ApiResponse, status: u16) -> SessionError {
    server_error_inner(response, status, "Request failed.")
}

fn server_error_inner(
    response: &ApiResponse,
    status: u16,
    fallback: &str,
) -> SessionError {
    let message = response
        .json::<ApiErrorBody>()
        .ok()
        .map(|body| body.message)
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| fallback.to_string());
    SessionError::Server { status, message }
}
