//! `Client` builder and auth operations.
//!
//! This is the entry point for embedders. It ties together all the
//! layers: transport → store → session coordinator, with sensible
//! defaults (real HTTP, in-memory storage, a fresh event bus) and
//! injection points for every one of them.

use std::sync::Arc;

use linkdeck_protocol::{AuthRequest, RegistrationRequest};
use linkdeck_session::{
    AuthState, SessionCoordinator, SessionError, SessionEvent, SessionEvents,
};
use linkdeck_store::{
    MemoryBackend, Session, SessionStore, StorageBackend, StoreConfig,
};
use linkdeck_transport::{ApiTransport, HttpTransport};
use tokio::sync::broadcast;

use crate::Error;

/// A handle to one authenticated identity against one backend.
///
/// Cheap to clone — it's an `Arc` around the coordinator, so clones
/// share the session, the storage, and the event bus. To model two
/// browser tabs instead, build two clients that share a
/// [`StorageBackend`] and a [`SessionEvents`] via the builder.
pub struct Client<T: ApiTransport = HttpTransport> {
    coordinator: Arc<SessionCoordinator<T>>,
}

impl<T: ApiTransport> Clone for Client<T> {
    fn clone(&self) -> Self {
        Self {
            coordinator: Arc::clone(&self.coordinator),
        }
    }
}

impl Client<HttpTransport> {
    /// Starts building a client for the given API base URL.
    pub fn builder(base_url: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(base_url)
    }
}

impl<T: ApiTransport> Client<T> {
    /// Assembles a client from explicit parts. This is how tests inject
    /// a fake transport; production goes through [`Client::builder`].
    pub fn with_transport(
        transport: T,
        store: SessionStore,
        events: SessionEvents,
    ) -> Self {
        Self {
            coordinator: Arc::new(SessionCoordinator::new(
                transport, store, events,
            )),
        }
    }

    pub(crate) fn coordinator(&self) -> &SessionCoordinator<T> {
        &self.coordinator
    }

    // -- Auth operations --------------------------------------------------

    /// Logs in and stores the issued session.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Session, Error> {
        self.coordinator
            .login(&AuthRequest {
                username: username.to_string(),
                password: password.to_string(),
            })
            .await
    }

    /// Registers a new account; the backend logs it straight in.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Session, Error> {
        self.coordinator
            .register(&RegistrationRequest {
                username: username.to_string(),
                email: email.to_string(),
                password: password.to_string(),
            })
            .await
    }

    /// Logs out. Always succeeds locally; see
    /// [`SessionCoordinator::logout`].
    pub async fn logout(&self) {
        self.coordinator.logout().await;
    }

    // -- Session snapshots ------------------------------------------------

    /// `true` iff an access token is stored (existence check only).
    pub fn is_authenticated(&self) -> bool {
        self.coordinator.is_authenticated()
    }

    /// The stored display username, if signed in.
    pub fn username(&self) -> Option<String> {
        self.coordinator.username()
    }

    /// Current auth lifecycle snapshot.
    pub fn auth_state(&self) -> AuthState {
        self.coordinator.auth_state()
    }

    /// Subscribes to session-change events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.coordinator.subscribe()
    }
}

// ---------------------------------------------------------------------------
// ClientBuilder
// ---------------------------------------------------------------------------

/// Builder for a production [`Client`] over HTTP.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use linkdeck::{Client, MemoryBackend, SessionEvents};
///
/// # fn run() -> Result<(), linkdeck::Error> {
/// // Two clients sharing one profile, like two tabs of one browser.
/// let profile = Arc::new(MemoryBackend::new());
/// let events = SessionEvents::new();
///
/// let dashboard = Client::builder("https://api.sho.rt")
///     .storage(profile.clone())
///     .events(events.clone())
///     .build()?;
/// let second_tab = Client::builder("https://api.sho.rt")
///     .storage(profile)
///     .events(events)
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    base_url: String,
    store_config: StoreConfig,
    storage: Option<Arc<dyn StorageBackend>>,
    events: Option<SessionEvents>,
}

impl ClientBuilder {
    fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            store_config: StoreConfig::default(),
            storage: None,
            events: None,
        }
    }

    /// Overrides the session expiry policy.
    pub fn store_config(mut self, config: StoreConfig) -> Self {
        self.store_config = config;
        self
    }

    /// Injects a storage backend. Share one `Arc` between clients to
    /// model tabs of the same browser profile. Defaults to a fresh
    /// [`MemoryBackend`].
    pub fn storage(mut self, backend: Arc<dyn StorageBackend>) -> Self {
        self.storage = Some(backend);
        self
    }

    /// Injects an event bus, shared the same way. Defaults to a fresh
    /// bus.
    pub fn events(mut self, events: SessionEvents) -> Self {
        self.events = Some(events);
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    /// Fails if the base URL is not an absolute URL.
    pub fn build(self) -> Result<Client<HttpTransport>, Error> {
        let transport =
            HttpTransport::new(&self.base_url).map_err(SessionError::from)?;
        let storage = self
            .storage
            .unwrap_or_else(|| Arc::new(MemoryBackend::new()));
        let store = SessionStore::new(storage, self.store_config);
        let events = self.events.unwrap_or_default();
        Ok(Client::with_transport(transport, store, events))
    }
}
