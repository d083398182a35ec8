//! The typed session store: one authenticated identity, three keys.

use std::sync::Arc;
use std::time::Duration;

use crate::StorageBackend;

/// Storage key for the access token. Named after the cookie the browser
/// front-end of this service uses, so a cookie-jar backend maps 1:1.
pub const ACCESS_TOKEN_KEY: &str = "auth_token";
/// Storage key for the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
/// Storage key for the display username.
pub const USERNAME_KEY: &str = "username";

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One authenticated identity: the triple the backend issues on login,
/// registration, or refresh, plus the token scheme.
///
/// Replaced wholesale on refresh, deleted on logout. The tokens are
/// opaque — nothing here inspects or decodes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Short-lived bearer credential for guarded requests.
    pub access_token: String,
    /// Longer-lived credential for the refresh exchange.
    pub refresh_token: String,
    /// Display name, kept for consumers like a navigation bar.
    pub username: String,
    /// Token scheme. Not persisted — the backend only issues `Bearer`,
    /// so it is reconstructed on read.
    pub token_type: String,
}

// ---------------------------------------------------------------------------
// StoreConfig
// ---------------------------------------------------------------------------

/// Expiry policy for the persisted session fields.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// How long a stored access token is kept. The backend's access
    /// tokens live about an hour; keeping the stored copy on the same
    /// clock means a long-idle client usually rediscovers "logged out"
    /// locally instead of via a 401.
    ///
    /// Default: 1 hour.
    pub access_ttl: Duration,

    /// How long the refresh token and username are kept. Matches the
    /// backend's documented refresh-token lifetime.
    ///
    /// Default: 7 days.
    pub refresh_ttl: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            access_ttl: Duration::from_secs(60 * 60),
            refresh_ttl: Duration::from_secs(7 * 24 * 60 * 60),
        }
    }
}

// ---------------------------------------------------------------------------
// SessionStore
// ---------------------------------------------------------------------------

/// Reads and writes the session triple over an injected
/// [`StorageBackend`].
///
/// The store holds no state of its own beyond the backend handle, so it
/// is cheap to clone and every clone sees the same session. It has no
/// failure mode: corrupt or partial persisted state reads as "no
/// session", and writes replace whatever was there.
#[derive(Clone)]
pub struct SessionStore {
    backend: Arc<dyn StorageBackend>,
    config: StoreConfig,
}

impl SessionStore {
    /// Creates a store over the given backend.
    pub fn new(backend: Arc<dyn StorageBackend>, config: StoreConfig) -> Self {
        Self { backend, config }
    }

    /// Persists all three session fields as one atomic batch.
    ///
    /// A concurrent [`read`](Self::read) sees either the previous
    /// session or this one, never a mix.
    pub fn write(&self, session: &Session) {
        self.backend.set_all(&[
            (
                ACCESS_TOKEN_KEY,
                session.access_token.as_str(),
                self.config.access_ttl,
            ),
            (
                REFRESH_TOKEN_KEY,
                session.refresh_token.as_str(),
                self.config.refresh_ttl,
            ),
            (USERNAME_KEY, session.username.as_str(), self.config.refresh_ttl),
        ]);
        tracing::info!(username = %session.username, "session stored");
    }

    /// Returns the current session, or `None` if any field is missing,
    /// expired, or empty.
    ///
    /// Partial state is treated as no session at all — a token without a
    /// username (or vice versa) is unusable for the refresh cycle, so it
    /// degrades to "absent" rather than surfacing as an error.
    pub fn read(&self) -> Option<Session> {
        let mut values = self
            .backend
            .get_all(&[ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USERNAME_KEY])
            .into_iter();

        let access_token = values.next().flatten().filter(|v| !v.is_empty())?;
        let refresh_token = values.next().flatten().filter(|v| !v.is_empty())?;
        let username = values.next().flatten().filter(|v| !v.is_empty())?;

        Some(Session {
            access_token,
            refresh_token,
            username,
            token_type: "Bearer".to_string(),
        })
    }

    /// Removes all session fields. Idempotent.
    pub fn clear(&self) {
        self.backend
            .remove_all(&[ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USERNAME_KEY]);
        tracing::debug!("session cleared");
    }

    /// `true` iff an access token is present.
    ///
    /// Existence check only — says nothing about whether the backend
    /// would still accept the token.
    pub fn is_authenticated(&self) -> bool {
        self.backend.get(ACCESS_TOKEN_KEY).is_some()
    }

    /// The stored display username, if a complete session is present.
    pub fn username(&self) -> Option<String> {
        self.read().map(|session| session.username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryBackend;

    fn store() -> SessionStore {
        SessionStore::new(Arc::new(MemoryBackend::new()), StoreConfig::default())
    }

    fn alice() -> Session {
        Session {
            access_token: "A1".into(),
            refresh_token: "R1".into(),
            username: "alice".into(),
            token_type: "Bearer".into(),
        }
    }

    #[test]
    fn test_write_then_read_round_trips() {
        let store = store();
        store.write(&alice());

        let session = store.read().expect("session should be present");
        assert_eq!(session, alice());
        assert!(store.is_authenticated());
        assert_eq!(store.username().as_deref(), Some("alice"));
    }

    #[test]
    fn test_read_empty_store_returns_none() {
        let store = store();
        assert_eq!(store.read(), None);
        assert!(!store.is_authenticated());
        assert_eq!(store.username(), None);
    }

    #[test]
    fn test_write_replaces_session_wholesale() {
        let store = store();
        store.write(&alice());
        store.write(&Session {
            access_token: "A2".into(),
            refresh_token: "R2".into(),
            username: "alice".into(),
            token_type: "Bearer".into(),
        });

        let session = store.read().unwrap();
        assert_eq!(session.access_token, "A2");
        assert_eq!(session.refresh_token, "R2");
    }

    #[test]
    fn test_partial_state_reads_as_absent() {
        // A token without its companions is useless for the refresh
        // cycle; read() must degrade to None rather than error.
        let backend = Arc::new(MemoryBackend::new());
        let store =
            SessionStore::new(backend.clone(), StoreConfig::default());
        backend.set(ACCESS_TOKEN_KEY, "A1", Duration::from_secs(3600));

        assert_eq!(store.read(), None);
        // But the existence check is exactly that — an existence check.
        assert!(store.is_authenticated());
    }

    #[test]
    fn test_empty_field_reads_as_absent() {
        let backend = Arc::new(MemoryBackend::new());
        let store =
            SessionStore::new(backend.clone(), StoreConfig::default());
        store.write(&alice());
        backend.set(USERNAME_KEY, "", Duration::from_secs(3600));

        assert_eq!(store.read(), None);
    }

    #[test]
    fn test_expired_access_token_reads_as_absent() {
        let backend = Arc::new(MemoryBackend::new());
        let store = SessionStore::new(
            backend,
            StoreConfig {
                access_ttl: Duration::ZERO,
                ..StoreConfig::default()
            },
        );
        store.write(&alice());

        assert_eq!(store.read(), None);
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let store = store();
        store.write(&alice());

        store.clear();
        assert_eq!(store.read(), None);

        // Clearing again must be a no-op, not a failure.
        store.clear();
        assert_eq!(store.read(), None);
    }

    #[test]
    fn test_clones_share_the_same_session() {
        let store = store();
        let sibling = store.clone();

        store.write(&alice());
        assert!(sibling.is_authenticated());

        sibling.clear();
        assert!(!store.is_authenticated());
    }
}
