//! The persistence capability the session store is built on.
//!
//! Browser front-ends keep their session in global mutable storage
//! (cookies, local storage). Here that dependency is inverted: the store
//! is handed a [`StorageBackend`] and never touches a concrete medium
//! itself. Production embedders inject whatever their platform offers;
//! tests inject [`MemoryBackend`](crate::MemoryBackend).

use std::time::Duration;

/// Key-value persistence with a per-key time-to-live.
///
/// # Trait bounds
///
/// - `Send + Sync` → one backend is shared by every component that
///   checks auth state, across async tasks.
/// - `'static` → the backend owns its data and lives as long as the
///   client, so it can sit behind an `Arc<dyn StorageBackend>`.
///
/// # Contract
///
/// - An entry past its TTL reads as absent. Whether it is physically
///   removed then or later is the implementation's business.
/// - `remove` of a missing key is a no-op, never an error.
/// - The `*_all` batch methods exist so a multi-key record can be read
///   and written as a unit. The default implementations loop over the
///   single-key methods; implementations that can make the batch atomic
///   (one lock, one transaction) should override them, because the
///   session layer relies on readers never observing a half-written
///   batch.
pub trait StorageBackend: Send + Sync + 'static {
    /// Returns the live value for `key`, or `None` if absent or expired.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value, expiring
    /// after `ttl`.
    fn set(&self, key: &str, value: &str, ttl: Duration);

    /// Removes `key`. Idempotent.
    fn remove(&self, key: &str);

    /// Reads several keys in one snapshot, in the order given.
    fn get_all(&self, keys: &[&str]) -> Vec<Option<String>> {
        keys.iter().map(|key| self.get(key)).collect()
    }

    /// Stores several entries as one batch.
    fn set_all(&self, entries: &[(&str, &str, Duration)]) {
        for (key, value, ttl) in entries {
            self.set(key, value, *ttl);
        }
    }

    /// Removes several keys as one batch. Idempotent.
    fn remove_all(&self, keys: &[&str]) {
        for key in keys {
            self.remove(key);
        }
    }
}
