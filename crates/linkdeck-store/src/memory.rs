//! In-process [`StorageBackend`] implementation.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use crate::StorageBackend;

/// One stored value and its deadline.
#[derive(Debug, Clone)]
struct Entry {
    value: String,
    /// `Instant` is the monotonic clock — wall-clock adjustments can't
    /// prematurely expire (or resurrect) a session.
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// A [`StorageBackend`] over a locked in-memory map.
///
/// This is the default backend: it models a browser profile's storage
/// for the lifetime of the process. Two clients holding the same
/// `Arc<MemoryBackend>` behave like two tabs sharing one cookie jar —
/// a write in one is immediately visible to the other.
///
/// Expired entries read as absent right away and are physically pruned
/// on the next write.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryBackend {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().expect("storage lock poisoned");
        entries
            .get(key)
            .filter(|entry| entry.is_live(Instant::now()))
            .map(|entry| entry.value.clone())
    }

    fn set(&self, key: &str, value: &str, ttl: Duration) {
        let mut entries = self.entries.write().expect("storage lock poisoned");
        let now = Instant::now();
        entries.retain(|_, entry| entry.is_live(now));
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: now + ttl,
            },
        );
    }

    fn remove(&self, key: &str) {
        let mut entries = self.entries.write().expect("storage lock poisoned");
        entries.remove(key);
    }

    fn get_all(&self, keys: &[&str]) -> Vec<Option<String>> {
        // One read guard for the whole batch: the result is a consistent
        // snapshot even while another task is mid-write.
        let entries = self.entries.read().expect("storage lock poisoned");
        let now = Instant::now();
        keys.iter()
            .map(|key| {
                entries
                    .get(*key)
                    .filter(|entry| entry.is_live(now))
                    .map(|entry| entry.value.clone())
            })
            .collect()
    }

    fn set_all(&self, batch: &[(&str, &str, Duration)]) {
        // One write guard for the whole batch: readers see either none
        // or all of these entries.
        let mut entries = self.entries.write().expect("storage lock poisoned");
        let now = Instant::now();
        entries.retain(|_, entry| entry.is_live(now));
        for (key, value, ttl) in batch {
            entries.insert(
                key.to_string(),
                Entry {
                    value: value.to_string(),
                    expires_at: now + *ttl,
                },
            );
        }
    }

    fn remove_all(&self, keys: &[&str]) {
        let mut entries = self.entries.write().expect("storage lock poisoned");
        for key in keys {
            entries.remove(*key);
        }
    }
}
