//! Session persistence for Linkdeck clients.
//!
//! This crate is the client's equivalent of a browser cookie jar. It
//! holds exactly one authenticated identity at a time:
//!
//! 1. **Storage abstraction** — the [`StorageBackend`] trait: injected
//!    key-value persistence with a per-key expiry, so the same session
//!    logic runs over an in-memory map today and a cookie jar, keychain,
//!    or on-disk store tomorrow.
//! 2. **Typed store** — [`SessionStore`]: reads and writes the session
//!    triple (access token, refresh token, username) as one atomic unit.
//!
//! # How it fits in the stack
//!
//! ```text
//! Session Layer (above)  ← decides WHEN to write, clear, or refresh
//!     ↕
//! Store Layer (this crate)  ← decides HOW the session is persisted
//! ```
//!
//! The store is a leaf: it knows nothing about HTTP, tokens' meanings,
//! or the backend API. It never fails — malformed or partial persisted
//! state degrades to "no session", not to an error.

mod backend;
mod memory;
mod session;

pub use backend::StorageBackend;
pub use memory::MemoryBackend;
pub use session::{
    Session, SessionStore, StoreConfig, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY,
    USERNAME_KEY,
};
