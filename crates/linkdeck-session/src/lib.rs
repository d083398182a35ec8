//! Session lifecycle management for Linkdeck.
//!
//! This crate is the one piece of the client with real state-machine
//! behavior. It handles:
//!
//! 1. **Guarded requests** — attaching the stored access token and
//!    classifying what comes back ([`SessionCoordinator::guarded`])
//! 2. **Silent refresh** — resolving a 401 with exactly one refresh
//!    exchange, coalesced across concurrent requests
//! 3. **Sign-out propagation** — broadcasting session changes to every
//!    consumer, in-process and across "tabs" sharing the same store
//!    ([`SessionEvents`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Resource functions (above)  ← list/shorten/delete wrap guarded calls
//!     ↕
//! Session Layer (this crate)  ← decides when to refresh, retry, sign out
//!     ↕
//! Store + Transport (below)   ← persist the triple / move the bytes
//! ```
//!
//! # The state machine
//!
//! Every guarded request walks an explicit machine rather than a pile of
//! status-code conditionals, so the refresh-coalescing invariant stays
//! enforceable and testable:
//!
//! ```text
//!   Unauthenticated ──(session present)──→ Authenticated
//!         │                                    │ 401
//!         │ no session                         ▼
//!         ▼                              RefreshPending
//!    short-circuit                        │         │
//!                          refresh 2xx ───┘         └─── refresh fails / 429 / no token
//!                               │                              │
//!                               ▼                              ▼
//!                         Authenticated                    LoggedOut
//! ```
//!
//! A 429 anywhere is treated as a security event: the session is cleared
//! immediately, even though the tokens may still be technically valid.

mod coordinator;
mod error;
mod events;
mod state;

pub use coordinator::{GuardedReply, SessionCoordinator};
pub use error::SessionError;
pub use events::{SessionEvent, SessionEvents, SignOutReason};
pub use state::AuthState;
