//! The session-changed bus.
//!
//! A browser front-end wires this with a pair of mechanisms: a custom
//! event for listeners in the same page, and storage events for sibling
//! tabs. Here both collapse into one generic pub-sub handle: every
//! consumer — a navigation bar in the same client, or a second client
//! sharing the same storage backend — subscribes to the same bus and
//! re-reads the store when an event arrives.
//!
//! The bus carries *notifications*, not state. Replicas converge by
//! reading the store, so a consumer that misses an event (late
//! subscribe, lagged receiver) is merely stale until the next one —
//! eventual consistency is the contract, same as storage events between
//! real tabs.

use tokio::sync::broadcast;

/// Why a session stopped existing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignOutReason {
    /// The user asked to log out.
    UserRequested,
    /// The refresh cycle could not renew the session.
    Expired,
    /// The backend rate-limited us and the session was cleared as a
    /// protective measure.
    RateLimited,
}

/// A change to the session, broadcast to all subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A login or registration completed and the session was stored.
    SignedIn { username: String },
    /// A silent refresh replaced the session; the user never noticed.
    Refreshed { username: String },
    /// The session was cleared.
    SignedOut { reason: SignOutReason },
}

/// Clonable publish/subscribe handle for [`SessionEvent`]s.
///
/// Clients that should behave like tabs of one browser profile share a
/// single `SessionEvents` (and a single storage backend); clones all
/// feed the same channel.
#[derive(Debug, Clone)]
pub struct SessionEvents {
    sender: broadcast::Sender<SessionEvent>,
}

impl SessionEvents {
    /// Creates a new, unconnected bus.
    pub fn new() -> Self {
        // 32 buffered events per receiver: session changes are rare
        // (human-speed logins and at most one refresh per token
        // lifetime), so a consumer this far behind is just re-reading
        // the store anyway.
        let (sender, _) = broadcast::channel(32);
        Self { sender }
    }

    /// Subscribes to all events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    /// Publishes an event to every current subscriber.
    ///
    /// Never fails: with no subscribers the event is simply dropped,
    /// the same way a storage event fires into a browser with one tab.
    pub fn publish(&self, event: SessionEvent) {
        tracing::debug!(?event, "session event");
        let _ = self.sender.send(event);
    }
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new()
    }
}
