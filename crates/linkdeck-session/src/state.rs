//! The per-request auth state machine.
//!
//! Status-code handling for guarded requests is easy to smear across
//! nested conditionals until nobody can say what happens when a refresh
//! itself gets a 429. This module keeps the whole policy in one place as
//! pure transition functions: given where we are and what we observed,
//! they return where we go and what to do — and nothing else. No I/O
//! happens here, so every row of the table is a one-line unit test.
//!
//! The [`SessionCoordinator`](crate::SessionCoordinator) is the driver
//! that performs the returned actions.

use linkdeck_store::Session;

use crate::SignOutReason;

/// Where one guarded request currently stands in the auth lifecycle.
///
/// `LoggedOut` is terminal for the request chain that reached it; the
/// next request starts over from `Unauthenticated` against whatever the
/// store then holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// No credentials loaded yet.
    Unauthenticated,
    /// A stored session is attached to the request.
    Authenticated,
    /// A 401 was observed; the refresh exchange is in flight.
    RefreshPending,
    /// The session was cleared; this request chain is over.
    LoggedOut,
}

/// One transition: the state to move to and the action to perform.
#[derive(Debug)]
pub(crate) struct Step<A> {
    pub(crate) next: AuthState,
    pub(crate) action: A,
}

/// What to do after consulting the store (from `Unauthenticated`).
#[derive(Debug)]
pub(crate) enum LoadAction {
    /// A session is present: attach its token and send the request.
    Send(Session),
    /// Nothing stored: fail locally, touch no network.
    FailAuthRequired,
}

/// What to do with the initial response (from `Authenticated`).
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ResponseAction {
    /// 2xx: hand the payload to the caller.
    Deliver,
    /// 401: the access token is no longer accepted.
    BeginRefresh,
    /// Clear the session and broadcast; the reason picks the error.
    SignOut(SignOutReason),
    /// A failure that leaves the session intact.
    Deny(Denial),
}

/// Non-auth failures. The session survives these.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Denial {
    NotFound,
    Forbidden,
    Server(u16),
}

/// What to do with the refresh response (from `RefreshPending`).
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum RefreshAction {
    /// Refresh 2xx: write the renewed session, tell waiters.
    Commit,
    /// Refresh failed: clear, broadcast, surface per reason.
    SignOut(SignOutReason),
}

impl AuthState {
    /// `Unauthenticated` + store snapshot.
    pub(crate) fn on_session(session: Option<Session>) -> Step<LoadAction> {
        match session {
            Some(session) => Step {
                next: AuthState::Authenticated,
                action: LoadAction::Send(session),
            },
            None => Step {
                next: AuthState::Unauthenticated,
                action: LoadAction::FailAuthRequired,
            },
        }
    }

    /// `Authenticated` + the guarded request's response status.
    pub(crate) fn on_response(status: u16) -> Step<ResponseAction> {
        match status {
            200..=299 => Step {
                next: AuthState::Authenticated,
                action: ResponseAction::Deliver,
            },
            401 => Step {
                next: AuthState::RefreshPending,
                action: ResponseAction::BeginRefresh,
            },
            // A rate limit is treated as a security event: sign out even
            // though the token may still be technically valid.
            429 => Step {
                next: AuthState::LoggedOut,
                action: ResponseAction::SignOut(SignOutReason::RateLimited),
            },
            404 => Step {
                next: AuthState::Authenticated,
                action: ResponseAction::Deny(Denial::NotFound),
            },
            403 => Step {
                next: AuthState::Authenticated,
                action: ResponseAction::Deny(Denial::Forbidden),
            },
            other => Step {
                next: AuthState::Authenticated,
                action: ResponseAction::Deny(Denial::Server(other)),
            },
        }
    }

    /// `RefreshPending` with no refresh token to present: straight to
    /// `LoggedOut`, no network call.
    pub(crate) fn on_refresh_unavailable() -> Step<SignOutReason> {
        Step {
            next: AuthState::LoggedOut,
            action: SignOutReason::Expired,
        }
    }

    /// `RefreshPending` + the refresh exchange's response status.
    pub(crate) fn on_refresh_response(status: u16) -> Step<RefreshAction> {
        match status {
            200..=299 => Step {
                next: AuthState::Authenticated,
                action: RefreshAction::Commit,
            },
            429 => Step {
                next: AuthState::LoggedOut,
                action: RefreshAction::SignOut(SignOutReason::RateLimited),
            },
            // Anything else means the refresh token itself is expired,
            // invalid, or rejected.
            _ => Step {
                next: AuthState::LoggedOut,
                action: RefreshAction::SignOut(SignOutReason::Expired),
            },
        }
    }
}
