//! Integration tests for the session coordinator: the full guarded
//! request lifecycle against a scripted in-memory transport.
//!
//! The fake transport routes by path, so tests stay deterministic even
//! when two guarded requests run concurrently. For the coalescing test
//! a rendezvous barrier holds both requests in flight until each has
//! observed the same stale token.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use linkdeck_protocol::AuthRequest;
use linkdeck_session::{
    AuthState, GuardedReply, SessionCoordinator, SessionError, SessionEvent,
    SessionEvents, SignOutReason,
};
use linkdeck_store::{MemoryBackend, SessionStore, StoreConfig};
use linkdeck_transport::{
    ApiRequest, ApiResponse, ApiTransport, TransportError,
};
use tokio::sync::Barrier;

// =========================================================================
// Scripted transport fake
// =========================================================================

enum Scripted {
    Reply(ApiResponse),
    /// Simulates the exchange itself failing (connection refused etc.).
    Fail,
}

#[derive(Clone, Default)]
struct FakeTransport {
    routes: Arc<Mutex<HashMap<String, VecDeque<Scripted>>>>,
    calls: Arc<Mutex<Vec<ApiRequest>>>,
    barriers: Arc<Mutex<HashMap<String, Arc<Barrier>>>>,
}

impl FakeTransport {
    fn new() -> Self {
        Self::default()
    }

    fn enqueue(&self, path: &str, response: ApiResponse) {
        self.routes
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push_back(Scripted::Reply(response));
    }

    fn enqueue_failure(&self, path: &str) {
        self.routes
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push_back(Scripted::Fail);
    }

    /// Makes the next `parties` requests to `path` wait for each other
    /// before any of them receives its response.
    fn rendezvous(&self, path: &str, parties: usize) {
        self.barriers
            .lock()
            .unwrap()
            .insert(path.to_string(), Arc::new(Barrier::new(parties)));
    }

    fn calls_to(&self, path: &str) -> Vec<ApiRequest> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.path == path)
            .cloned()
            .collect()
    }
}

impl ApiTransport for FakeTransport {
    async fn execute(
        &self,
        request: ApiRequest,
    ) -> Result<ApiResponse, TransportError> {
        self.calls.lock().unwrap().push(request.clone());

        let barrier = self.barriers.lock().unwrap().get(&request.path).cloned();
        if let Some(barrier) = barrier {
            barrier.wait().await;
        }

        let scripted = self
            .routes
            .lock()
            .unwrap()
            .get_mut(&request.path)
            .and_then(VecDeque::pop_front);
        match scripted {
            Some(Scripted::Reply(response)) => Ok(response),
            Some(Scripted::Fail) => Err(TransportError::Decode(
                serde_json::from_str::<serde_json::Value>("network down")
                    .unwrap_err(),
            )),
            None => panic!("unscripted request: {} {}", request.method, request.path),
        }
    }
}

// =========================================================================
// Helpers
// =========================================================================

fn json_response(status: u16, body: serde_json::Value) -> ApiResponse {
    ApiResponse::new(status, body.to_string())
}

fn empty_response(status: u16) -> ApiResponse {
    ApiResponse::new(status, "")
}

fn auth_body(access: &str, refresh: &str, username: &str) -> serde_json::Value {
    serde_json::json!({
        "accessToken": access,
        "refreshToken": refresh,
        "tokenType": "Bearer",
        "username": username,
    })
}

fn coordinator(transport: FakeTransport) -> SessionCoordinator<FakeTransport> {
    SessionCoordinator::new(
        transport,
        SessionStore::new(Arc::new(MemoryBackend::new()), StoreConfig::default()),
        SessionEvents::new(),
    )
}

fn alice_credentials() -> AuthRequest {
    AuthRequest {
        username: "alice".into(),
        password: "hunter2".into(),
    }
}

/// Logs in against a scripted login response so tests start authenticated.
async fn signed_in_coordinator(
    transport: &FakeTransport,
) -> SessionCoordinator<FakeTransport> {
    transport.enqueue(
        "/auth/login",
        json_response(200, auth_body("A1", "R1", "alice")),
    );
    let coordinator = coordinator(transport.clone());
    coordinator
        .login(&alice_credentials())
        .await
        .expect("scripted login should succeed");
    coordinator
}

// =========================================================================
// Login / register
// =========================================================================

#[tokio::test]
async fn test_login_success_stores_session_and_broadcasts() {
    let transport = FakeTransport::new();
    transport.enqueue(
        "/auth/login",
        json_response(200, auth_body("A1", "R1", "alice")),
    );
    let coordinator = coordinator(transport.clone());
    let mut events = coordinator.subscribe();

    let session = coordinator.login(&alice_credentials()).await.unwrap();

    assert_eq!(session.access_token, "A1");
    assert_eq!(session.refresh_token, "R1");
    assert_eq!(session.username, "alice");
    assert!(coordinator.is_authenticated());
    assert_eq!(coordinator.username().as_deref(), Some("alice"));
    assert_eq!(
        events.try_recv().unwrap(),
        SessionEvent::SignedIn {
            username: "alice".into()
        }
    );
}

#[tokio::test]
async fn test_login_rejected_surfaces_backend_message() {
    let transport = FakeTransport::new();
    transport.enqueue(
        "/auth/login",
        json_response(401, serde_json::json!({ "message": "Bad credentials" })),
    );
    let coordinator = coordinator(transport);

    let result = coordinator.login(&alice_credentials()).await;

    assert!(matches!(
        result,
        Err(SessionError::Server { status: 401, ref message }) if message == "Bad credentials"
    ));
    assert!(!coordinator.is_authenticated());
}

#[tokio::test]
async fn test_login_rejection_without_body_uses_fallback_message() {
    let transport = FakeTransport::new();
    transport.enqueue("/auth/login", empty_response(401));
    let coordinator = coordinator(transport);

    let result = coordinator.login(&alice_credentials()).await;

    assert!(matches!(
        result,
        Err(SessionError::Server { ref message, .. })
            if message == "Login failed. Please check your credentials."
    ));
}

#[tokio::test]
async fn test_login_rate_limited_reports_rate_limit() {
    let transport = FakeTransport::new();
    transport.enqueue("/auth/login", empty_response(429));
    let coordinator = coordinator(transport);

    let result = coordinator.login(&alice_credentials()).await;

    assert!(matches!(result, Err(SessionError::RateLimited)));
    assert!(!coordinator.is_authenticated());
}

#[tokio::test]
async fn test_register_success_stores_session() {
    let transport = FakeTransport::new();
    transport.enqueue(
        "/auth/register",
        json_response(200, auth_body("A1", "R1", "bob")),
    );
    let coordinator = coordinator(transport.clone());

    let session = coordinator
        .register(&linkdeck_protocol::RegistrationRequest {
            username: "bob".into(),
            email: "bob@example.com".into(),
            password: "hunter2".into(),
        })
        .await
        .unwrap();

    assert_eq!(session.username, "bob");
    assert!(coordinator.is_authenticated());
    // The registration body went over the wire as-is.
    let calls = transport.calls_to("/auth/register");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].body.as_ref().unwrap()["email"], "bob@example.com");
}

// =========================================================================
// Guarded requests
// =========================================================================

#[tokio::test]
async fn test_guarded_without_session_short_circuits() {
    let transport = FakeTransport::new();
    let coordinator = coordinator(transport.clone());

    let result = coordinator.guarded(ApiRequest::get("/urls")).await;

    assert!(matches!(result, Err(SessionError::AuthRequired)));
    // Short-circuit means short-circuit: nothing reached the network.
    assert!(transport.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_guarded_success_delivers_response_with_bearer() {
    let transport = FakeTransport::new();
    let coordinator = signed_in_coordinator(&transport).await;
    transport.enqueue("/urls", json_response(200, serde_json::json!([])));

    let reply = coordinator.guarded(ApiRequest::get("/urls")).await.unwrap();

    let GuardedReply::Response(response) = reply else {
        panic!("expected a delivered response");
    };
    assert_eq!(response.status, 200);

    let calls = transport.calls_to("/urls");
    assert_eq!(calls[0].bearer.as_deref(), Some("A1"));
    // Still signed in afterwards.
    assert_eq!(coordinator.auth_state(), AuthState::Authenticated);
}

#[tokio::test]
async fn test_guarded_401_refreshes_and_reports_retriable() {
    let transport = FakeTransport::new();
    let coordinator = signed_in_coordinator(&transport).await;
    let mut events = coordinator.subscribe();

    transport.enqueue("/urls", empty_response(401));
    transport.enqueue(
        "/auth/refresh",
        json_response(200, auth_body("A2", "R2", "alice")),
    );

    let reply = coordinator.guarded(ApiRequest::get("/urls")).await.unwrap();
    assert!(matches!(reply, GuardedReply::SessionRefreshed));

    // The store now holds the renewed triple.
    let session = coordinator.store().read().unwrap();
    assert_eq!(session.access_token, "A2");
    assert_eq!(session.refresh_token, "R2");
    assert_eq!(session.username, "alice");
    assert_eq!(
        events.try_recv().unwrap(),
        SessionEvent::Refreshed {
            username: "alice".into()
        }
    );

    // The refresh presented the stored refresh token as a query param.
    let refresh_calls = transport.calls_to("/auth/refresh");
    assert_eq!(refresh_calls.len(), 1);
    assert_eq!(
        refresh_calls[0].query,
        vec![("refreshToken".to_string(), "R1".to_string())]
    );

    // And the caller can now reissue its request with no re-login.
    transport.enqueue("/urls", json_response(200, serde_json::json!([])));
    let reply = coordinator.guarded(ApiRequest::get("/urls")).await.unwrap();
    assert!(matches!(reply, GuardedReply::Response(_)));
    let calls = transport.calls_to("/urls");
    assert_eq!(calls[1].bearer.as_deref(), Some("A2"));
}

#[tokio::test]
async fn test_guarded_401_refresh_rejected_signs_out() {
    let transport = FakeTransport::new();
    let coordinator = signed_in_coordinator(&transport).await;
    let mut events = coordinator.subscribe();

    transport.enqueue("/urls", empty_response(401));
    transport.enqueue("/auth/refresh", empty_response(401));

    let result = coordinator.guarded(ApiRequest::get("/urls")).await;

    assert!(matches!(result, Err(SessionError::AuthExpired)));
    assert!(!coordinator.is_authenticated());
    assert_eq!(coordinator.store().read(), None);
    assert_eq!(
        events.try_recv().unwrap(),
        SessionEvent::SignedOut {
            reason: SignOutReason::Expired
        }
    );
}

#[tokio::test]
async fn test_guarded_401_refresh_rate_limited_signs_out() {
    let transport = FakeTransport::new();
    let coordinator = signed_in_coordinator(&transport).await;
    let mut events = coordinator.subscribe();

    transport.enqueue("/urls", empty_response(401));
    transport.enqueue("/auth/refresh", empty_response(429));

    let result = coordinator.guarded(ApiRequest::get("/urls")).await;

    assert!(matches!(result, Err(SessionError::RateLimited)));
    assert_eq!(coordinator.store().read(), None);
    assert_eq!(
        events.try_recv().unwrap(),
        SessionEvent::SignedOut {
            reason: SignOutReason::RateLimited
        }
    );
}

#[tokio::test]
async fn test_guarded_429_clears_session_and_broadcasts() {
    let transport = FakeTransport::new();
    let coordinator = signed_in_coordinator(&transport).await;
    let mut events = coordinator.subscribe();

    transport.enqueue("/urls", empty_response(429));

    let result = coordinator.guarded(ApiRequest::get("/urls")).await;

    assert!(matches!(result, Err(SessionError::RateLimited)));
    assert_eq!(coordinator.store().read(), None);
    assert_eq!(
        events.try_recv().unwrap(),
        SessionEvent::SignedOut {
            reason: SignOutReason::RateLimited
        }
    );
    // No refresh was attempted — 429 is not an expiry.
    assert!(transport.calls_to("/auth/refresh").is_empty());
}

#[tokio::test]
async fn test_guarded_404_and_403_keep_the_session() {
    let transport = FakeTransport::new();
    let coordinator = signed_in_coordinator(&transport).await;

    transport.enqueue("/urls/missing", empty_response(404));
    let result = coordinator
        .guarded(ApiRequest::get("/urls/missing"))
        .await;
    assert!(matches!(result, Err(SessionError::NotFound)));

    transport.enqueue("/urls/owned-by-bob", empty_response(403));
    let result = coordinator
        .guarded(ApiRequest::delete("/urls/owned-by-bob"))
        .await;
    assert!(matches!(result, Err(SessionError::Forbidden)));

    assert!(coordinator.is_authenticated());
}

#[tokio::test]
async fn test_guarded_500_maps_to_server_error() {
    let transport = FakeTransport::new();
    let coordinator = signed_in_coordinator(&transport).await;

    transport.enqueue(
        "/urls",
        json_response(500, serde_json::json!({ "message": "boom" })),
    );

    let result = coordinator.guarded(ApiRequest::get("/urls")).await;

    assert!(matches!(
        result,
        Err(SessionError::Server { status: 500, ref message }) if message == "boom"
    ));
    assert!(coordinator.is_authenticated());
}

// =========================================================================
// Refresh coalescing
// =========================================================================

#[tokio::test]
async fn test_concurrent_401s_trigger_at_most_one_refresh() {
    let transport = FakeTransport::new();
    let coordinator = Arc::new(signed_in_coordinator(&transport).await);

    // Hold both guarded requests in flight until each has observed the
    // stale token, then let both receive their 401.
    transport.rendezvous("/urls", 2);
    transport.enqueue("/urls", empty_response(401));
    transport.enqueue("/urls", empty_response(401));
    transport.enqueue(
        "/auth/refresh",
        json_response(200, auth_body("A2", "R2", "alice")),
    );

    let (first, second) = tokio::join!(
        coordinator.guarded(ApiRequest::get("/urls")),
        coordinator.guarded(ApiRequest::get("/urls")),
    );

    // Both callers learn the session is valid again...
    assert!(matches!(first.unwrap(), GuardedReply::SessionRefreshed));
    assert!(matches!(second.unwrap(), GuardedReply::SessionRefreshed));
    // ...from exactly one refresh exchange.
    assert_eq!(transport.calls_to("/auth/refresh").len(), 1);
    assert_eq!(
        coordinator.store().read().unwrap().access_token,
        "A2"
    );
}

// =========================================================================
// Logout
// =========================================================================

#[tokio::test]
async fn test_logout_notifies_backend_and_clears() {
    let transport = FakeTransport::new();
    let coordinator = signed_in_coordinator(&transport).await;
    let mut events = coordinator.subscribe();
    transport.enqueue("/auth/logout", empty_response(200));

    coordinator.logout().await;

    assert!(!coordinator.is_authenticated());
    let calls = transport.calls_to("/auth/logout");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].bearer.as_deref(), Some("A1"));
    assert_eq!(
        events.try_recv().unwrap(),
        SessionEvent::SignedOut {
            reason: SignOutReason::UserRequested
        }
    );
}

#[tokio::test]
async fn test_logout_clears_locally_even_when_backend_fails() {
    let transport = FakeTransport::new();
    let coordinator = signed_in_coordinator(&transport).await;
    transport.enqueue_failure("/auth/logout");

    coordinator.logout().await;

    assert!(!coordinator.is_authenticated());
    assert_eq!(coordinator.store().read(), None);
}

#[tokio::test]
async fn test_logout_without_session_skips_the_network() {
    let transport = FakeTransport::new();
    let coordinator = coordinator(transport.clone());

    coordinator.logout().await;

    assert!(transport.calls.lock().unwrap().is_empty());
    assert!(!coordinator.is_authenticated());
}

// =========================================================================
// Lifecycle property + cross-tab propagation
// =========================================================================

#[tokio::test]
async fn test_is_authenticated_tracks_the_whole_lifecycle() {
    let transport = FakeTransport::new();
    transport.enqueue(
        "/auth/login",
        json_response(200, auth_body("A1", "R1", "alice")),
    );
    let coordinator = coordinator(transport.clone());

    assert!(!coordinator.is_authenticated());
    assert_eq!(coordinator.auth_state(), AuthState::Unauthenticated);

    coordinator.login(&alice_credentials()).await.unwrap();
    assert!(coordinator.is_authenticated());

    transport.enqueue("/urls", empty_response(401));
    transport.enqueue(
        "/auth/refresh",
        json_response(200, auth_body("A2", "R2", "alice")),
    );
    coordinator.guarded(ApiRequest::get("/urls")).await.unwrap();
    assert!(coordinator.is_authenticated());

    transport.enqueue("/auth/logout", empty_response(200));
    coordinator.logout().await;
    assert!(!coordinator.is_authenticated());
}

#[tokio::test]
async fn test_sibling_tab_observes_sign_out() {
    // Two coordinators sharing one backend and one bus are two tabs of
    // the same browser profile.
    let backend = Arc::new(MemoryBackend::new());
    let events = SessionEvents::new();

    let tab_a_transport = FakeTransport::new();
    tab_a_transport.enqueue(
        "/auth/login",
        json_response(200, auth_body("A1", "R1", "alice")),
    );
    tab_a_transport.enqueue("/auth/logout", empty_response(200));
    let tab_a = SessionCoordinator::new(
        tab_a_transport,
        SessionStore::new(backend.clone(), StoreConfig::default()),
        events.clone(),
    );
    let tab_b = SessionCoordinator::new(
        FakeTransport::new(),
        SessionStore::new(backend, StoreConfig::default()),
        events,
    );

    tab_a.login(&alice_credentials()).await.unwrap();
    // The sibling sees the login through shared storage...
    assert!(tab_b.is_authenticated());
    assert_eq!(tab_b.username().as_deref(), Some("alice"));

    // ...and is told about the logout through the shared bus.
    let mut tab_b_events = tab_b.subscribe();
    tab_a.logout().await;
    assert_eq!(
        tab_b_events.try_recv().unwrap(),
        SessionEvent::SignedOut {
            reason: SignOutReason::UserRequested
        }
    );
    assert!(!tab_b.is_authenticated());
}
