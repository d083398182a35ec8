//! Terminal walkthrough of the Linkdeck client.
//!
//! Simulates a dashboard page plus a second "tab": two clients sharing
//! one storage backend and one event bus, with a navbar-style task that
//! re-evaluates its displayed auth state on every session event.
//!
//! Point it at a running backend:
//!
//! ```text
//! LINKDECK_API_URL=http://localhost:8080/api \
//! LINKDECK_USERNAME=alice LINKDECK_PASSWORD=hunter2 \
//! cargo run -p dashboard -- https://example.com/some/long/url
//! ```

use std::sync::Arc;

use linkdeck::prelude::*;

/// Fetches the link list, reissuing the call once if the session was
/// silently refreshed mid-flight.
async fn fetch_links(client: &Client) -> Result<Vec<ShortenedLink>, SessionError> {
    match client.list_links().await? {
        Fetch::Ready(links) => Ok(links),
        Fetch::RetryAfterRefresh => match client.list_links().await? {
            Fetch::Ready(links) => Ok(links),
            // A second refresh in a row means the session is unusable.
            Fetch::RetryAfterRefresh => Err(SessionError::AuthExpired),
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let api_url = std::env::var("LINKDECK_API_URL")
        .unwrap_or_else(|_| "http://localhost:8080/api".to_string());
    let username = std::env::var("LINKDECK_USERNAME")
        .unwrap_or_else(|_| "alice".to_string());
    let password = std::env::var("LINKDECK_PASSWORD")
        .unwrap_or_else(|_| "hunter2".to_string());

    // One storage backend + one bus = one browser profile. The two
    // clients below are its tabs.
    let profile = Arc::new(MemoryBackend::new());
    let events = SessionEvents::new();
    let dashboard = Client::builder(&api_url)
        .storage(profile.clone())
        .events(events.clone())
        .build()?;
    let second_tab = Client::builder(&api_url)
        .storage(profile)
        .events(events)
        .build()?;

    // The "navbar" of the second tab: it never polls, it only reacts.
    let mut session_changes = second_tab.subscribe();
    let navbar = tokio::spawn(async move {
        while let Ok(event) = session_changes.recv().await {
            match event {
                SessionEvent::SignedIn { username } => {
                    println!("[tab 2] hello, {username}");
                }
                SessionEvent::Refreshed { username } => {
                    println!("[tab 2] session renewed for {username}");
                }
                SessionEvent::SignedOut { reason } => {
                    println!("[tab 2] logged out ({reason:?})");
                    break;
                }
            }
        }
    });

    println!("signing in as {username} against {api_url}");
    dashboard.login(&username, &password).await?;

    let links = fetch_links(&dashboard).await?;
    println!("{} shortened links:", links.len());
    for link in &links {
        println!(
            "  {}  ->  {}  ({} clicks, created {})",
            link.short_url, link.long_url, link.clicks, link.created_at
        );
    }

    // Shorten whatever was passed on the command line.
    if let Some(raw) = std::env::args().nth(1) {
        match dashboard.shorten(&raw).await? {
            Fetch::Ready(link) => {
                println!("shortened: {}  ->  {}", link.short_url, link.long_url);
                if let Fetch::Ready(snapshot) =
                    dashboard.analytics(&link.short_code).await?
                {
                    println!(
                        "analytics for {}: {} total clicks across {} days",
                        snapshot.short_code,
                        snapshot.total_clicks,
                        snapshot.clicks_by_day.len()
                    );
                }
            }
            Fetch::RetryAfterRefresh => {
                println!("session renewed, re-run to shorten");
            }
        }
    }

    dashboard.logout().await;
    // The navbar task exits once it sees the SignedOut event.
    navbar.await?;

    Ok(())
}
