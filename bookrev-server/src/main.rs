//! Bookrev Server - JSON API over the book-review library

use anyhow::{Context, Result};
use bookrev_core::PageOutcome;
use bookrev_server::{routes, state};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bookrev_server=debug,bookrev_core=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Create application state
    let state = state::AppState::new().await?;

    // First catalog page loads in the background so the listener comes up immediately
    let initial = state.clone();
    tokio::spawn(async move {
        if let PageOutcome::Appended(count) = initial.library.start().await {
            initial.broadcast(state::ServerEvent::PageLoaded {
                count,
                has_more: initial.library.books().has_more,
            });
        }
    });

    // Build router
    let app = routes::create_router(state);

    // Start server
    let addr: SocketAddr = std::env::var("BOOKREV_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
        .parse()
        .context("BOOKREV_ADDR must be a socket address")?;
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
