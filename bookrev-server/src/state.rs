//! Application state

use anyhow::{Context, Result};
use bookrev_core::{Config, Library};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Catalog feed, reviews and favorites
    pub library: Arc<Library>,

    /// Channel for SSE events
    pub event_tx: broadcast::Sender<ServerEvent>,
}

/// Server-sent events
#[derive(Debug, Clone)]
pub enum ServerEvent {
    /// A catalog page was appended to the feed
    PageLoaded { count: usize, has_more: bool },

    /// A review was created
    ReviewAdded { id: i64, book_id: String },

    /// A review was edited
    ReviewEdited { id: i64 },

    /// A review was deleted
    ReviewDeleted { id: i64 },

    /// A book was added to or removed from the favorites
    FavoriteChanged { book_id: String, favorite: bool },

    /// An error occurred
    Error { message: String },
}

impl AppState {
    /// Create application state from `BOOKREV_*` environment variables
    pub async fn new() -> Result<Self> {
        let config = Config::from_env();

        tokio::fs::create_dir_all(&config.storage_path)
            .await
            .with_context(|| format!("Failed to create {}", config.storage_path.display()))?;

        let library = Library::from_config(&config)
            .await
            .context("Failed to build catalog client")?;

        Ok(Self::with_library(library))
    }

    /// Wrap an already assembled library
    pub fn with_library(library: Library) -> Self {
        let (event_tx, _) = broadcast::channel(100);
        Self {
            library: Arc::new(library),
            event_tx,
        }
    }

    /// Subscribe to server events
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.event_tx.subscribe()
    }

    /// Broadcast an event
    pub fn broadcast(&self, event: ServerEvent) {
        // Ignore errors (no subscribers)
        let _ = self.event_tx.send(event);
    }
}
