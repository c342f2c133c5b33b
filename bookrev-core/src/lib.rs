//! Bookrev Core Library
//!
//! Data and state layer of the Bookrev book-review application: a client for
//! the remote book catalog, the durable review/favorite store, the paginated
//! catalog feed, and the [`Library`] accessor that composes them for every
//! consumer.

pub mod catalog;
pub mod config;
pub mod error;
pub mod feed;
pub mod library;
pub mod storage;
pub mod store;
pub mod types;

pub use catalog::{CatalogClient, GoogleBooksClient, StaticCatalog, PAGE_SIZE};
pub use config::Config;
pub use error::{BookrevError, RemoteFetchError, Result, StorageError, ValidationError};
pub use feed::{CatalogFeed, FeedPhase, FeedSnapshot, PageOutcome, ScrollPosition, SearchSnapshot};
pub use library::{FavoriteEntry, Library, MyPage, ReviewEntry};
pub use store::ReviewStore;
pub use types::{Book, Review, ReviewDraft, ReviewEdit};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_library_creation() {
        let library = Library::new(
            Arc::new(StaticCatalog::with_generated(20)),
            Arc::new(storage::MemoryStorage::new()),
        )
        .await;
        assert_eq!(library.start().await, PageOutcome::Appended(20));
        assert_eq!(library.books().books.len(), 20);
    }
}
