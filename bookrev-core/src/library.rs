//! The shared application state handed to every consumer
//!
//! `Library` composes the catalog feed, the review/favorite store and a
//! session cache of looked-up books. Consumers never touch the parts
//! directly for mutations; every change goes through a method here.

use crate::catalog::{CatalogClient, GoogleBooksClient};
use crate::config::Config;
use crate::error::{BookrevError, Result, ValidationError};
use crate::feed::{CatalogFeed, FeedSnapshot, PageOutcome, ScrollPosition, SearchSnapshot};
use crate::storage::{LocalStorage, StorageProvider};
use crate::store::ReviewStore;
use crate::types::{Book, Review, ReviewDraft, ReviewEdit};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Catalog, reviews and favorites behind one accessor
pub struct Library {
    feed: CatalogFeed,
    store: RwLock<ReviewStore>,
    details: RwLock<HashMap<String, Book>>,
}

/// A review on the my-page listing with its book, when resolvable
#[derive(Debug, Clone)]
pub struct ReviewEntry {
    pub review: Review,
    pub book: Option<Book>,
}

/// A favorite on the my-page listing with its book, when resolvable
#[derive(Debug, Clone)]
pub struct FavoriteEntry {
    pub book_id: String,
    pub book: Option<Book>,
}

/// Everything the visitor has written or marked
#[derive(Debug, Clone, Default)]
pub struct MyPage {
    pub reviews: Vec<ReviewEntry>,
    pub favorites: Vec<FavoriteEntry>,
}

impl Library {
    /// Assemble a library and load the durable collections
    pub async fn new(catalog: Arc<dyn CatalogClient>, storage: Arc<dyn StorageProvider>) -> Self {
        Self {
            feed: CatalogFeed::new(catalog),
            store: RwLock::new(ReviewStore::load(storage).await),
            details: RwLock::new(HashMap::new()),
        }
    }

    /// Google Books catalog and on-disk storage as configured
    pub async fn from_config(config: &Config) -> Result<Self> {
        let catalog = Arc::new(GoogleBooksClient::from_config(config)?);
        let storage = Arc::new(LocalStorage::new(&config.storage_path));
        Ok(Self::new(catalog, storage).await)
    }

    /// Initial feed load, performed once per library
    pub async fn start(&self) -> PageOutcome {
        self.feed.start().await
    }

    pub fn feed(&self) -> &CatalogFeed {
        &self.feed
    }

    // Catalog

    pub fn books(&self) -> FeedSnapshot {
        self.feed.snapshot()
    }

    /// Manual "load more"
    pub async fn load_more(&self) -> PageOutcome {
        self.feed.request_next_page().await
    }

    pub async fn on_scroll(&self, position: ScrollPosition) -> PageOutcome {
        self.feed.on_scroll(position).await
    }

    pub async fn search(&self, query: &str) -> SearchSnapshot {
        self.feed.search(query).await
    }

    pub fn search_results(&self) -> SearchSnapshot {
        self.feed.search_snapshot()
    }

    /// Resolve a book by id.
    ///
    /// Books already in the feed or search results are returned as is;
    /// anything else is fetched once and kept for the rest of the session.
    pub async fn book_detail(&self, id: &str) -> Result<Book> {
        if let Some(book) = self.feed.find_book(id) {
            return Ok(book);
        }
        if let Some(book) = self.details.read().await.get(id) {
            return Ok(book.clone());
        }

        match self.feed.catalog().get_book_by_id(id).await? {
            Some(book) => {
                self.details
                    .write()
                    .await
                    .insert(id.to_string(), book.clone());
                Ok(book)
            }
            None => Err(BookrevError::NotFound(format!("book {}", id))),
        }
    }

    // Reviews

    pub async fn reviews(&self) -> Vec<Review> {
        self.store.read().await.reviews().to_vec()
    }

    pub async fn reviews_for(&self, book_id: &str) -> Vec<Review> {
        self.store.read().await.reviews_for(book_id)
    }

    /// Validate and store a new review for `book_id`
    pub async fn submit_review(&self, book_id: &str, draft: ReviewDraft) -> Result<Review> {
        if book_id.trim().is_empty() {
            return Err(ValidationError::MissingField("book id").into());
        }
        draft.validate()?;

        let mut store = self.store.write().await;
        let id = store.next_review_id(chrono::Utc::now().timestamp_millis());
        let review = Review::from_draft(id, book_id, draft);
        store.add_review(review.clone()).await?;

        tracing::info!(id, book_id, "review added");
        Ok(review)
    }

    /// Edit a review after checking its password.
    ///
    /// A wrong password aborts the edit before anything is written.
    pub async fn edit_review(&self, id: i64, password: &str, edit: ReviewEdit) -> Result<Review> {
        edit.validate()?;

        let mut store = self.store.write().await;
        check_password(&store, id, password)?;
        store
            .edit_review(id, &edit.title, &edit.content, edit.rating)
            .await?;

        tracing::info!(id, "review edited");
        store
            .review(id)
            .cloned()
            .ok_or_else(|| BookrevError::NotFound(format!("review {}", id)))
    }

    /// Delete a review after checking its password
    pub async fn delete_review(&self, id: i64, password: &str) -> Result<()> {
        let mut store = self.store.write().await;
        check_password(&store, id, password)?;
        store.delete_review(id).await?;

        tracing::info!(id, "review deleted");
        Ok(())
    }

    // Favorites

    pub async fn favorites(&self) -> Vec<String> {
        self.store.read().await.favorites().to_vec()
    }

    pub async fn is_favorite(&self, book_id: &str) -> bool {
        self.store.read().await.is_favorite(book_id)
    }

    pub async fn add_favorite(&self, book_id: &str) -> Result<bool> {
        let added = self.store.write().await.add_favorite(book_id).await?;
        if added {
            tracing::info!(book_id, "favorite added");
        }
        Ok(added)
    }

    pub async fn remove_favorite(&self, book_id: &str) -> Result<bool> {
        let removed = self.store.write().await.remove_favorite(book_id).await?;
        if removed {
            tracing::info!(book_id, "favorite removed");
        }
        Ok(removed)
    }

    /// Flip the favorite flag, returning the new state
    pub async fn toggle_favorite(&self, book_id: &str) -> Result<bool> {
        let mut store = self.store.write().await;
        if store.is_favorite(book_id) {
            store.remove_favorite(book_id).await?;
            Ok(false)
        } else {
            store.add_favorite(book_id).await?;
            Ok(true)
        }
    }

    /// Reviews and favorites with their books resolved.
    ///
    /// A book that cannot be looked up is left unresolved instead of failing
    /// the whole page.
    pub async fn my_page(&self) -> MyPage {
        let (reviews, favorites) = {
            let store = self.store.read().await;
            (store.reviews().to_vec(), store.favorites().to_vec())
        };

        let mut resolved: HashMap<String, Option<Book>> = HashMap::new();
        let mut seen = HashSet::new();
        let ids = reviews
            .iter()
            .map(|r| r.book_id.clone())
            .chain(favorites.iter().cloned())
            .filter(|id| seen.insert(id.clone()))
            .collect::<Vec<_>>();
        for id in ids {
            let book = match self.book_detail(&id).await {
                Ok(book) => Some(book),
                Err(e) => {
                    tracing::warn!("Could not resolve book {} for my page: {}", id, e);
                    None
                }
            };
            resolved.insert(id, book);
        }

        let lookup = |id: &str| resolved.get(id).cloned().flatten();
        MyPage {
            reviews: reviews
                .into_iter()
                .map(|review| ReviewEntry {
                    book: lookup(&review.book_id),
                    review,
                })
                .collect(),
            favorites: favorites
                .into_iter()
                .map(|book_id| FavoriteEntry {
                    book: lookup(&book_id),
                    book_id,
                })
                .collect(),
        }
    }
}

fn check_password(store: &ReviewStore, id: i64, password: &str) -> Result<()> {
    let review = store
        .review(id)
        .ok_or_else(|| BookrevError::NotFound(format!("review {}", id)))?;
    if !review.password_matches(password) {
        tracing::warn!(id, "password mismatch on review");
        return Err(ValidationError::PasswordMismatch.into());
    }
    Ok(())
}
