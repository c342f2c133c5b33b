//! Durable review and favorite collections
//!
//! Both collections live under their own storage key as a JSON array and are
//! rewritten in full on every mutation. The in-memory copy is only replaced
//! after the write succeeded, so memory and storage never diverge.

use crate::error::Result;
use crate::storage::StorageProvider;
use crate::types::Review;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

/// Storage key of the review collection
pub const REVIEWS_KEY: &str = "reviews";

/// Storage key of the favorite book ids
pub const FAVORITES_KEY: &str = "favorites";

/// Write-through store of reviews and favorites
pub struct ReviewStore {
    storage: Arc<dyn StorageProvider>,
    reviews: Vec<Review>,
    favorites: Vec<String>,
}

impl ReviewStore {
    /// Load both collections. Missing or malformed records load as empty.
    pub async fn load(storage: Arc<dyn StorageProvider>) -> Self {
        let reviews = read_collection(storage.as_ref(), REVIEWS_KEY).await;
        let favorites = read_collection(storage.as_ref(), FAVORITES_KEY).await;
        tracing::debug!(
            reviews = reviews.len(),
            favorites = favorites.len(),
            "loaded review store"
        );
        Self {
            storage,
            reviews,
            favorites,
        }
    }

    /// All reviews in insertion order
    pub fn reviews(&self) -> &[Review] {
        &self.reviews
    }

    /// Favorite book ids in insertion order
    pub fn favorites(&self) -> &[String] {
        &self.favorites
    }

    pub fn review(&self, id: i64) -> Option<&Review> {
        self.reviews.iter().find(|r| r.id == id)
    }

    /// Reviews of one book, in insertion order
    pub fn reviews_for(&self, book_id: &str) -> Vec<Review> {
        self.reviews
            .iter()
            .filter(|r| r.book_id == book_id)
            .cloned()
            .collect()
    }

    pub fn is_favorite(&self, book_id: &str) -> bool {
        self.favorites.iter().any(|f| f == book_id)
    }

    /// Identifier for a review created at `now_ms`.
    ///
    /// Ids are creation timestamps; a clash with an existing id (two creations
    /// in the same millisecond, or a clock step back) is bumped past the
    /// largest id in use. When that would overflow, the first free id at or
    /// below `now_ms` is used instead.
    pub fn next_review_id(&self, now_ms: i64) -> i64 {
        let max = match self.reviews.iter().map(|r| r.id).max() {
            Some(max) if max >= now_ms => max,
            _ => return now_ms,
        };
        if let Some(next) = max.checked_add(1) {
            return next;
        }

        let taken: HashSet<i64> = self.reviews.iter().map(|r| r.id).collect();
        (i64::MIN..=now_ms)
            .rev()
            .find(|id| !taken.contains(id))
            .unwrap_or(now_ms)
    }

    pub async fn add_review(&mut self, review: Review) -> Result<()> {
        let mut updated = self.reviews.clone();
        updated.push(review);
        self.commit_reviews(updated).await
    }

    /// Replace title, content and rating of review `id`.
    ///
    /// Returns `false` without touching storage when no review has that id.
    pub async fn edit_review(
        &mut self,
        id: i64,
        title: &str,
        content: &str,
        rating: u8,
    ) -> Result<bool> {
        let Some(index) = self.reviews.iter().position(|r| r.id == id) else {
            return Ok(false);
        };

        let mut updated = self.reviews.clone();
        let review = &mut updated[index];
        review.title = title.to_string();
        review.content = content.to_string();
        review.rating = rating;

        self.commit_reviews(updated).await?;
        Ok(true)
    }

    /// Remove review `id`, `false` when it did not exist
    pub async fn delete_review(&mut self, id: i64) -> Result<bool> {
        if self.review(id).is_none() {
            return Ok(false);
        }
        let updated: Vec<Review> = self.reviews.iter().filter(|r| r.id != id).cloned().collect();
        self.commit_reviews(updated).await?;
        Ok(true)
    }

    /// Add a favorite; adding an existing one changes nothing
    pub async fn add_favorite(&mut self, book_id: &str) -> Result<bool> {
        if self.is_favorite(book_id) {
            return Ok(false);
        }
        let mut updated = self.favorites.clone();
        updated.push(book_id.to_string());
        self.commit_favorites(updated).await?;
        Ok(true)
    }

    /// Remove a favorite, `false` when it was not present
    pub async fn remove_favorite(&mut self, book_id: &str) -> Result<bool> {
        if !self.is_favorite(book_id) {
            return Ok(false);
        }
        let updated: Vec<String> = self
            .favorites
            .iter()
            .filter(|f| *f != book_id)
            .cloned()
            .collect();
        self.commit_favorites(updated).await?;
        Ok(true)
    }

    async fn commit_reviews(&mut self, updated: Vec<Review>) -> Result<()> {
        write_collection(self.storage.as_ref(), REVIEWS_KEY, &updated).await?;
        self.reviews = updated;
        Ok(())
    }

    async fn commit_favorites(&mut self, updated: Vec<String>) -> Result<()> {
        write_collection(self.storage.as_ref(), FAVORITES_KEY, &updated).await?;
        self.favorites = updated;
        Ok(())
    }
}

async fn read_collection<T: DeserializeOwned>(storage: &dyn StorageProvider, key: &str) -> Vec<T> {
    let data = match storage.read(key).await {
        Ok(data) => data,
        Err(crate::error::StorageError::NotFound(_)) => return Vec::new(),
        Err(e) => {
            tracing::warn!("Failed to read {}, starting empty: {}", key, e);
            return Vec::new();
        }
    };

    // A stored `null` is treated like a missing record
    match serde_json::from_slice::<Option<Vec<T>>>(&data) {
        Ok(items) => items.unwrap_or_default(),
        Err(e) => {
            tracing::warn!("Malformed {} record, starting empty: {}", key, e);
            Vec::new()
        }
    }
}

async fn write_collection<T: Serialize>(
    storage: &dyn StorageProvider,
    key: &str,
    items: &[T],
) -> Result<()> {
    let data = serde_json::to_vec(items)?;
    storage.write(key, data).await?;
    tracing::debug!(key, count = items.len(), "persisted collection");
    Ok(())
}
