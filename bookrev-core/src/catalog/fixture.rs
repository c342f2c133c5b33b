//! In-memory catalog (for testing and offline runs)

use super::{effective_query, CatalogClient, PAGE_SIZE};
use crate::error::RemoteFetchError;
use crate::types::Book;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Catalog backed by a fixed list of books.
///
/// Searches match titles and authors case-insensitively. Failures and latency
/// can be injected, and every call is counted so tests can assert on how the
/// catalog was driven.
#[derive(Default)]
pub struct StaticCatalog {
    books: Vec<Book>,
    delay: Option<Duration>,
    pending_failures: AtomicUsize,
    list_calls: AtomicUsize,
    detail_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl StaticCatalog {
    pub fn new(books: Vec<Book>) -> Self {
        Self {
            books,
            ..Self::default()
        }
    }

    /// `count` generated books with ids `book-0`, `book-1`, ...
    pub fn with_generated(count: usize) -> Self {
        Self::new(
            (0..count)
                .map(|i| Book::new(format!("book-{}", i), format!("Book {}", i)))
                .collect(),
        )
    }

    /// Delay every call by `delay`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Make the next `count` calls fail with a 503
    pub fn fail_next(&self, count: usize) {
        self.pending_failures.store(count, Ordering::SeqCst);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }

    /// Highest number of calls that were ever running at the same time
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn enter(&self) -> Result<InFlight<'_>, RemoteFetchError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let guard = InFlight(&self.in_flight);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let failed = self
            .pending_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(RemoteFetchError::Status {
                status: 503,
                body: "injected failure".to_string(),
            });
        }
        Ok(guard)
    }

    fn snapshot(&self) -> Vec<Book> {
        self.books.clone()
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

fn matches(book: &Book, needle: &str) -> bool {
    book.title.to_lowercase().contains(needle)
        || book
            .authors
            .iter()
            .any(|a| a.to_lowercase().contains(needle))
}

#[async_trait]
impl CatalogClient for StaticCatalog {
    async fn list_books(
        &self,
        query: Option<&str>,
        offset: u32,
    ) -> Result<Vec<Book>, RemoteFetchError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let _guard = self.enter().await?;

        let needle = effective_query(query).map(str::to_lowercase);
        Ok(self
            .books
            .iter()
            .filter(|book| needle.as_deref().map_or(true, |n| matches(book, n)))
            .skip(offset as usize)
            .take(PAGE_SIZE as usize)
            .cloned()
            .collect())
    }

    async fn get_book_by_id(&self, id: &str) -> Result<Option<Book>, RemoteFetchError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        let _guard = self.enter().await?;
        Ok(self.books.iter().find(|book| book.id == id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pages_and_offsets() {
        let catalog = StaticCatalog::with_generated(25);

        assert_eq!(catalog.list_books(None, 0).await.unwrap().len(), 20);
        assert_eq!(catalog.list_books(None, 20).await.unwrap().len(), 5);
        assert!(catalog.list_books(None, 40).await.unwrap().is_empty());
        assert_eq!(catalog.list_calls(), 3);
    }

    #[tokio::test]
    async fn test_search_matches_title_and_author() {
        let catalog = StaticCatalog::new(vec![
            Book::new("1", "Dune").with_author("Frank Herbert"),
            Book::new("2", "Emma").with_author("Jane Austen"),
        ]);

        let hits = catalog.list_books(Some("DUNE"), 0).await.unwrap();
        assert_eq!(hits.len(), 1);
        let hits = catalog.list_books(Some("austen"), 0).await.unwrap();
        assert_eq!(hits[0].id, "2");
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let catalog = StaticCatalog::with_generated(1);
        catalog.fail_next(1);

        let err = catalog.list_books(None, 0).await.unwrap_err();
        assert_eq!(err.status(), Some(503));
        assert!(catalog.list_books(None, 0).await.is_ok());
        assert_eq!(catalog.get_book_by_id("missing").await.unwrap(), None);
    }
}
