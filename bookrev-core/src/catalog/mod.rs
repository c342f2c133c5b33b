//! Remote catalog clients

mod fixture;
mod google;

pub use fixture::StaticCatalog;
pub use google::GoogleBooksClient;

use crate::error::RemoteFetchError;
use crate::types::Book;
use async_trait::async_trait;

/// Fixed number of books per catalog page
pub const PAGE_SIZE: u32 = 20;

/// Term used when listing without a search query
pub const DEFAULT_QUERY: &str = "books";

/// Read-only access to a book catalog
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Fetch one page of at most [`PAGE_SIZE`] books starting at `offset`.
    ///
    /// A blank or absent query lists [`DEFAULT_QUERY`] by relevance. An offset
    /// past the end of the results yields an empty page, not an error.
    async fn list_books(
        &self,
        query: Option<&str>,
        offset: u32,
    ) -> Result<Vec<Book>, RemoteFetchError>;

    /// Look a single book up, `None` when the catalog has no such id
    async fn get_book_by_id(&self, id: &str) -> Result<Option<Book>, RemoteFetchError>;
}

/// Trimmed query, or `None` when it is absent or blank
pub fn effective_query(query: Option<&str>) -> Option<&str> {
    query.map(str::trim).filter(|q| !q.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_query() {
        assert_eq!(effective_query(None), None);
        assert_eq!(effective_query(Some("")), None);
        assert_eq!(effective_query(Some("   ")), None);
        assert_eq!(effective_query(Some(" dune ")), Some("dune"));
    }
}
