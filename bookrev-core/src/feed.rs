//! Paginated catalog feed and search results
//!
//! The feed accumulates pages of the default listing. At most one page fetch
//! is in flight at any time: manual "load more" requests and scroll signals
//! both go through [`CatalogFeed::request_next_page`], which claims the
//! `Loading` phase under the state lock before touching the network.

use crate::catalog::{effective_query, CatalogClient, PAGE_SIZE};
use crate::types::Book;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Distance from the document end (in pixels) that counts as "at the bottom"
pub const SCROLL_THRESHOLD_PX: f64 = 100.0;

/// Pagination phase of the feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedPhase {
    /// No fetch in flight, more pages may exist
    Idle,
    /// A page fetch is in flight
    Loading,
    /// The last fetch returned an empty page; no further fetches happen
    Exhausted,
}

/// What a call to [`CatalogFeed::request_next_page`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// A non-empty page was appended
    Appended(usize),
    /// The page was empty, the feed is now exhausted
    Exhausted,
    /// The fetch failed; the error was recorded and the feed is idle again
    Failed(String),
    /// Nothing was fetched because the feed was loading or exhausted
    Skipped(FeedPhase),
    /// A scroll signal that was not close enough to the bottom
    NotAtBottom,
}

/// Viewport geometry reported by a scrolling consumer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollPosition {
    pub viewport_height: f64,
    pub scroll_top: f64,
    pub document_height: f64,
}

impl ScrollPosition {
    pub fn near_bottom(&self) -> bool {
        self.viewport_height + self.scroll_top >= self.document_height - SCROLL_THRESHOLD_PX
    }
}

/// Point-in-time copy of the feed
#[derive(Debug, Clone, Serialize)]
pub struct FeedSnapshot {
    pub books: Vec<Book>,
    pub page: u32,
    pub phase: FeedPhase,
    pub has_more: bool,
    pub loading_more: bool,
    pub error: Option<String>,
}

/// Point-in-time copy of the search state
#[derive(Debug, Clone, Serialize)]
pub struct SearchSnapshot {
    pub query: Option<String>,
    pub results: Vec<Book>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug)]
struct FeedState {
    books: Vec<Book>,
    page: u32,
    phase: FeedPhase,
    search: SearchState,
    /// Shared between pagination and search, cleared by the next success
    error: Option<String>,
}

#[derive(Debug, Default)]
struct SearchState {
    query: Option<String>,
    results: Vec<Book>,
    loading: bool,
    generation: u64,
}

/// Accumulating catalog feed plus an independent search result list
pub struct CatalogFeed {
    catalog: Arc<dyn CatalogClient>,
    state: Mutex<FeedState>,
    started: AtomicBool,
}

impl CatalogFeed {
    pub fn new(catalog: Arc<dyn CatalogClient>) -> Self {
        Self {
            catalog,
            state: Mutex::new(FeedState {
                books: Vec::new(),
                page: 0,
                phase: FeedPhase::Idle,
                search: SearchState::default(),
                error: None,
            }),
            started: AtomicBool::new(false),
        }
    }

    pub fn catalog(&self) -> &Arc<dyn CatalogClient> {
        &self.catalog
    }

    fn lock(&self) -> MutexGuard<'_, FeedState> {
        lock(&self.state)
    }

    /// Trigger the initial page load. Only the first call fetches.
    pub async fn start(&self) -> PageOutcome {
        if self.started.swap(true, Ordering::SeqCst) {
            return PageOutcome::Skipped(self.phase());
        }
        self.request_next_page().await
    }

    pub fn phase(&self) -> FeedPhase {
        self.lock().phase
    }

    /// Fetch and append the next page unless a fetch is in flight or the
    /// feed is exhausted.
    pub async fn request_next_page(&self) -> PageOutcome {
        let offset = {
            let mut state = self.lock();
            if state.phase != FeedPhase::Idle {
                tracing::debug!(phase = ?state.phase, "skipping page request");
                return PageOutcome::Skipped(state.phase);
            }
            state.phase = FeedPhase::Loading;
            state.page * PAGE_SIZE
        };
        let guard = InFlightGuard::new(&self.state, InFlight::Page);

        tracing::debug!(offset, "requesting next catalog page");
        let result = self.catalog.list_books(None, offset).await;
        guard.disarm();

        let mut state = self.lock();
        match result {
            Ok(books) if books.is_empty() => {
                tracing::info!(offset, "catalog exhausted");
                state.phase = FeedPhase::Exhausted;
                PageOutcome::Exhausted
            }
            Ok(books) => {
                let count = books.len();
                state.books.extend(books);
                state.page += 1;
                state.phase = FeedPhase::Idle;
                state.error = None;
                PageOutcome::Appended(count)
            }
            Err(e) => {
                tracing::warn!("Failed to load catalog page at offset {}: {}", offset, e);
                let message = e.to_string();
                state.error = Some(message.clone());
                state.phase = FeedPhase::Idle;
                PageOutcome::Failed(message)
            }
        }
    }

    /// Scroll signal entry point; near the bottom it requests the next page
    pub async fn on_scroll(&self, position: ScrollPosition) -> PageOutcome {
        if !position.near_bottom() {
            return PageOutcome::NotAtBottom;
        }
        self.request_next_page().await
    }

    /// Replace the search results with page 0 for `query`.
    ///
    /// A blank query searches the default listing. When a newer search starts
    /// before this one finishes, this one's result is dropped.
    pub async fn search(&self, query: &str) -> SearchSnapshot {
        let generation = {
            let mut state = self.lock();
            state.search.generation += 1;
            state.search.loading = true;
            state.search.query = effective_query(Some(query)).map(str::to_string);
            state.search.generation
        };
        let guard = InFlightGuard::new(&self.state, InFlight::Search(generation));

        let result = self.catalog.list_books(Some(query), 0).await;
        guard.disarm();

        let mut state = self.lock();
        if state.search.generation != generation {
            tracing::debug!(query, "discarding superseded search");
            return search_snapshot(&state);
        }

        state.search.loading = false;
        match result {
            Ok(books) => {
                state.search.results = books;
                state.error = None;
            }
            Err(e) => {
                tracing::warn!("Search for {:?} failed: {}", query, e);
                state.search.results.clear();
                state.error = Some(e.to_string());
            }
        }
        search_snapshot(&state)
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        let state = self.lock();
        FeedSnapshot {
            books: state.books.clone(),
            page: state.page,
            phase: state.phase,
            has_more: state.phase != FeedPhase::Exhausted,
            loading_more: state.phase == FeedPhase::Loading,
            error: state.error.clone(),
        }
    }

    pub fn search_snapshot(&self) -> SearchSnapshot {
        search_snapshot(&self.lock())
    }

    /// A book already held by the feed or the current search results
    pub fn find_book(&self, id: &str) -> Option<Book> {
        let state = self.lock();
        state
            .books
            .iter()
            .chain(state.search.results.iter())
            .find(|b| b.id == id)
            .cloned()
    }
}

fn lock(state: &Mutex<FeedState>) -> MutexGuard<'_, FeedState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn search_snapshot(state: &FeedState) -> SearchSnapshot {
    SearchSnapshot {
        query: state.search.query.clone(),
        results: state.search.results.clone(),
        loading: state.search.loading,
        error: state.error.clone(),
    }
}

#[derive(Debug, Clone, Copy)]
enum InFlight {
    Page,
    Search(u64),
}

/// Clears the in-flight marker if the fetching future is dropped mid-await
struct InFlightGuard<'a> {
    state: &'a Mutex<FeedState>,
    kind: InFlight,
    armed: bool,
}

impl<'a> InFlightGuard<'a> {
    fn new(state: &'a Mutex<FeedState>, kind: InFlight) -> Self {
        Self {
            state,
            kind,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = lock(self.state);
        match self.kind {
            InFlight::Page if state.phase == FeedPhase::Loading => {
                state.phase = FeedPhase::Idle;
            }
            InFlight::Search(generation) if state.search.generation == generation => {
                state.search.loading = false;
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticCatalog;
    use proptest::prelude::*;
    use std::time::Duration;

    fn feed_over(catalog: &Arc<StaticCatalog>) -> CatalogFeed {
        CatalogFeed::new(catalog.clone())
    }

    #[tokio::test]
    async fn test_twenty_then_empty_exhausts() {
        let catalog = Arc::new(StaticCatalog::with_generated(20));
        let feed = feed_over(&catalog);

        assert_eq!(feed.request_next_page().await, PageOutcome::Appended(20));
        assert_eq!(feed.request_next_page().await, PageOutcome::Exhausted);

        let snapshot = feed.snapshot();
        assert_eq!(snapshot.books.len(), 20);
        assert_eq!(snapshot.phase, FeedPhase::Exhausted);
        assert_eq!(snapshot.page, 1);
        assert!(!snapshot.has_more);
    }

    #[tokio::test]
    async fn test_exhausted_feed_stops_fetching() {
        let catalog = Arc::new(StaticCatalog::with_generated(5));
        let feed = feed_over(&catalog);

        feed.request_next_page().await;
        feed.request_next_page().await;
        assert_eq!(catalog.list_calls(), 2);

        for _ in 0..3 {
            assert_eq!(
                feed.request_next_page().await,
                PageOutcome::Skipped(FeedPhase::Exhausted)
            );
        }
        assert_eq!(catalog.list_calls(), 2);
        assert_eq!(feed.snapshot().books.len(), 5);
    }

    #[tokio::test]
    async fn test_failure_keeps_books_and_allows_retry() {
        let catalog = Arc::new(StaticCatalog::with_generated(30));
        let feed = feed_over(&catalog);
        feed.request_next_page().await;

        catalog.fail_next(1);
        let outcome = feed.request_next_page().await;
        assert!(matches!(outcome, PageOutcome::Failed(_)));

        let snapshot = feed.snapshot();
        assert_eq!(snapshot.books.len(), 20);
        assert_eq!(snapshot.page, 1);
        assert_eq!(snapshot.phase, FeedPhase::Idle);
        assert!(snapshot.error.is_some());

        assert_eq!(feed.request_next_page().await, PageOutcome::Appended(10));
        let snapshot = feed.snapshot();
        assert_eq!(snapshot.books.len(), 30);
        assert!(snapshot.error.is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_at_most_one_fetch_in_flight() {
        let catalog = Arc::new(StaticCatalog::with_generated(200).with_delay(Duration::from_millis(30)));
        let feed = Arc::new(feed_over(&catalog));

        let mut handles = Vec::new();
        for i in 0..16 {
            let feed = feed.clone();
            handles.push(tokio::spawn(async move {
                if i % 2 == 0 {
                    feed.request_next_page().await
                } else {
                    feed.on_scroll(ScrollPosition {
                        viewport_height: 800.0,
                        scroll_top: 1150.0,
                        document_height: 2000.0,
                    })
                    .await
                }
            }));
        }

        let mut appended = 0;
        for handle in handles {
            match handle.await.unwrap() {
                PageOutcome::Appended(_) => appended += 1,
                PageOutcome::Skipped(FeedPhase::Loading) => {}
                other => panic!("unexpected outcome {:?}", other),
            }
        }

        assert_eq!(catalog.max_in_flight(), 1);
        assert_eq!(catalog.list_calls(), appended);

        let books = feed.snapshot().books;
        assert_eq!(books.len(), appended * 20);
        let ids: std::collections::HashSet<&str> = books.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids.len(), books.len());
    }

    #[tokio::test]
    async fn test_scroll_far_from_bottom_is_ignored() {
        let catalog = Arc::new(StaticCatalog::with_generated(40));
        let feed = feed_over(&catalog);

        let outcome = feed
            .on_scroll(ScrollPosition {
                viewport_height: 800.0,
                scroll_top: 0.0,
                document_height: 4000.0,
            })
            .await;
        assert_eq!(outcome, PageOutcome::NotAtBottom);
        assert_eq!(catalog.list_calls(), 0);
    }

    #[test]
    fn test_near_bottom_threshold() {
        let at = |scroll_top| ScrollPosition {
            viewport_height: 500.0,
            scroll_top,
            document_height: 1000.0,
        };
        assert!(!at(399.0).near_bottom());
        assert!(at(400.0).near_bottom());
        assert!(at(500.0).near_bottom());
    }

    #[tokio::test]
    async fn test_start_fetches_once() {
        let catalog = Arc::new(StaticCatalog::with_generated(60));
        let feed = feed_over(&catalog);

        assert_eq!(feed.start().await, PageOutcome::Appended(20));
        assert_eq!(feed.start().await, PageOutcome::Skipped(FeedPhase::Idle));
        assert_eq!(catalog.list_calls(), 1);
    }

    #[tokio::test]
    async fn test_search_replaces_results() {
        let catalog = Arc::new(StaticCatalog::new(vec![
            Book::new("1", "Dune"),
            Book::new("2", "Dune Messiah"),
            Book::new("3", "Emma"),
        ]));
        let feed = feed_over(&catalog);

        let dune = feed.search("dune").await;
        assert_eq!(dune.results.len(), 2);
        assert_eq!(dune.query.as_deref(), Some("dune"));

        let default = feed.search("").await;
        assert_eq!(default.query, None);
        assert_eq!(default.results.len(), 3);

        let emma = feed.search("emma").await;
        let ids: Vec<&str> = emma.results.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["3"]);
        assert!(feed.snapshot().books.is_empty());
    }

    #[tokio::test]
    async fn test_search_failure_clears_results() {
        let catalog = Arc::new(StaticCatalog::new(vec![Book::new("1", "Dune")]));
        let feed = feed_over(&catalog);
        feed.search("dune").await;

        catalog.fail_next(1);
        let failed = feed.search("dune").await;
        assert!(failed.results.is_empty());
        assert!(failed.error.is_some());
        assert!(!failed.loading);
        assert_eq!(feed.snapshot().phase, FeedPhase::Idle);
    }

    #[tokio::test]
    async fn test_superseded_search_is_discarded() {
        let catalog = Arc::new(
            StaticCatalog::new(vec![Book::new("1", "Dune"), Book::new("2", "Emma")])
                .with_delay(Duration::from_millis(20)),
        );
        let feed = Arc::new(feed_over(&catalog));

        let slow = {
            let feed = feed.clone();
            tokio::spawn(async move { feed.search("dune").await })
        };
        tokio::time::sleep(Duration::from_millis(5)).await;
        let latest = feed.search("emma").await;
        slow.await.unwrap();

        assert_eq!(latest.results[0].id, "2");
        let current = feed.search_snapshot();
        assert_eq!(current.query.as_deref(), Some("emma"));
        assert_eq!(current.results.len(), 1);
        assert_eq!(current.results[0].id, "2");
    }

    #[tokio::test]
    async fn test_dropped_fetch_releases_loading() {
        let catalog = Arc::new(StaticCatalog::with_generated(20).with_delay(Duration::from_secs(5)));
        let feed = feed_over(&catalog);

        let attempt =
            tokio::time::timeout(Duration::from_millis(20), feed.request_next_page()).await;
        assert!(attempt.is_err());
        assert_eq!(feed.phase(), FeedPhase::Idle);
    }

    #[tokio::test]
    async fn test_find_book_checks_feed_and_search() {
        let catalog = Arc::new(StaticCatalog::with_generated(25));
        let feed = feed_over(&catalog);
        feed.request_next_page().await;
        feed.search("Book 24").await;

        assert!(feed.find_book("book-3").is_some());
        assert!(feed.find_book("book-24").is_some());
        assert!(feed.find_book("book-99").is_none());
    }

    proptest! {
        #[test]
        fn prop_exhaustion_is_sticky(total in 0usize..75, extra in 1usize..6) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()
                .unwrap();
            rt.block_on(async {
                let catalog = Arc::new(StaticCatalog::with_generated(total));
                let feed = feed_over(&catalog);

                while feed.request_next_page().await != PageOutcome::Exhausted {}
                let exhausted = feed.snapshot();
                prop_assert_eq!(exhausted.books.len(), total);
                let calls = catalog.list_calls();

                for _ in 0..extra {
                    prop_assert_eq!(
                        feed.request_next_page().await,
                        PageOutcome::Skipped(FeedPhase::Exhausted)
                    );
                }
                prop_assert_eq!(catalog.list_calls(), calls);
                prop_assert_eq!(feed.snapshot().books, exhausted.books);
                Ok(())
            })?;
        }
    }
}
