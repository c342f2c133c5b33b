//! Catalog feed, search and book detail handlers

use super::ReviewView;
use crate::error::ApiError;
use crate::state::{AppState, ServerEvent};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use bookrev_core::{Book, FeedSnapshot, PageOutcome, ScrollPosition, SearchSnapshot};
use serde::{Deserialize, Serialize};

/// Current feed: accumulated books plus pagination flags
pub async fn list_books(State(state): State<AppState>) -> Json<FeedSnapshot> {
    Json(state.library.books())
}

/// Result of a pagination trigger
#[derive(Debug, Serialize)]
pub struct PageResponse {
    /// appended, exhausted, failed, skipped or not_at_bottom
    pub outcome: &'static str,
    pub appended: usize,
    pub feed: FeedSnapshot,
}

fn page_response(state: &AppState, outcome: PageOutcome) -> PageResponse {
    let feed = state.library.books();
    let (label, appended) = match &outcome {
        PageOutcome::Appended(count) => ("appended", *count),
        PageOutcome::Exhausted => ("exhausted", 0),
        PageOutcome::Failed(_) => ("failed", 0),
        PageOutcome::Skipped(_) => ("skipped", 0),
        PageOutcome::NotAtBottom => ("not_at_bottom", 0),
    };

    match outcome {
        PageOutcome::Appended(count) => state.broadcast(ServerEvent::PageLoaded {
            count,
            has_more: feed.has_more,
        }),
        PageOutcome::Exhausted => state.broadcast(ServerEvent::PageLoaded {
            count: 0,
            has_more: false,
        }),
        PageOutcome::Failed(message) => state.broadcast(ServerEvent::Error { message }),
        _ => {}
    }

    PageResponse {
        outcome: label,
        appended,
        feed,
    }
}

/// Manual "load more"
pub async fn load_more(State(state): State<AppState>) -> Json<PageResponse> {
    let outcome = state.library.load_more().await;
    Json(page_response(&state, outcome))
}

/// Scroll signal from a client viewport
pub async fn scroll(
    State(state): State<AppState>,
    Json(position): Json<ScrollPosition>,
) -> Json<PageResponse> {
    let outcome = state.library.on_scroll(position).await;
    Json(page_response(&state, outcome))
}

/// Query parameters for searching
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Search term
    #[serde(default)]
    pub q: String,
}

/// Search the catalog, replacing the previous results
pub async fn search_books(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchSnapshot>, ApiError> {
    if query.q.trim().is_empty() {
        return Err(ApiError::bad_request("Search term must not be blank"));
    }
    Ok(Json(state.library.search(&query.q).await))
}

/// Latest search results without searching again
pub async fn search_results(State(state): State<AppState>) -> Json<SearchSnapshot> {
    Json(state.library.search_results())
}

/// Book detail page payload
#[derive(Debug, Serialize)]
pub struct BookDetailResponse {
    pub book: Book,
    pub reviews: Vec<ReviewView>,
    pub favorite: bool,
}

/// Get a single book with its reviews and favorite flag
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BookDetailResponse>, ApiError> {
    let book = state.library.book_detail(&id).await?;
    let reviews = state
        .library
        .reviews_for(&id)
        .await
        .iter()
        .map(ReviewView::from)
        .collect();
    let favorite = state.library.is_favorite(&id).await;

    Ok(Json(BookDetailResponse {
        book,
        reviews,
        favorite,
    }))
}
