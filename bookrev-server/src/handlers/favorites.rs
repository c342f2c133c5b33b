//! Favorite and my-page handlers

use super::ReviewView;
use crate::error::ApiError;
use crate::state::{AppState, ServerEvent};
use axum::{
    extract::{Path, State},
    Json,
};
use bookrev_core::Book;
use serde::Serialize;

/// Favorite book ids in the order they were added
pub async fn list_favorites(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.library.favorites().await)
}

/// Favorite state after a change
#[derive(Debug, Serialize)]
pub struct FavoriteResponse {
    pub book_id: String,
    pub favorite: bool,
    /// Whether the request changed anything
    pub changed: bool,
}

/// Mark a book as favorite
pub async fn add_favorite(
    State(state): State<AppState>,
    Path(book_id): Path<String>,
) -> Result<Json<FavoriteResponse>, ApiError> {
    let changed = state.library.add_favorite(&book_id).await?;
    if changed {
        state.broadcast(ServerEvent::FavoriteChanged {
            book_id: book_id.clone(),
            favorite: true,
        });
    }
    Ok(Json(FavoriteResponse {
        book_id,
        favorite: true,
        changed,
    }))
}

/// Unmark a favorite book
pub async fn remove_favorite(
    State(state): State<AppState>,
    Path(book_id): Path<String>,
) -> Result<Json<FavoriteResponse>, ApiError> {
    let changed = state.library.remove_favorite(&book_id).await?;
    if changed {
        state.broadcast(ServerEvent::FavoriteChanged {
            book_id: book_id.clone(),
            favorite: false,
        });
    }
    Ok(Json(FavoriteResponse {
        book_id,
        favorite: false,
        changed,
    }))
}

#[derive(Debug, Serialize)]
pub struct MyPageReview {
    #[serde(flatten)]
    pub review: ReviewView,
    pub book: Option<Book>,
}

#[derive(Debug, Serialize)]
pub struct MyPageFavorite {
    pub book_id: String,
    pub book: Option<Book>,
}

#[derive(Debug, Serialize)]
pub struct MyPageResponse {
    pub reviews: Vec<MyPageReview>,
    pub favorites: Vec<MyPageFavorite>,
}

/// Everything the visitor wrote or marked, with books resolved
pub async fn my_page(State(state): State<AppState>) -> Json<MyPageResponse> {
    let page = state.library.my_page().await;

    Json(MyPageResponse {
        reviews: page
            .reviews
            .into_iter()
            .map(|entry| MyPageReview {
                review: ReviewView::from(&entry.review),
                book: entry.book,
            })
            .collect(),
        favorites: page
            .favorites
            .into_iter()
            .map(|entry| MyPageFavorite {
                book_id: entry.book_id,
                book: entry.book,
            })
            .collect(),
    })
}
