//! Review handlers

use crate::error::ApiError;
use crate::state::{AppState, ServerEvent};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use bookrev_core::{Review, ReviewDraft, ReviewEdit};
use serde::{Deserialize, Serialize};

/// A review as returned to clients; the password stays server-side
#[derive(Debug, Serialize)]
pub struct ReviewView {
    pub id: i64,
    pub book_id: String,
    pub title: String,
    pub content: String,
    pub rating: u8,
}

impl From<&Review> for ReviewView {
    fn from(review: &Review) -> Self {
        Self {
            id: review.id,
            book_id: review.book_id.clone(),
            title: review.title.clone(),
            content: review.content.clone(),
            rating: review.rating,
        }
    }
}

/// List reviews of one book
pub async fn list_book_reviews(
    State(state): State<AppState>,
    Path(book_id): Path<String>,
) -> Json<Vec<ReviewView>> {
    let reviews = state.library.reviews_for(&book_id).await;
    Json(reviews.iter().map(ReviewView::from).collect())
}

/// Post a review for a book
pub async fn create_review(
    State(state): State<AppState>,
    Path(book_id): Path<String>,
    Json(draft): Json<ReviewDraft>,
) -> Result<(StatusCode, Json<ReviewView>), ApiError> {
    let review = state.library.submit_review(&book_id, draft).await?;

    state.broadcast(ServerEvent::ReviewAdded {
        id: review.id,
        book_id: review.book_id.clone(),
    });

    Ok((StatusCode::CREATED, Json(ReviewView::from(&review))))
}

/// Edit request: the password gate plus the replacement fields
#[derive(Debug, Deserialize)]
pub struct EditReviewRequest {
    #[serde(default)]
    pub password: String,

    #[serde(flatten)]
    pub edit: ReviewEdit,
}

/// Edit a review
pub async fn edit_review(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<EditReviewRequest>,
) -> Result<Json<ReviewView>, ApiError> {
    let review = state
        .library
        .edit_review(id, &request.password, request.edit)
        .await?;

    state.broadcast(ServerEvent::ReviewEdited { id });

    Ok(Json(ReviewView::from(&review)))
}

/// Delete request body
#[derive(Debug, Deserialize)]
pub struct DeleteReviewRequest {
    #[serde(default)]
    pub password: String,
}

/// Delete a review
pub async fn delete_review(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<DeleteReviewRequest>,
) -> Result<StatusCode, ApiError> {
    state.library.delete_review(id, &request.password).await?;

    state.broadcast(ServerEvent::ReviewDeleted { id });

    Ok(StatusCode::NO_CONTENT)
}
