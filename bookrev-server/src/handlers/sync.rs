//! Server-Sent Events handler for real-time updates

use crate::state::{AppState, ServerEvent};
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::Stream;
use std::convert::Infallible;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

/// Event name and JSON payload for an SSE frame
fn encode(event: ServerEvent) -> (&'static str, String) {
    match event {
        ServerEvent::PageLoaded { count, has_more } => (
            "page_loaded",
            serde_json::json!({ "count": count, "has_more": has_more }).to_string(),
        ),
        ServerEvent::ReviewAdded { id, book_id } => (
            "review_added",
            serde_json::json!({ "id": id, "book_id": book_id }).to_string(),
        ),
        ServerEvent::ReviewEdited { id } => {
            ("review_edited", serde_json::json!({ "id": id }).to_string())
        }
        ServerEvent::ReviewDeleted { id } => {
            ("review_deleted", serde_json::json!({ "id": id }).to_string())
        }
        ServerEvent::FavoriteChanged { book_id, favorite } => (
            "favorite_changed",
            serde_json::json!({ "book_id": book_id, "favorite": favorite }).to_string(),
        ),
        ServerEvent::Error { message } => (
            "error",
            serde_json::json!({ "message": message }).to_string(),
        ),
    }
}

/// SSE endpoint for real-time updates
pub async fn sync_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.subscribe();
    let stream = BroadcastStream::new(rx);

    let event_stream = stream.filter_map(|result| match result {
        Ok(event) => {
            let (event_type, data) = encode(event);
            Some(Ok(Event::default().event(event_type).data(data)))
        }
        Err(_) => None, // Lagged, skip
    });

    Sse::new(event_stream).keep_alive(KeepAlive::default())
}
