//! API routes

use crate::handlers;
use crate::state::AppState;
use axum::{
    http::HeaderValue,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

/// Origins allowed when `BOOKREV_CORS_ORIGINS` is unset
const DEV_ORIGINS: [&str; 4] = [
    "http://localhost:3000",
    "http://localhost:5173",
    "http://127.0.0.1:3000",
    "http://127.0.0.1:5173",
];

fn cors_layer() -> CorsLayer {
    // BOOKREV_CORS_ORIGINS can be comma-separated list of origins, or "*" for any
    let origins = match std::env::var("BOOKREV_CORS_ORIGINS").ok() {
        Some(origins) if origins == "*" => AllowOrigin::from(Any),
        Some(origins) => AllowOrigin::list(
            origins
                .split(',')
                .filter_map(|s| s.trim().parse::<HeaderValue>().ok())
                .collect::<Vec<_>>(),
        ),
        None => AllowOrigin::list(DEV_ORIGINS.map(HeaderValue::from_static)),
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Catalog feed
        .route("/books", get(handlers::list_books))
        .route("/books/more", post(handlers::load_more))
        .route("/books/scroll", post(handlers::scroll))
        .route("/books/:id", get(handlers::get_book))
        .route(
            "/books/:id/reviews",
            get(handlers::list_book_reviews).post(handlers::create_review),
        )
        // Search
        .route("/search", get(handlers::search_books))
        .route("/search/results", get(handlers::search_results))
        // Reviews
        .route(
            "/reviews/:id",
            put(handlers::edit_review).delete(handlers::delete_review),
        )
        // Favorites
        .route("/favorites", get(handlers::list_favorites))
        .route(
            "/favorites/:id",
            put(handlers::add_favorite).delete(handlers::remove_favorite),
        )
        .route("/mypage", get(handlers::my_page))
        // SSE endpoint
        .route("/sync", get(handlers::sync_events));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(handlers::health_check))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(state)
}
