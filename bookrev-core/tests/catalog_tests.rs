//! Google Books client tests against a local fixture server

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use bookrev_core::{CatalogClient, GoogleBooksClient, RemoteFetchError};
use serde_json::json;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

async fn list_volumes(Query(params): Query<HashMap<String, String>>) -> Response {
    let q = params.get("q").cloned().unwrap_or_default();
    match q.as_str() {
        "empty" => Json(json!({ "kind": "books#volumes", "totalItems": 0 })).into_response(),
        "boom" => (StatusCode::INTERNAL_SERVER_ERROR, "backend exploded").into_response(),
        _ => {
            // Echo the received parameters through the title so tests can inspect them
            let echo = ["q", "orderBy", "startIndex", "maxResults", "key"]
                .iter()
                .map(|k| params.get(*k).cloned().unwrap_or_default())
                .collect::<Vec<_>>()
                .join("|");
            Json(json!({
                "kind": "books#volumes",
                "totalItems": 1,
                "items": [{
                    "id": "echo",
                    "volumeInfo": { "title": echo, "authors": ["A. Author"] }
                }]
            }))
            .into_response()
        }
    }
}

async fn get_volume(Path(id): Path<String>) -> Response {
    match id.as_str() {
        "missing" => (StatusCode::NOT_FOUND, "not here").into_response(),
        "blank" => StatusCode::OK.into_response(),
        "throttled" => (StatusCode::TOO_MANY_REQUESTS, "slow down").into_response(),
        _ => Json(json!({
            "id": id,
            "volumeInfo": {
                "title": "Dune",
                "publisher": "Chilton",
                "publishedDate": "1965",
                "imageLinks": { "thumbnail": "http://img/dune" }
            },
            "saleInfo": { "buyLink": "http://shop/dune" }
        }))
        .into_response(),
    }
}

async fn spawn_fixture() -> SocketAddr {
    let app = Router::new()
        .route("/v1/volumes", get(list_volumes))
        .route("/v1/volumes/:id", get(get_volume));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn client(addr: SocketAddr) -> GoogleBooksClient {
    GoogleBooksClient::new(format!("http://{}/v1", addr), "k3y", Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_default_listing_parameters() {
    let addr = spawn_fixture().await;

    let books = client(addr).list_books(None, 40).await.unwrap();

    assert_eq!(books.len(), 1);
    assert_eq!(books[0].title, "books|relevance|40|20|k3y");
    assert_eq!(books[0].authors, vec!["A. Author".to_string()]);
}

#[tokio::test]
async fn test_search_sends_decoded_term() {
    let addr = spawn_fixture().await;

    let books = client(addr).list_books(Some("dune messiah"), 0).await.unwrap();

    assert_eq!(books[0].title, "dune messiah|relevance|0|20|k3y");
}

#[tokio::test]
async fn test_missing_items_is_empty_page() {
    let addr = spawn_fixture().await;

    let books = client(addr).list_books(Some("empty"), 400).await.unwrap();

    assert!(books.is_empty());
}

#[tokio::test]
async fn test_error_status_carries_body() {
    let addr = spawn_fixture().await;

    let err = client(addr).list_books(Some("boom"), 0).await.unwrap_err();

    match err {
        RemoteFetchError::Status { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "backend exploded");
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_detail_lookup() {
    let addr = spawn_fixture().await;

    let book = client(addr).get_book_by_id("abc").await.unwrap().unwrap();

    assert_eq!(book.id, "abc");
    assert_eq!(book.title, "Dune");
    assert_eq!(book.publisher.as_deref(), Some("Chilton"));
    assert_eq!(book.thumbnail.as_deref(), Some("http://img/dune"));
    assert_eq!(book.buy_link.as_deref(), Some("http://shop/dune"));
}

#[tokio::test]
async fn test_detail_missing_is_none() {
    let addr = spawn_fixture().await;
    let client = client(addr);

    assert_eq!(client.get_book_by_id("missing").await.unwrap(), None);
    assert_eq!(client.get_book_by_id("blank").await.unwrap(), None);
}

#[tokio::test]
async fn test_detail_error_status() {
    let addr = spawn_fixture().await;

    let err = client(addr).get_book_by_id("throttled").await.unwrap_err();

    assert_eq!(err.status(), Some(429));
}

#[tokio::test]
async fn test_unreachable_upstream_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(addr).list_books(None, 0).await.unwrap_err();

    assert!(matches!(err, RemoteFetchError::Transport(_)));
    assert_eq!(err.status(), None);
}
