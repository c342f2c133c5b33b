//! Google Books volumes API client

use super::{effective_query, CatalogClient, DEFAULT_QUERY, PAGE_SIZE};
use crate::config::Config;
use crate::error::RemoteFetchError;
use crate::types::Book;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

const USER_AGENT: &str = concat!("bookrev/", env!("CARGO_PKG_VERSION"));

/// Client for `GET {base}/volumes` and `GET {base}/volumes/{id}`
#[derive(Clone)]
pub struct GoogleBooksClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GoogleBooksClient {
    /// Create a client against `base_url` (e.g. `https://www.googleapis.com/books/v1`)
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, RemoteFetchError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, RemoteFetchError> {
        Self::new(&config.api_base, &config.api_key, config.http_timeout)
    }

    fn list_url(&self, query: Option<&str>, offset: u32) -> String {
        let term = effective_query(query).unwrap_or(DEFAULT_QUERY);
        format!(
            "{}/volumes?q={}&orderBy=relevance&startIndex={}&maxResults={}&key={}",
            self.base_url,
            urlencoding::encode(term),
            offset,
            PAGE_SIZE,
            urlencoding::encode(&self.api_key),
        )
    }

    fn detail_url(&self, id: &str) -> String {
        format!(
            "{}/volumes/{}?key={}",
            self.base_url,
            urlencoding::encode(id),
            urlencoding::encode(&self.api_key),
        )
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, RemoteFetchError> {
        self.http
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("catalog request failed: {}", e);
                RemoteFetchError::from(e)
            })
    }
}

/// Turn a non-success response into an error carrying the upstream body
async fn status_error(response: reqwest::Response) -> RemoteFetchError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    tracing::warn!("catalog returned status {}: {}", status, body);
    RemoteFetchError::Status { status, body }
}

#[async_trait]
impl CatalogClient for GoogleBooksClient {
    async fn list_books(
        &self,
        query: Option<&str>,
        offset: u32,
    ) -> Result<Vec<Book>, RemoteFetchError> {
        tracing::debug!(?query, offset, "listing catalog page");
        let response = self.get(&self.list_url(query, offset)).await?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let page: VolumeList = response.json().await?;
        Ok(page
            .items
            .unwrap_or_default()
            .into_iter()
            .map(Book::from)
            .collect())
    }

    async fn get_book_by_id(&self, id: &str) -> Result<Option<Book>, RemoteFetchError> {
        tracing::debug!(id, "fetching catalog book");
        let response = self.get(&self.detail_url(id)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        let volume: Option<Volume> =
            serde_json::from_str(&body).map_err(|e| RemoteFetchError::Decode(e.to_string()))?;
        Ok(volume.map(Book::from))
    }
}

/// `GET /volumes` response; `items` is omitted when a page is empty
#[derive(Debug, Deserialize)]
struct VolumeList {
    items: Option<Vec<Volume>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Volume {
    id: String,
    #[serde(default)]
    volume_info: VolumeInfo,
    sale_info: Option<SaleInfo>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VolumeInfo {
    title: Option<String>,
    authors: Option<Vec<String>>,
    publisher: Option<String>,
    published_date: Option<String>,
    description: Option<String>,
    image_links: Option<ImageLinks>,
}

#[derive(Debug, Deserialize)]
struct ImageLinks {
    thumbnail: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaleInfo {
    buy_link: Option<String>,
}

impl From<Volume> for Book {
    fn from(volume: Volume) -> Self {
        let info = volume.volume_info;
        Book {
            id: volume.id,
            title: info.title.unwrap_or_default(),
            authors: info.authors.unwrap_or_default(),
            publisher: info.publisher,
            published_date: info.published_date,
            description: info.description,
            thumbnail: info.image_links.and_then(|links| links.thumbnail),
            buy_link: volume.sale_info.and_then(|sale| sale.buy_link),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GoogleBooksClient {
        GoogleBooksClient::new(
            "https://example.test/books/v1/",
            "k3y",
            Duration::from_secs(1),
        )
        .unwrap()
    }

    #[test]
    fn test_default_list_url() {
        assert_eq!(
            client().list_url(None, 40),
            "https://example.test/books/v1/volumes?q=books&orderBy=relevance&startIndex=40&maxResults=20&key=k3y"
        );
        assert_eq!(client().list_url(Some("  "), 0), client().list_url(None, 0));
    }

    #[test]
    fn test_search_url_encodes_term() {
        assert_eq!(
            client().list_url(Some("dune & co"), 0),
            "https://example.test/books/v1/volumes?q=dune%20%26%20co&orderBy=relevance&startIndex=0&maxResults=20&key=k3y"
        );
    }

    #[test]
    fn test_detail_url() {
        assert_eq!(
            client().detail_url("zyTCAlFPjgYC"),
            "https://example.test/books/v1/volumes/zyTCAlFPjgYC?key=k3y"
        );
    }

    #[test]
    fn test_volume_to_book() {
        let json = r#"{
            "id": "zyTCAlFPjgYC",
            "volumeInfo": {
                "title": "The Google Story",
                "authors": ["David A. Vise", "Mark Malseed"],
                "publisher": "Random House Digital, Inc.",
                "publishedDate": "2005-11-15",
                "description": "<p>Here is the story</p>",
                "imageLinks": { "thumbnail": "http://books.google.com/thumb" }
            },
            "saleInfo": { "buyLink": "https://play.google.com/store/books/details?id=zyTCAlFPjgYC" }
        }"#;
        let book = Book::from(serde_json::from_str::<Volume>(json).unwrap());

        assert_eq!(book.id, "zyTCAlFPjgYC");
        assert_eq!(book.title, "The Google Story");
        assert_eq!(book.authors.len(), 2);
        assert_eq!(book.published_date.as_deref(), Some("2005-11-15"));
        assert_eq!(book.thumbnail.as_deref(), Some("http://books.google.com/thumb"));
        assert!(book.buy_link.is_some());
    }

    #[test]
    fn test_sparse_volume() {
        let book = Book::from(serde_json::from_str::<Volume>(r#"{"id":"x"}"#).unwrap());
        assert_eq!(book.title, "");
        assert!(book.authors.is_empty());
        assert!(book.thumbnail.is_none());
        assert!(book.buy_link.is_none());
    }

    #[test]
    fn test_missing_items_is_empty_page() {
        let page: VolumeList =
            serde_json::from_str(r#"{"kind":"books#volumes","totalItems":0}"#).unwrap();
        assert!(page.items.is_none());
    }
}
