//! Catalog book as seen by the rest of the application

use serde::{Deserialize, Serialize};

/// A book fetched from the remote catalog.
///
/// Books are read-only: nothing in the application mutates one after it has
/// been decoded, and they are only cached for the lifetime of the process.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Book {
    /// Catalog identifier, stable across fetches
    pub id: String,

    /// Display title
    pub title: String,

    /// Authors in catalog order (may be empty)
    #[serde(default)]
    pub authors: Vec<String>,

    /// Publisher name
    pub publisher: Option<String>,

    /// Loosely formatted publication date ("2004", "2004-05", "2004-05-01")
    pub published_date: Option<String>,

    /// Description, may contain HTML markup
    pub description: Option<String>,

    /// Cover image URL
    pub thumbnail: Option<String>,

    /// Purchase link
    pub buy_link: Option<String>,
}

impl Book {
    /// Create a book with the required fields
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            authors: Vec::new(),
            publisher: None,
            published_date: None,
            description: None,
            thumbnail: None,
            buy_link: None,
        }
    }

    /// Add an author
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.authors.push(author.into());
        self
    }

    /// Set publisher
    pub fn with_publisher(mut self, publisher: impl Into<String>) -> Self {
        self.publisher = Some(publisher.into());
        self
    }

    /// Authors joined for display, `None` when the catalog lists none
    pub fn authors_display(&self) -> Option<String> {
        if self.authors.is_empty() {
            None
        } else {
            Some(self.authors.join(", "))
        }
    }
}
