//! Visitor reviews and the input that creates or edits them

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

/// Longest password a review may carry, in UTF-16 code units
pub const MAX_PASSWORD_LEN: usize = 8;

/// Highest star rating
pub const MAX_RATING: u8 = 5;

/// A stored review.
///
/// The password is a plaintext shared secret that gates edit and delete. It is
/// not authentication and is never hashed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Creation timestamp in milliseconds, doubles as the identifier
    pub id: i64,

    /// Catalog id of the reviewed book (not enforced)
    pub book_id: String,

    pub title: String,

    pub content: String,

    /// 1..=5, 0 means unset
    pub rating: u8,

    pub password: String,
}

impl Review {
    /// Build a review from validated input
    pub fn from_draft(id: i64, book_id: impl Into<String>, draft: ReviewDraft) -> Self {
        Self {
            id,
            book_id: book_id.into(),
            title: draft.title,
            content: draft.content,
            rating: draft.rating,
            password: draft.password,
        }
    }

    /// Plaintext comparison against the stored password
    pub fn password_matches(&self, candidate: &str) -> bool {
        self.password == candidate
    }
}

/// Review form input for a new review
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ReviewDraft {
    pub title: String,
    pub content: String,
    pub rating: u8,
    pub password: String,
}

impl ReviewDraft {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        rating: u8,
        password: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            rating,
            password: password.into(),
        }
    }

    /// Every field is required and the rating must be set
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("title", &self.title)?;
        require("content", &self.content)?;
        require("password", &self.password)?;
        validate_rating(self.rating)?;
        if self.password.encode_utf16().count() > MAX_PASSWORD_LEN {
            return Err(ValidationError::PasswordTooLong {
                max: MAX_PASSWORD_LEN,
            });
        }
        Ok(())
    }
}

/// Replacement values for an existing review's mutable fields
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ReviewEdit {
    pub title: String,
    pub content: String,
    pub rating: u8,
}

impl ReviewEdit {
    pub fn new(title: impl Into<String>, content: impl Into<String>, rating: u8) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            rating,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require("title", &self.title)?;
        require("content", &self.content)?;
        validate_rating(self.rating)
    }
}

fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(())
    }
}

fn validate_rating(rating: u8) -> Result<(), ValidationError> {
    if (1..=MAX_RATING).contains(&rating) {
        Ok(())
    } else {
        Err(ValidationError::InvalidRating(rating))
    }
}
