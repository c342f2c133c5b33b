//! Core domain types

mod book;
mod review;

pub use book::Book;
pub use review::{Review, ReviewDraft, ReviewEdit, MAX_PASSWORD_LEN, MAX_RATING};
