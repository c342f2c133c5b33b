//! CLI command implementations

mod books;
mod favorites;
mod reviews;

pub use books::{list, search, show};
pub use favorites::{favorite_add, favorite_list, favorite_remove, mypage};
pub use reviews::{review_add, review_delete, review_edit, review_list};

use bookrev_core::{Book, Review};
use serde::Serialize;

/// Review output, without the password
#[derive(Serialize)]
struct ReviewInfo {
    id: i64,
    book_id: String,
    title: String,
    content: String,
    rating: u8,
}

impl From<&Review> for ReviewInfo {
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

/// One-line book summary: id, title and authors
fn book_line(book: &Book) -> String {
    match book.authors_display() {
        Some(authors) => format!("{:<16} {} ({})", book.id, book.title, authors),
        None => format!("{:<16} {}", book.id, book.title),
    }
}

fn stars(rating: u8) -> String {
    let filled = usize::from(rating.min(bookrev_core::types::MAX_RATING));
    format!(
        "{}{}",
        "*".repeat(filled),
        "-".repeat(usize::from(bookrev_core::types::MAX_RATING) - filled)
    )
}

fn print_review(review: &Review) {
    println!(
        "#{} [{}] {} (book {})",
        review.id,
        stars(review.rating),
        review.title,
        review.book_id
    );
    println!("    {}", review.content);
}
