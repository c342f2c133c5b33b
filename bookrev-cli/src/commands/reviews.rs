//! Review commands

use super::{print_review, ReviewInfo};
use anyhow::{Context, Result};
use bookrev_core::{Library, ReviewDraft, ReviewEdit};

/// Write a review for a book
pub async fn review_add(
    library: &Library,
    book_id: &str,
    title: String,
    content: String,
    rating: u8,
    password: String,
) -> Result<()> {
    let draft = ReviewDraft::new(title, content, rating, password);
    let review = library
        .submit_review(book_id, draft)
        .await
        .with_context(|| format!("Failed to save review for {}", book_id))?;

    println!("Saved review #{}", review.id);
    Ok(())
}

/// Edit a review, keeping the fields that were not given
pub async fn review_edit(
    library: &Library,
    id: i64,
    password: &str,
    title: Option<String>,
    content: Option<String>,
    rating: Option<u8>,
) -> Result<()> {
    let current = library
        .reviews()
        .await
        .into_iter()
        .find(|review| review.id == id)
        .with_context(|| format!("Review {} not found", id))?;

    let edit = ReviewEdit::new(
        title.unwrap_or(current.title),
        content.unwrap_or(current.content),
        rating.unwrap_or(current.rating),
    );
    let review = library
        .edit_review(id, password, edit)
        .await
        .with_context(|| format!("Failed to edit review {}", id))?;

    println!("Updated review #{}", review.id);
    Ok(())
}

/// Delete a review
pub async fn review_delete(library: &Library, id: i64, password: &str) -> Result<()> {
    library
        .delete_review(id, password)
        .await
        .with_context(|| format!("Failed to delete review {}", id))?;

    println!("Deleted review #{}", id);
    Ok(())
}

/// List reviews, all of them or those of one book
pub async fn review_list(library: &Library, book_id: Option<&str>, json: bool) -> Result<()> {
    let reviews = match book_id {
        Some(book_id) => library.reviews_for(book_id).await,
        None => library.reviews().await,
    };

    if json {
        let out: Vec<ReviewInfo> = reviews.iter().map(ReviewInfo::from).collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if reviews.is_empty() {
        println!("No reviews");
    } else {
        for review in &reviews {
            print_review(review);
        }
    }

    Ok(())
}
