//! Favorite and my-page commands

use super::{book_line, print_review, ReviewInfo};
use anyhow::{Context, Result};
use bookrev_core::{Book, Library};
use serde::Serialize;

/// Mark a book as favorite
pub async fn favorite_add(library: &Library, book_id: &str) -> Result<()> {
    let changed = library
        .add_favorite(book_id)
        .await
        .context("Failed to save favorites")?;

    if changed {
        println!("Added {} to favorites", book_id);
    } else {
        println!("{} is already a favorite", book_id);
    }
    Ok(())
}

/// Unmark a favorite book
pub async fn favorite_remove(library: &Library, book_id: &str) -> Result<()> {
    let changed = library
        .remove_favorite(book_id)
        .await
        .context("Failed to save favorites")?;

    if changed {
        println!("Removed {} from favorites", book_id);
    } else {
        println!("{} was not a favorite", book_id);
    }
    Ok(())
}

/// List favorite book ids
pub async fn favorite_list(library: &Library, json: bool) -> Result<()> {
    let favorites = library.favorites().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&favorites)?);
    } else if favorites.is_empty() {
        println!("No favorites");
    } else {
        for id in &favorites {
            println!("{}", id);
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct MyPageReview {
    #[serde(flatten)]
    review: ReviewInfo,
    book: Option<Book>,
}

#[derive(Serialize)]
struct MyPageFavorite {
    book_id: String,
    book: Option<Book>,
}

#[derive(Serialize)]
struct MyPageInfo {
    reviews: Vec<MyPageReview>,
    favorites: Vec<MyPageFavorite>,
}

/// Reviews and favorites with their books resolved where possible
pub async fn mypage(library: &Library, json: bool) -> Result<()> {
    let page = library.my_page().await;

    if json {
        let info = MyPageInfo {
            reviews: page
                .reviews
                .iter()
                .map(|entry| MyPageReview {
                    review: ReviewInfo::from(&entry.review),
                    book: entry.book.clone(),
                })
                .collect(),
            favorites: page
                .favorites
                .into_iter()
                .map(|entry| MyPageFavorite {
                    book_id: entry.book_id,
                    book: entry.book,
                })
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("My reviews ({})", page.reviews.len());
    for entry in &page.reviews {
        if let Some(book) = &entry.book {
            println!("  {}", book.title);
        }
        print_review(&entry.review);
    }

    println!();
    println!("My favorites ({})", page.favorites.len());
    for entry in &page.favorites {
        match &entry.book {
            Some(book) => println!("{}", book_line(book)),
            None => println!("{:<16} (unavailable)", entry.book_id),
        }
    }

    Ok(())
}
