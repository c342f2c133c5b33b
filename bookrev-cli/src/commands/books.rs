//! Catalog listing, search and book detail commands

use super::{book_line, print_review, ReviewInfo};
use anyhow::{bail, Result};
use bookrev_core::{Book, Library, PageOutcome};
use serde::Serialize;

/// List the first `pages` pages of the catalog feed
pub async fn list(library: &Library, pages: u32, json: bool) -> Result<()> {
    for page in 0..pages {
        let outcome = if page == 0 {
            library.start().await
        } else {
            library.load_more().await
        };

        match outcome {
            PageOutcome::Appended(count) => {
                tracing::debug!("Page {} added {} books", page + 1, count)
            }
            PageOutcome::Failed(message) => bail!("Failed to load books: {}", message),
            _ => break,
        }
    }

    let feed = library.books();
    if json {
        println!("{}", serde_json::to_string_pretty(&feed)?);
    } else {
        for book in &feed.books {
            println!("{}", book_line(book));
        }
        if !feed.has_more {
            println!("(end of catalog)");
        }
    }

    Ok(())
}

/// Search the catalog
pub async fn search(library: &Library, query: &str, json: bool) -> Result<()> {
    if query.trim().is_empty() {
        bail!("Search term must not be blank");
    }

    let result = library.search(query).await;
    if let Some(error) = result.error {
        bail!("Search failed: {}", error);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&result.results)?);
    } else if result.results.is_empty() {
        println!("No books match \"{}\"", query.trim());
    } else {
        for book in &result.results {
            println!("{}", book_line(book));
        }
    }

    Ok(())
}

/// Book detail output
#[derive(Serialize)]
struct BookDetail {
    book: Book,
    favorite: bool,
    reviews: Vec<ReviewInfo>,
}

/// Show one book with its reviews
pub async fn show(library: &Library, id: &str, json: bool) -> Result<()> {
    let book = library.book_detail(id).await?;
    let reviews = library.reviews_for(id).await;
    let favorite = library.is_favorite(id).await;

    if json {
        let detail = BookDetail {
            book,
            favorite,
            reviews: reviews.iter().map(ReviewInfo::from).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&detail)?);
        return Ok(());
    }

    println!("Title:       {}", book.title);
    if let Some(authors) = book.authors_display() {
        println!("Authors:     {}", authors);
    }
    if let Some(publisher) = &book.publisher {
        println!("Publisher:   {}", publisher);
    }
    if let Some(date) = &book.published_date {
        println!("Published:   {}", date);
    }
    if let Some(link) = &book.buy_link {
        println!("Buy:         {}", link);
    }
    println!("Favorite:    {}", if favorite { "yes" } else { "no" });
    if let Some(desc) = &book.description {
        println!();
        println!("{}", desc);
    }

    println!();
    if reviews.is_empty() {
        println!("No reviews yet");
    }
    for review in &reviews {
        print_review(review);
    }

    Ok(())
}
