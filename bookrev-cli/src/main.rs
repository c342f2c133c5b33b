//! Bookrev CLI - Command-line interface for browsing books and keeping reviews

mod commands;

use anyhow::{Context, Result};
use bookrev_core::{Config, Library};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Parse and validate the pages argument (must be at least 1)
fn parse_pages(s: &str) -> Result<u32, String> {
    let n: u32 = s.parse().map_err(|_| format!("'{}' is not a valid number", s))?;
    if n < 1 {
        Err("pages must be at least 1".to_string())
    } else {
        Ok(n)
    }
}

#[derive(Parser)]
#[command(name = "bookrev")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory holding reviews and favorites (overrides BOOKREV_STORAGE_PATH)
    #[arg(long, global = true)]
    storage: Option<PathBuf>,

    /// Catalog API key (overrides BOOKREV_API_KEY)
    #[arg(long, global = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List books from the catalog feed
    List {
        /// Number of pages to load
        #[arg(short, long, default_value = "1", value_parser = parse_pages)]
        pages: u32,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Search the catalog by title or author
    Search {
        /// Search term
        query: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a book with its reviews
    Show {
        /// Book id
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write, edit, delete or list reviews
    #[command(subcommand)]
    Review(ReviewCommand),

    /// Mark, unmark or list favorite books
    #[command(subcommand)]
    Favorite(FavoriteCommand),

    /// Show everything you reviewed or marked as favorite
    Mypage {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ReviewCommand {
    /// Write a review for a book
    Add {
        /// Book id
        book_id: String,

        #[arg(short, long)]
        title: String,

        #[arg(short, long)]
        content: String,

        /// Rating from 1 to 5
        #[arg(short, long)]
        rating: u8,

        /// Password required to edit or delete later (at most 8 characters)
        #[arg(short, long)]
        password: String,
    },

    /// Edit a review; fields not given keep their value
    Edit {
        /// Review id
        id: i64,

        #[arg(short, long)]
        password: String,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        content: Option<String>,

        #[arg(short, long)]
        rating: Option<u8>,
    },

    /// Delete a review
    Delete {
        /// Review id
        id: i64,

        #[arg(short, long)]
        password: String,
    },

    /// List reviews, optionally for one book
    List {
        /// Book id
        book_id: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum FavoriteCommand {
    /// Mark a book as favorite
    Add {
        /// Book id
        book_id: String,
    },

    /// Unmark a favorite book
    Remove {
        /// Book id
        book_id: String,
    },

    /// List favorite book ids
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        "bookrev_cli=debug,bookrev_core=debug"
    } else {
        "bookrev_cli=info"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = Config::from_env();
    if let Some(storage) = cli.storage {
        config.storage_path = storage;
    }
    if let Some(api_key) = cli.api_key {
        config.api_key = api_key;
    }
    tracing::debug!("Using storage at {}", config.storage_path.display());

    let library = Library::from_config(&config)
        .await
        .context("Failed to initialize library")?;

    match cli.command {
        Commands::List { pages, json } => commands::list(&library, pages, json).await,

        Commands::Search { query, json } => commands::search(&library, &query, json).await,

        Commands::Show { id, json } => commands::show(&library, &id, json).await,

        Commands::Review(ReviewCommand::Add {
            book_id,
            title,
            content,
            rating,
            password,
        }) => commands::review_add(&library, &book_id, title, content, rating, password).await,

        Commands::Review(ReviewCommand::Edit {
            id,
            password,
            title,
            content,
            rating,
        }) => commands::review_edit(&library, id, &password, title, content, rating).await,

        Commands::Review(ReviewCommand::Delete { id, password }) => {
            commands::review_delete(&library, id, &password).await
        }

        Commands::Review(ReviewCommand::List { book_id, json }) => {
            commands::review_list(&library, book_id.as_deref(), json).await
        }

        Commands::Favorite(FavoriteCommand::Add { book_id }) => {
            commands::favorite_add(&library, &book_id).await
        }

        Commands::Favorite(FavoriteCommand::Remove { book_id }) => {
            commands::favorite_remove(&library, &book_id).await
        }

        Commands::Favorite(FavoriteCommand::List { json }) => {
            commands::favorite_list(&library, json).await
        }

        Commands::Mypage { json } => commands::mypage(&library, json).await,
    }
}
