//! # Pravda Headlines
//!
//! A single-run ingestion pipeline that scrapes the Ukrainska Pravda
//! homepage, extracts headline records (title, link, byline authors), and
//! persists them into PostgreSQL with deduplication on `(title, href)` and
//! on author surname, plus a many-to-many news/author association.
//!
//! ## Architecture
//!
//! One run moves data through three stages, strictly in order:
//! 1. **Fetch**: download the homepage, then each article sub-page whose
//!    link calls for a byline lookup, one at a time
//! 2. **Extract**: walk the parsed tree for the lead headline, the trending
//!    links, and the main article list; classify links by prefix and
//!    normalize credit lines into structured author names
//! 3. **Persist**: upsert news, authors, and association rows inside a
//!    single transaction that commits or rolls back as a unit
//!
//! ## Usage
//!
//! ```sh
//! DB_HOST=localhost DB_NAME=news DB_USER=news \
//! DB_PASSWORD=secret DB_PORT=5432 pravda_headlines
//! ```

pub mod byline;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod models;
pub mod page;
pub mod pipeline;
pub mod store;

pub use error::{Result, ScrapeError};
