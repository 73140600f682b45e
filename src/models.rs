//! Data models for extracted headlines and their persisted form.
//!
//! This module defines the core data structures flowing through the pipeline:
//! - [`RawHeadline`]: one headline as it comes off the page walk, byline
//!   still an unparsed string
//! - [`AuthorName`]: a structured author credit split out of a byline
//! - [`NewsRecord`]: the assembled record handed to the store
//!
//! Records are built once per extracted headline, never mutated, and
//! consumed exactly once by persistence.

use serde::{Deserialize, Serialize};

use crate::byline;

/// A headline candidate produced by the extractor, before byline
/// normalization.
///
/// # Fields
///
/// * `title` - The headline text as read from the page
/// * `href` - The resolved link (absolute for in-site paths, verbatim for
///   links that were already absolute)
/// * `byline` - The raw credit line from the article sub-page, when the
///   link was eligible for a byline lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawHeadline {
    /// Headline text.
    pub title: String,
    /// Resolved article link.
    pub href: String,
    /// Raw byline text, e.g. `"Іван Франко — 12:00"`; `None` for links
    /// classified as absolute.
    pub byline: Option<String>,
}

/// One author credit parsed from a byline.
///
/// `last_name` is the empty string when the byline token was a single word
/// (editorial desks, mononyms). The store deduplicates authors on
/// `last_name` alone, so two people sharing a surname collapse into one
/// row; a known, accepted simplification of this dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuthorName {
    /// First (given) name, always present.
    pub first_name: String,
    /// Surname; empty for single-word bylines.
    pub last_name: String,
}

impl AuthorName {
    /// Build an author credit from name parts.
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }
}

/// A fully assembled news record, ready for persistence.
///
/// The store deduplicates on the `(title, href)` pair; `authors` drives the
/// `news_authors` association rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsRecord {
    /// Headline text.
    pub title: String,
    /// Canonical article link.
    pub href: String,
    /// Structured authors, in byline order. Empty when the headline had no
    /// byline lookup.
    pub authors: Vec<AuthorName>,
}

impl From<RawHeadline> for NewsRecord {
    /// Attach normalized authors to a raw headline. An absent byline means
    /// an empty author list, never an inherited one.
    fn from(raw: RawHeadline) -> Self {
        let authors = raw
            .byline
            .as_deref()
            .map(byline::normalize)
            .unwrap_or_default();
        Self {
            title: raw.title,
            href: raw.href,
            authors,
        }
    }
}
