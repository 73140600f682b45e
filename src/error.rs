//! Error types shared across the pipeline.
//!
//! Every failure aborts the run: nothing is caught and retried locally.
//! The variants mirror the places a run can die: startup configuration,
//! talking to the site, reading a page that no longer matches the
//! template, and writing to the database.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Any failure the ingestion run can produce.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// A required environment variable is not set.
    #[error("missing required environment variable {0}")]
    MissingEnv(&'static str),

    /// An environment variable is set but unusable (e.g. a non-numeric port).
    #[error("invalid value for {name}: {value:?}")]
    InvalidEnv { name: &'static str, value: String },

    /// Transport failure: unreachable host, request timeout, or a non-2xx
    /// status from the site.
    #[error("page fetch failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A page element the site template is expected to carry was absent.
    /// Almost always means the markup drifted out from under the selectors.
    #[error("expected element missing: {what} ({context})")]
    MissingElement {
        what: &'static str,
        context: String,
    },

    /// Database failure: connection loss or a constraint violation not
    /// covered by an explicit conflict-ignore clause.
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

impl ScrapeError {
    /// Shorthand for the template-drift case.
    pub fn missing(what: &'static str, context: impl Into<String>) -> Self {
        ScrapeError::MissingElement {
            what,
            context: context.into(),
        }
    }
}
