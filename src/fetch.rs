//! HTTP transport for homepage and article sub-page retrieval.
//!
//! The extractor only needs one operation from the network: turn a URL into
//! a page body. That operation lives behind the [`Fetch`] trait so tests can
//! substitute canned fixture pages for the live site.

use std::time::Duration;

use tracing::{debug, instrument};

use crate::error::Result;

/// Upper bound on any single request, connect and body included.
///
/// A hanging request would otherwise stall the whole run, since fetches are
/// performed one at a time.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("pravda_headlines/", env!("CARGO_PKG_VERSION"));

/// Trait for retrieving a page body by URL.
///
/// Implementors turn a URL into the page's decoded text content. The
/// production implementation is [`HttpFetcher`]; tests provide in-memory
/// fixtures.
pub trait Fetch {
    /// Retrieve the body of the page at `url`.
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute URL of the page to retrieve
    ///
    /// # Returns
    ///
    /// The decoded page body, or an error on network failure or a non-2xx
    /// status.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Live HTTP implementation of [`Fetch`] backed by a shared [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a fetcher with the crate's timeout and user agent applied.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let body = response.text().await?;
        debug!(bytes = body.len(), "Fetched page");
        Ok(body)
    }
}
