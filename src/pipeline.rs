//! Run orchestration: fetch the homepage, extract records, persist them.
//!
//! A run is one pass over the live site. Extraction happens first and
//! entirely outside the database; persistence then opens a single
//! transaction scope, pre-registers authors, writes the batch, and
//! commits. A failure anywhere aborts the run, and a failure inside the
//! persistence scope rolls back every write the run made.

use itertools::Itertools;
use tracing::{info, instrument};

use crate::config::DbConfig;
use crate::error::Result;
use crate::extract::{BASE_URL, Extractor};
use crate::fetch::{Fetch, HttpFetcher};
use crate::models::NewsRecord;
use crate::page::Page;
use crate::store::{PersistOutcome, Store};

/// What one completed run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    /// Headlines extracted from the homepage.
    pub extracted: usize,
    /// Rows actually written, ignored conflicts excluded.
    pub outcome: PersistOutcome,
}

/// Persist a batch of records inside one transaction scope.
///
/// Ensures the schema, pre-registers every distinct author so id
/// resolution cannot miss one, persists the batch, and commits. Any error
/// before the commit drops the transaction, rolling back everything this
/// call wrote.
///
/// The returned outcome folds author rows created by the pre-registration
/// pass into `authors_inserted`.
#[instrument(level = "info", skip_all, fields(records = records.len()))]
pub async fn persist_records(store: &Store, records: &[NewsRecord]) -> Result<PersistOutcome> {
    let mut tx = store.begin().await?;
    tx.ensure_schema().await?;

    let mut pre_registered = 0u64;
    for author in records.iter().flat_map(|r| r.authors.iter()).unique() {
        if tx.ensure_author(author).await? {
            pre_registered += 1;
        }
    }

    let mut outcome = tx.persist(records).await?;
    tx.commit().await?;

    outcome.authors_inserted += pre_registered;
    info!(
        news = outcome.news_inserted,
        authors = outcome.authors_inserted,
        links = outcome.links_inserted,
        "Committed run"
    );
    Ok(outcome)
}

/// Execute one full ingestion run against the live site.
#[instrument(level = "info", skip_all)]
pub async fn run(config: &DbConfig) -> Result<RunReport> {
    let fetcher = HttpFetcher::new()?;
    let homepage = fetcher.fetch(BASE_URL).await?;
    let page = Page::parse(&homepage);

    let extractor = Extractor::new(BASE_URL, fetcher);
    let records = extractor.extract(page).await?;

    let store = Store::connect(config).await?;
    let outcome = persist_records(&store, &records).await?;

    Ok(RunReport {
        extracted: records.len(),
        outcome,
    })
}
