//! Relational persistence for extracted headlines.
//!
//! Three tables hold the data: `news` (unique on `(title, href)`),
//! `authors` (unique on surname alone), and the `news_authors` association
//! table joining the two. Every write of a run happens inside one
//! transaction opened by [`Store::begin`]: commit lands the whole batch,
//! and an error propagating out of the run drops the handle and rolls all
//! of it back.
//!
//! Inserts use conflict-ignore upserts throughout, so re-running against an
//! overlapping batch never duplicates a row in any table.

use std::collections::HashMap;

use itertools::Itertools;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, info, instrument};

use crate::config::DbConfig;
use crate::error::Result;
use crate::models::{AuthorName, NewsRecord};

const CREATE_NEWS: &str = r#"
CREATE TABLE IF NOT EXISTS news (
    id SERIAL PRIMARY KEY,
    title VARCHAR(500) NOT NULL,
    href VARCHAR(500) NOT NULL,
    UNIQUE(title, href)
)
"#;

// Surname alone is the identity key. Distinct authors sharing a surname
// collapse into one row; see AuthorName.
const CREATE_AUTHORS: &str = r#"
CREATE TABLE IF NOT EXISTS authors (
    id SERIAL PRIMARY KEY,
    author_name VARCHAR(255) NOT NULL,
    author_last_name VARCHAR(255) NOT NULL UNIQUE
)
"#;

const CREATE_NEWS_AUTHORS: &str = r#"
CREATE TABLE IF NOT EXISTS news_authors (
    news_id INTEGER NOT NULL REFERENCES news(id) ON DELETE CASCADE,
    author_id INTEGER NOT NULL REFERENCES authors(id) ON DELETE CASCADE,
    PRIMARY KEY (news_id, author_id)
)
"#;

/// Handle to the database, owning the run's connection pool.
#[derive(Debug, Clone)]
pub struct Store {
    pool: PgPool,
}

impl Store {
    /// Connect using the given configuration.
    ///
    /// The pool is capped at one connection: the run is strictly
    /// sequential and all of its writes share one transaction.
    #[instrument(level = "info", skip_all, fields(host = %config.host, dbname = %config.dbname))]
    pub async fn connect(config: &DbConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect(&config.connection_string())
            .await?;
        info!("Connected to database");
        Ok(Self { pool })
    }

    /// Wrap an existing pool. Used by tests that manage their own pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open the run's transaction scope.
    ///
    /// Writes made through the returned handle become durable only via
    /// [`StoreTx::commit`]; dropping the handle instead rolls them back.
    pub async fn begin(&self) -> Result<StoreTx> {
        let tx = self.pool.begin().await?;
        Ok(StoreTx { tx })
    }
}

/// A transaction-scoped view of the store.
///
/// All persistence operations live here so they cannot run outside a
/// transaction by accident.
pub struct StoreTx {
    tx: Transaction<'static, Postgres>,
}

/// Row counts from one [`StoreTx::persist`] call.
///
/// Conflict-ignored upserts do not count, so a second run over the same
/// records reports zeros across the board.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PersistOutcome {
    pub news_inserted: u64,
    pub authors_inserted: u64,
    pub links_inserted: u64,
}

impl StoreTx {
    /// Create the three tables when absent. Idempotent; called every run.
    #[instrument(level = "info", skip_all)]
    pub async fn ensure_schema(&mut self) -> Result<()> {
        for ddl in [CREATE_NEWS, CREATE_AUTHORS, CREATE_NEWS_AUTHORS] {
            sqlx::query(ddl).execute(&mut *self.tx).await?;
        }
        debug!("Schema ensured");
        Ok(())
    }

    /// Drop the three tables, association table first so no foreign key
    /// dangles mid-drop. Administrative teardown, not part of normal runs.
    pub async fn drop_schema(&mut self) -> Result<()> {
        for ddl in [
            "DROP TABLE IF EXISTS news_authors",
            "DROP TABLE IF EXISTS news",
            "DROP TABLE IF EXISTS authors",
        ] {
            sqlx::query(ddl).execute(&mut *self.tx).await?;
        }
        Ok(())
    }

    /// Register one author unless a row with the same name pair exists.
    ///
    /// Run as a pre-pass over every distinct author before [`persist`]
    /// (see [`crate::pipeline`]), so that id resolution finds each author
    /// even when the surname-unique constraint swallowed its insert.
    ///
    /// # Returns
    ///
    /// `true` when a new row was actually inserted.
    ///
    /// [`persist`]: Self::persist
    pub async fn ensure_author(&mut self, author: &AuthorName) -> Result<bool> {
        let existing: Option<i32> = sqlx::query_scalar(
            "SELECT id FROM authors WHERE author_name = $1 AND author_last_name = $2",
        )
        .bind(&author.first_name)
        .bind(&author.last_name)
        .fetch_optional(&mut *self.tx)
        .await?;

        if existing.is_some() {
            return Ok(false);
        }
        let result = sqlx::query(
            "INSERT INTO authors (author_name, author_last_name) VALUES ($1, $2) \
             ON CONFLICT (author_last_name) DO NOTHING",
        )
        .bind(&author.first_name)
        .bind(&author.last_name)
        .execute(&mut *self.tx)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Write a batch of records.
    ///
    /// Distinct authors and distinct `(title, href)` pairs are upserted
    /// with conflicts ignored, the `authors` and `news` tables are
    /// re-selected to resolve ids, and one association row is written per
    /// (record, author) pair whose ids both resolve. A pair that does not
    /// resolve is skipped rather than failing the batch.
    #[instrument(level = "info", skip_all, fields(records = records.len()))]
    pub async fn persist(&mut self, records: &[NewsRecord]) -> Result<PersistOutcome> {
        let mut outcome = PersistOutcome::default();

        let authors: Vec<&AuthorName> = records
            .iter()
            .flat_map(|record| record.authors.iter())
            .unique()
            .collect();
        for author in authors {
            let result = sqlx::query(
                "INSERT INTO authors (author_name, author_last_name) VALUES ($1, $2) \
                 ON CONFLICT (author_last_name) DO NOTHING",
            )
            .bind(&author.first_name)
            .bind(&author.last_name)
            .execute(&mut *self.tx)
            .await?;
            outcome.authors_inserted += result.rows_affected();
        }

        for record in records.iter().unique_by(|r| (&r.title, &r.href)) {
            let result = sqlx::query(
                "INSERT INTO news (title, href) VALUES ($1, $2) \
                 ON CONFLICT (title, href) DO NOTHING",
            )
            .bind(&record.title)
            .bind(&record.href)
            .execute(&mut *self.tx)
            .await?;
            outcome.news_inserted += result.rows_affected();
        }

        let author_ids = self.author_ids().await?;
        let news_ids = self.news_ids().await?;

        for record in records {
            let key = (record.title.clone(), record.href.clone());
            let news_id = match news_ids.get(&key) {
                Some(id) => *id,
                None => {
                    debug!(title = %record.title, "News id did not resolve; skipping its links");
                    continue;
                }
            };
            for author in &record.authors {
                let author_id = match author_ids.get(&author.last_name) {
                    Some(id) => *id,
                    None => {
                        debug!(
                            last_name = %author.last_name,
                            "Author id did not resolve; skipping link"
                        );
                        continue;
                    }
                };
                let result = sqlx::query(
                    "INSERT INTO news_authors (news_id, author_id) VALUES ($1, $2) \
                     ON CONFLICT (news_id, author_id) DO NOTHING",
                )
                .bind(news_id)
                .bind(author_id)
                .execute(&mut *self.tx)
                .await?;
                outcome.links_inserted += result.rows_affected();
            }
        }

        info!(
            news = outcome.news_inserted,
            authors = outcome.authors_inserted,
            links = outcome.links_inserted,
            "Persisted batch"
        );
        Ok(outcome)
    }

    /// Surname-to-id map over the whole `authors` table as this
    /// transaction sees it. Surname is the identity key, so first names
    /// play no part in resolution.
    async fn author_ids(&mut self) -> Result<HashMap<String, i32>> {
        let rows: Vec<(i32, String)> = sqlx::query_as("SELECT id, author_last_name FROM authors")
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(rows.into_iter().map(|(id, last)| (last, id)).collect())
    }

    /// `(title, href)`-to-id map over the whole `news` table.
    async fn news_ids(&mut self) -> Result<HashMap<(String, String), i32>> {
        let rows: Vec<(i32, String, String)> = sqlx::query_as("SELECT id, title, href FROM news")
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(id, title, href)| ((title, href), id))
            .collect())
    }

    /// Commit every write made through this handle.
    pub async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
