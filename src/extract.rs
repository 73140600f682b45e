//! Ukrainska Pravda homepage extraction.
//!
//! This module walks the parsed homepage and turns it into an ordered list
//! of [`NewsRecord`]s. Three regions are read, in this order:
//!
//! 1. the lead headline (first `.article_header` block in the document),
//! 2. the trending links (`.article_footer`, one item per anchor),
//! 3. the main article list (`.article_header` blocks inside `.main_content`).
//!
//! Every item's href is classified by literal prefix. Site-relative links
//! (including `/columns` paths) are resolved against the base URL and their
//! article sub-page is fetched for its credit line; links already absolute
//! are stored verbatim and never fetched.

use futures::{StreamExt, TryStreamExt, stream};
use tracing::{debug, info, instrument};

use crate::error::{Result, ScrapeError};
use crate::fetch::Fetch;
use crate::models::{NewsRecord, RawHeadline};
use crate::page::Page;

/// Homepage of the scraped site.
///
/// Relative hrefs are resolved against it by plain concatenation; the site
/// emits them with a leading slash.
pub const BASE_URL: &str = "https://www.pravda.com.ua";

/// Class carried by the lead headline block and by every headline block in
/// the main list.
const HEADLINE_CLASS: &str = "article_header";
/// Class of the trending links container.
const TRENDING_CLASS: &str = "article_footer";
/// Class of the main article list container.
const MAIN_CLASS: &str = "main_content";
/// Class of the credit line element on article sub-pages.
const POST_TIME_CLASS: &str = "post_time";
/// Inline annotations inside main-list headlines. Stripped before titles
/// are read so markers like `ВІДЕО` do not leak into the title string.
/// Scoped to the main list: the lead title keeps its annotations.
const ANNOTATION_SELECTOR: &str = ".main_content .article_header em";

/// How a headline's href relates to the site, decided by literal prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    /// Starts with `http` or `www`: already absolute, points at a partner
    /// site or a different article template. Stored verbatim, never
    /// byline-fetched.
    Absolute,
    /// Starts with `/columns`: a columnist path. Recognized separately but
    /// byline-fetched exactly like any other relative path.
    Columnist,
    /// Any other path, taken to be site-relative.
    Relative,
}

impl LinkKind {
    /// Classify an href as it appears in the markup.
    pub fn classify(href: &str) -> Self {
        if href.starts_with("http") || href.starts_with("www") {
            LinkKind::Absolute
        } else if href.starts_with("/columns") {
            LinkKind::Columnist
        } else {
            LinkKind::Relative
        }
    }

    /// Whether an item with this link gets its sub-page fetched for a byline.
    pub fn wants_byline(self) -> bool {
        matches!(self, LinkKind::Columnist | LinkKind::Relative)
    }
}

/// One headline as it appears on the homepage, before link resolution.
#[derive(Debug)]
struct Candidate {
    title: String,
    href: String,
    section: &'static str,
}

/// Walks a homepage tree and resolves each headline into a [`NewsRecord`].
#[derive(Debug)]
pub struct Extractor<F> {
    base_url: String,
    fetcher: F,
}

impl<F> Extractor<F>
where
    F: Fetch,
{
    /// Create an extractor resolving relative links against `base_url`.
    pub fn new(base_url: impl Into<String>, fetcher: F) -> Self {
        Self {
            base_url: base_url.into(),
            fetcher,
        }
    }

    /// Extract every headline from a parsed homepage.
    ///
    /// Items come back in extraction order: lead headline, trending links
    /// in document order, then main-list items in document order. Sub-pages
    /// are fetched one at a time, in that same order. The first missing
    /// required element or failed fetch aborts the whole extraction.
    ///
    /// # Arguments
    ///
    /// * `page` - The parsed homepage; consumed because annotation nodes
    ///   are stripped out of it along the way
    ///
    /// # Returns
    ///
    /// The ordered records, or the error that ended the run.
    #[instrument(level = "info", skip_all)]
    pub async fn extract(&self, page: Page) -> Result<Vec<NewsRecord>> {
        let candidates = collect_candidates(page)?;
        let records: Vec<NewsRecord> = stream::iter(candidates)
            .then(|candidate| self.resolve(candidate))
            .try_collect()
            .await?;
        info!(count = records.len(), "Extracted homepage records");
        Ok(records)
    }

    /// Resolve one candidate: classify its link, fetch the byline when the
    /// classification calls for it, and assemble the record.
    async fn resolve(&self, candidate: Candidate) -> Result<NewsRecord> {
        let Candidate {
            title,
            href,
            section,
        } = candidate;

        let kind = LinkKind::classify(&href);
        let (href, byline) = if kind.wants_byline() {
            let full = format!("{}{}", self.base_url, href);
            let byline = self.fetch_byline(&full).await?;
            (full, Some(byline))
        } else {
            // Absolute links point outside the known template; there is no
            // credit line to read, so the record carries no authors.
            (href, None)
        };

        info!(section, %title, %href, "Resolved headline");
        Ok(NewsRecord::from(RawHeadline {
            title,
            href,
            byline,
        }))
    }

    /// Fetch an article sub-page and read its credit line text.
    async fn fetch_byline(&self, url: &str) -> Result<String> {
        let body = self.fetcher.fetch(url).await?;
        let page = Page::parse(&body);
        let post_time = page
            .find_by_class(POST_TIME_CLASS)
            .ok_or_else(|| ScrapeError::missing("post time element", url))?;
        let byline = post_time.text();
        debug!(%byline, "Read article credit line");
        Ok(byline)
    }
}

/// Collect every headline candidate from the homepage, in extraction order.
///
/// Titles keep the exact text the markup carries. The lead title is the
/// whole block's text; trending and main-list titles are their anchor's
/// text. A missing container, anchor, or href aborts with an extraction
/// error rather than skipping the item.
fn collect_candidates(mut page: Page) -> Result<Vec<Candidate>> {
    let mut candidates = Vec::new();

    let lead = page
        .find_by_class(HEADLINE_CLASS)
        .ok_or_else(|| ScrapeError::missing("lead headline block", "homepage"))?;
    let lead_href = lead
        .first_anchor()
        .ok_or_else(|| ScrapeError::missing("lead headline anchor", "homepage"))?
        .attr("href")
        .ok_or_else(|| ScrapeError::missing("lead headline href", "homepage"))?;
    candidates.push(Candidate {
        title: lead.text(),
        href: lead_href.to_string(),
        section: "lead",
    });

    let trending = page
        .find_by_class(TRENDING_CLASS)
        .ok_or_else(|| ScrapeError::missing("trending links container", "homepage"))?;
    for anchor in trending.anchors() {
        let href = anchor
            .attr("href")
            .ok_or_else(|| ScrapeError::missing("trending anchor href", "homepage"))?;
        candidates.push(Candidate {
            title: anchor.text(),
            href: href.to_string(),
            section: "trending",
        });
    }

    // Main-list titles are read after annotation nodes are detached, so the
    // strip must sit between the trending pass and the main pass.
    page.strip_all(ANNOTATION_SELECTOR);

    let main = page
        .find_by_class(MAIN_CLASS)
        .ok_or_else(|| ScrapeError::missing("main content container", "homepage"))?;
    for block in main.all_by_class(HEADLINE_CLASS) {
        let anchor = block
            .first_anchor()
            .ok_or_else(|| ScrapeError::missing("main-list headline anchor", "homepage"))?;
        let href = anchor
            .attr("href")
            .ok_or_else(|| ScrapeError::missing("main-list headline href", "homepage"))?;
        candidates.push(Candidate {
            title: anchor.text(),
            href: href.to_string(),
            section: "main",
        });
    }

    debug!(count = candidates.len(), "Collected headline candidates");
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use super::*;
    use crate::models::AuthorName;

    const FIXTURE_BASE: &str = "https://fixture.test";

    /// In-memory [`Fetch`] that serves canned pages and records every URL
    /// asked of it. Panics on URLs it has no page for, which is how the
    /// never-fetch-absolute-links rule is enforced.
    struct FixtureFetcher {
        pages: HashMap<String, String>,
        calls: RefCell<Vec<String>>,
    }

    impl FixtureFetcher {
        fn new(pages: &[(&str, &str)]) -> Self {
            Self {
                pages: pages
                    .iter()
                    .map(|(url, body)| (url.to_string(), body.to_string()))
                    .collect(),
                calls: RefCell::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    impl Fetch for FixtureFetcher {
        async fn fetch(&self, url: &str) -> Result<String> {
            self.calls.borrow_mut().push(url.to_string());
            match self.pages.get(url) {
                Some(body) => Ok(body.clone()),
                None => panic!("fetch of a URL with no fixture: {url}"),
            }
        }
    }

    fn article(byline: &str) -> String {
        format!("<html><body><div class=\"post_time\">{byline}</div></body></html>")
    }

    const HOMEPAGE: &str = concat!(
        "<html><body>",
        "<div class=\"article_header\"><a href=\"/news/lead\">Головна новина</a></div>",
        "<div class=\"article_footer\">",
        "<a href=\"/news/trend\">Трендова</a>",
        "<a href=\"http://other.example/wire\">Зовнішня</a>",
        "</div>",
        "<div class=\"main_content\">",
        "<div class=\"article_header\"><a href=\"/news/m1\">Перша <em>ВІДЕО</em></a></div>",
        "<div class=\"article_header\"><a href=\"/columns/op1\">Колонка</a></div>",
        "<div class=\"article_header\"><a href=\"www.partner.example/x\">Партнер</a></div>",
        "</div>",
        "</body></html>",
    );

    fn full_fixture() -> FixtureFetcher {
        let lead = article("Іван Петренко — 10:00");
        let trend = article("Олена Коваль — 11:30");
        let m1 = article("Іван Петренко — 10:00");
        let op1 = article("Тарас Думка — 12:00");
        FixtureFetcher::new(&[
            ("https://fixture.test/news/lead", lead.as_str()),
            ("https://fixture.test/news/trend", trend.as_str()),
            ("https://fixture.test/news/m1", m1.as_str()),
            ("https://fixture.test/columns/op1", op1.as_str()),
        ])
    }

    #[test]
    fn test_classify_prefixes() {
        assert_eq!(LinkKind::classify("http://example.com/a"), LinkKind::Absolute);
        assert_eq!(LinkKind::classify("https://example.com/a"), LinkKind::Absolute);
        assert_eq!(LinkKind::classify("www.example.com/a"), LinkKind::Absolute);
        assert_eq!(LinkKind::classify("/columns/2026/piece"), LinkKind::Columnist);
        assert_eq!(LinkKind::classify("/news/2026/item"), LinkKind::Relative);
        // No leading slash means the prefix test does not fire.
        assert_eq!(LinkKind::classify("columns/piece"), LinkKind::Relative);
    }

    #[test]
    fn test_wants_byline_per_kind() {
        assert!(!LinkKind::Absolute.wants_byline());
        assert!(LinkKind::Columnist.wants_byline());
        assert!(LinkKind::Relative.wants_byline());
    }

    #[tokio::test]
    async fn test_extract_orders_and_resolves_all_sections() {
        let fetcher = full_fixture();
        let extractor = Extractor::new(FIXTURE_BASE, fetcher);
        let records = extractor.extract(Page::parse(HOMEPAGE)).await.unwrap();

        let petrenko = vec![AuthorName::new("Іван", "Петренко")];
        assert_eq!(
            records,
            vec![
                NewsRecord {
                    title: "Головна новина".to_string(),
                    href: "https://fixture.test/news/lead".to_string(),
                    authors: petrenko.clone(),
                },
                NewsRecord {
                    title: "Трендова".to_string(),
                    href: "https://fixture.test/news/trend".to_string(),
                    authors: vec![AuthorName::new("Олена", "Коваль")],
                },
                NewsRecord {
                    title: "Зовнішня".to_string(),
                    href: "http://other.example/wire".to_string(),
                    authors: vec![],
                },
                NewsRecord {
                    title: "Перша ".to_string(),
                    href: "https://fixture.test/news/m1".to_string(),
                    authors: petrenko,
                },
                NewsRecord {
                    title: "Колонка".to_string(),
                    href: "https://fixture.test/columns/op1".to_string(),
                    authors: vec![AuthorName::new("Тарас", "Думка")],
                },
                NewsRecord {
                    title: "Партнер".to_string(),
                    href: "www.partner.example/x".to_string(),
                    authors: vec![],
                },
            ],
        );
    }

    #[tokio::test]
    async fn test_sub_pages_fetched_sequentially_in_extraction_order() {
        let fetcher = full_fixture();
        let extractor = Extractor::new(FIXTURE_BASE, fetcher);
        extractor.extract(Page::parse(HOMEPAGE)).await.unwrap();
        assert_eq!(
            extractor.fetcher.calls(),
            vec![
                "https://fixture.test/news/lead",
                "https://fixture.test/news/trend",
                "https://fixture.test/news/m1",
                "https://fixture.test/columns/op1",
            ],
        );
    }

    #[tokio::test]
    async fn test_absolute_links_kept_verbatim_and_never_fetched() {
        // The fixture carries no page for the absolute hrefs, so any fetch
        // of them would panic inside FixtureFetcher.
        let fetcher = full_fixture();
        let extractor = Extractor::new(FIXTURE_BASE, fetcher);
        let records = extractor.extract(Page::parse(HOMEPAGE)).await.unwrap();

        let external: Vec<_> = records
            .iter()
            .filter(|r| !LinkKind::classify(&r.href).wants_byline())
            .collect();
        assert_eq!(external.len(), 2);
        assert_eq!(external[0].href, "http://other.example/wire");
        assert_eq!(external[1].href, "www.partner.example/x");
        assert!(external.iter().all(|r| r.authors.is_empty()));
    }

    #[tokio::test]
    async fn test_lead_title_keeps_annotations_main_titles_do_not() {
        let homepage = concat!(
            "<html><body>",
            "<div class=\"article_header\"><a href=\"/news/lead\">Шапка <em>LIVE</em></a></div>",
            "<div class=\"article_footer\"></div>",
            "<div class=\"main_content\">",
            "<div class=\"article_header\"><a href=\"/news/m1\">Новина <em>ВІДЕО</em></a></div>",
            "</div>",
            "</body></html>",
        );
        let lead = article("Редакція — 08:00");
        let m1 = article("Редакція — 08:00");
        let fetcher = FixtureFetcher::new(&[
            ("https://fixture.test/news/lead", lead.as_str()),
            ("https://fixture.test/news/m1", m1.as_str()),
        ]);
        let extractor = Extractor::new(FIXTURE_BASE, fetcher);
        let records = extractor.extract(Page::parse(homepage)).await.unwrap();

        // The annotation strip is scoped to the main list, and nothing trims
        // the whitespace the removal leaves behind.
        assert_eq!(records[0].title, "Шапка LIVE");
        assert_eq!(records[1].title, "Новина ");
    }

    #[tokio::test]
    async fn test_missing_post_time_aborts_extraction() {
        let lead = "<html><body><p>no credit line here</p></body></html>";
        let homepage = concat!(
            "<html><body>",
            "<div class=\"article_header\"><a href=\"/news/lead\">Шапка</a></div>",
            "<div class=\"article_footer\"></div>",
            "<div class=\"main_content\"></div>",
            "</body></html>",
        );
        let fetcher = FixtureFetcher::new(&[("https://fixture.test/news/lead", lead)]);
        let extractor = Extractor::new(FIXTURE_BASE, fetcher);
        let err = extractor.extract(Page::parse(homepage)).await.unwrap_err();
        assert!(matches!(
            err,
            ScrapeError::MissingElement {
                what: "post time element",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_missing_lead_block_aborts() {
        let homepage = "<html><body><div class=\"main_content\"></div></body></html>";
        let extractor = Extractor::new(FIXTURE_BASE, FixtureFetcher::new(&[]));
        let err = extractor.extract(Page::parse(homepage)).await.unwrap_err();
        assert!(matches!(
            err,
            ScrapeError::MissingElement {
                what: "lead headline block",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_missing_trending_container_aborts() {
        let homepage = concat!(
            "<html><body>",
            "<div class=\"article_header\"><a href=\"/news/lead\">Шапка</a></div>",
            "<div class=\"main_content\"></div>",
            "</body></html>",
        );
        let extractor = Extractor::new(FIXTURE_BASE, FixtureFetcher::new(&[]));
        let err = extractor.extract(Page::parse(homepage)).await.unwrap_err();
        assert!(matches!(
            err,
            ScrapeError::MissingElement {
                what: "trending links container",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_missing_main_container_aborts() {
        let homepage = concat!(
            "<html><body>",
            "<div class=\"article_header\"><a href=\"/news/lead\">Шапка</a></div>",
            "<div class=\"article_footer\"></div>",
            "</body></html>",
        );
        let extractor = Extractor::new(FIXTURE_BASE, FixtureFetcher::new(&[]));
        let err = extractor.extract(Page::parse(homepage)).await.unwrap_err();
        assert!(matches!(
            err,
            ScrapeError::MissingElement {
                what: "main content container",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_headline_block_without_anchor_aborts() {
        let homepage = concat!(
            "<html><body>",
            "<div class=\"article_header\"><a href=\"/news/lead\">Шапка</a></div>",
            "<div class=\"article_footer\"></div>",
            "<div class=\"main_content\">",
            "<div class=\"article_header\">текст без посилання</div>",
            "</div>",
            "</body></html>",
        );
        let extractor = Extractor::new(FIXTURE_BASE, FixtureFetcher::new(&[]));
        let err = extractor.extract(Page::parse(homepage)).await.unwrap_err();
        assert!(matches!(
            err,
            ScrapeError::MissingElement {
                what: "main-list headline anchor",
                ..
            }
        ));
    }
}
