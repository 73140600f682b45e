//! Thin DOM layer over [`scraper`].
//!
//! Wraps a parsed document ([`Page`]) and borrowed subtrees ([`Fragment`])
//! with the handful of lookups the extractor needs: class-based finds,
//! anchor enumeration, attribute and text reads, and removal of unwanted
//! nodes. Everything else about the HTML tree stays hidden behind this
//! module.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a").unwrap());

/// Build a selector matching elements carrying `name` as a CSS class.
///
/// Class names are compile-time constants here, so a parse failure is a
/// programming error.
fn class_selector(name: &str) -> Selector {
    Selector::parse(&format!(".{name}")).unwrap()
}

/// An owned, parsed HTML document.
#[derive(Debug)]
pub struct Page {
    document: Html,
}

impl Page {
    /// Parse raw HTML into a queryable page.
    ///
    /// Parsing never fails; malformed markup is recovered the way browsers
    /// do, and missing structure surfaces later as a failing lookup.
    pub fn parse(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }

    /// First element in document order carrying the given class.
    pub fn find_by_class(&self, name: &str) -> Option<Fragment<'_>> {
        let selector = class_selector(name);
        self.document
            .select(&selector)
            .next()
            .map(|el| Fragment { el })
    }

    /// Detach every element matched by `css` from the tree.
    ///
    /// Their text stops contributing to [`Fragment::text`] reads. Used to
    /// drop inline annotations before titles are collected.
    pub fn strip_all(&mut self, css: &str) {
        let selector = Selector::parse(css).unwrap();
        let doomed: Vec<_> = self
            .document
            .select(&selector)
            .map(|el| el.id())
            .collect();
        for id in doomed {
            if let Some(mut node) = self.document.tree.get_mut(id) {
                node.detach();
            }
        }
    }
}

/// A borrowed element subtree within a [`Page`].
#[derive(Debug, Clone, Copy)]
pub struct Fragment<'a> {
    el: ElementRef<'a>,
}

impl<'a> Fragment<'a> {
    /// First descendant carrying the given class.
    pub fn find_by_class(&self, name: &str) -> Option<Fragment<'a>> {
        let selector = class_selector(name);
        self.el.select(&selector).next().map(|el| Fragment { el })
    }

    /// All descendants carrying the given class, in document order.
    pub fn all_by_class(&self, name: &str) -> Vec<Fragment<'a>> {
        let selector = class_selector(name);
        self.el
            .select(&selector)
            .map(|el| Fragment { el })
            .collect()
    }

    /// All descendant anchors, in document order.
    pub fn anchors(&self) -> Vec<Fragment<'a>> {
        self.el
            .select(&ANCHOR)
            .map(|el| Fragment { el })
            .collect()
    }

    /// First descendant anchor.
    pub fn first_anchor(&self) -> Option<Fragment<'a>> {
        self.el.select(&ANCHOR).next().map(|el| Fragment { el })
    }

    /// Concatenated text of every descendant text node.
    ///
    /// No separators are inserted and no whitespace is trimmed; the result
    /// is exactly what the markup carries.
    pub fn text(&self) -> String {
        self.el.text().collect()
    }

    /// Attribute value on this element, if set.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.el.value().attr(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        <div class="wrap">
            <div class="article_header">
                <a href="/news/first">Перша <em>новина</em></a>
            </div>
            <div class="article_header">
                <a href="/news/second">Друга новина</a>
                <a href="/news/extra">зайве</a>
            </div>
            <div class="article_footer">
                <a href="/columns/opinion">Колонка</a>
                <a href="http://example.com/wire">Стрічка</a>
            </div>
        </div>
    "#;

    #[test]
    fn test_find_by_class_returns_first_match() {
        let page = Page::parse(SAMPLE);
        let block = page.find_by_class("article_header").unwrap();
        assert_eq!(
            block.first_anchor().unwrap().attr("href"),
            Some("/news/first")
        );
    }

    #[test]
    fn test_find_by_class_missing_is_none() {
        let page = Page::parse(SAMPLE);
        assert!(page.find_by_class("no_such_class").is_none());
    }

    #[test]
    fn test_all_by_class_in_document_order() {
        let page = Page::parse(SAMPLE);
        let wrap = page.find_by_class("wrap").unwrap();
        let blocks = wrap.all_by_class("article_header");
        assert_eq!(blocks.len(), 2);
        assert_eq!(
            blocks[1].first_anchor().unwrap().attr("href"),
            Some("/news/second")
        );
    }

    #[test]
    fn test_anchors_enumerates_all_descendants() {
        let page = Page::parse(SAMPLE);
        let footer = page.find_by_class("article_footer").unwrap();
        let hrefs: Vec<_> = footer
            .anchors()
            .iter()
            .filter_map(|a| a.attr("href"))
            .collect();
        assert_eq!(hrefs, vec!["/columns/opinion", "http://example.com/wire"]);
    }

    #[test]
    fn test_text_concatenates_descendants_verbatim() {
        let page = Page::parse(SAMPLE);
        let block = page.find_by_class("article_header").unwrap();
        // Nested element text joins with no separator added or removed.
        assert_eq!(
            block.first_anchor().unwrap().text(),
            "Перша новина"
        );
    }

    #[test]
    fn test_text_preserves_surrounding_whitespace() {
        let page = Page::parse("<p class=\"note\"> spaced \n</p>");
        let note = page.find_by_class("note").unwrap();
        assert_eq!(note.text(), " spaced \n");
    }

    #[test]
    fn test_strip_all_removes_matched_subtrees() {
        let mut page = Page::parse(SAMPLE);
        page.strip_all(".wrap .article_header em");
        let block = page.find_by_class("article_header").unwrap();
        assert_eq!(block.text().trim(), "Перша");
    }

    #[test]
    fn test_strip_all_with_no_match_is_a_no_op() {
        let mut page = Page::parse(SAMPLE);
        page.strip_all(".wrap em.absent");
        let block = page.find_by_class("article_header").unwrap();
        assert!(block.text().contains("новина"));
    }

    #[test]
    fn test_attr_missing_is_none() {
        let page = Page::parse(SAMPLE);
        let block = page.find_by_class("article_header").unwrap();
        assert_eq!(block.first_anchor().unwrap().attr("rel"), None);
    }
}
