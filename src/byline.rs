//! Byline parsing: raw credit line into structured author names.
//!
//! Article sub-pages carry a single credit line shaped like
//! `"Ольга Кошеленко, Редакція — 14:30, 21 серпня"`: authors first, then an
//! em-dash and the publication time. Only the author segment is kept; the
//! timestamp is discarded unparsed.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::AuthorName;

/// Separators seen between the author segment and the timestamp: em dash,
/// en dash, and the horizontal bar some templates emit.
static SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new("[—–―]").unwrap());

/// Split a raw byline into zero or more author name pairs.
///
/// The segment before the first separator is split on commas, one token per
/// author. Within a token, the first whitespace-delimited word is the first
/// name and the second (when present) the surname; further words are
/// ignored. Tokens without any word produce no author. Any input string is
/// acceptable — there is no charset or length validation here.
///
/// # Examples
///
/// ```
/// use pravda_headlines::byline::normalize;
/// use pravda_headlines::models::AuthorName;
///
/// assert_eq!(
///     normalize("Іван Франко — 12:00"),
///     vec![AuthorName::new("Іван", "Франко")],
/// );
/// assert_eq!(
///     normalize("Редакція — 09:00"),
///     vec![AuthorName::new("Редакція", "")],
/// );
/// ```
pub fn normalize(raw: &str) -> Vec<AuthorName> {
    // No separator means the whole line is the author segment.
    let authors_segment = SEPARATOR.splitn(raw, 2).next().unwrap_or("");

    authors_segment
        .split(',')
        .filter_map(|token| {
            let mut words = token.split_whitespace();
            let first = words.next()?;
            let last = words.next().unwrap_or("");
            Some(AuthorName::new(first, last))
        })
        .collect()
}
