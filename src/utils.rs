//! Small text helpers shared by the extractors and the publisher.

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::ElementRef;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Visible text of an element, trimmed and with whitespace runs collapsed.
///
/// Text nodes are trimmed individually and joined by a single space, so
/// `<h2> Hello <b>World</b> </h2>` yields `"Hello World"`.
pub fn element_text(element: ElementRef<'_>) -> String {
    let joined = element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .join(" ");
    WHITESPACE_RUN.replace_all(&joined, " ").into_owned()
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut at the last char boundary before `max` bytes and get
/// `"…(+N bytes)"` appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}
