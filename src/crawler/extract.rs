//! Artifact extractors
//!
//! Two families live here:
//! - DOM-based extraction (`extract_links`, `extract_script_urls`) built on
//!   `scraper`, which tolerates malformed markup
//! - Textual scans (`FileLinkMatcher`, `extract_emails`,
//!   `extract_api_endpoints`) that run regexes over the raw body and never
//!   parse attribute boundaries
//!
//! Every extractor returns a set; iteration order is sorted but carries no
//! meaning.

use crate::url::resolve;
use regex::{Regex, RegexBuilder};
use scraper::{Html, Selector};
use std::collections::BTreeSet;
use std::sync::LazyLock;
use url::Url;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}")
        .expect("hardcoded regex pattern is valid")
});

static API_ENDPOINT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""(https?://[^"\s]+)""#).expect("hardcoded regex pattern is valid")
});

/// Collects every `<a href>` on the page as a normalized absolute URL
///
/// # Link Extraction Rules
///
/// - Relative, root-relative and protocol-relative hrefs are resolved
///   against `base_url`; a fragment-only href resolves to the page itself
/// - `javascript:`, `mailto:`, `tel:` and `data:` hrefs are skipped
/// - Hrefs that cannot be resolved, or resolve to a non-HTTP(S) URL, are
///   skipped without failing the page
///
/// # Example
///
/// ```
/// use sumi_harvest::crawler::extract_links;
/// use url::Url;
///
/// let base = Url::parse("https://site.com").unwrap();
/// let links = extract_links(r#"<a href="/about">About</a>"#, &base);
/// assert!(links.contains("https://site.com/about"));
/// ```
pub fn extract_links(html: &str, base_url: &Url) -> BTreeSet<String> {
    let document = Html::parse_document(html);
    let mut links = BTreeSet::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if let Some(href) = element.value().attr("href") {
                if let Some(absolute_url) = resolve_href(href, base_url) {
                    links.insert(absolute_url.into());
                }
            }
        }
    }

    links
}

/// Collects every `<script src>` on the page as a normalized absolute URL
pub fn extract_script_urls(html: &str, base_url: &Url) -> BTreeSet<String> {
    let document = Html::parse_document(html);
    let mut scripts = BTreeSet::new();

    if let Ok(script_selector) = Selector::parse("script[src]") {
        for element in document.select(&script_selector) {
            if let Some(src) = element.value().attr("src") {
                if let Some(absolute_url) = resolve_href(src, base_url) {
                    scripts.insert(absolute_url.into());
                }
            }
        }
    }

    scripts
}

/// Resolves an attribute value to an absolute http(s) URL
fn resolve_href(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    let resolved = resolve(base_url, href);
    if resolved.is_none() {
        tracing::trace!("Skipping unresolvable reference {:?} on {}", href, base_url);
    }
    resolved
}

/// Textual scanner for data-file references
///
/// A match is a run of URL-ish characters ending in one of the configured
/// extensions, where the extension is not followed by another word
/// character (`feed.json` matches, `feed.jsonp` does not). Matches may
/// carry a garbage prefix; whatever `Url::join` accepts is kept.
#[derive(Debug, Clone)]
pub struct FileLinkMatcher {
    pattern: Regex,
}

impl FileLinkMatcher {
    /// Compiles a matcher for the given extensions (e.g. `[".xml", ".json"]`)
    pub fn new<S: AsRef<str>>(extensions: &[S]) -> Result<Self, regex::Error> {
        let alternation = extensions
            .iter()
            .map(|ext| regex::escape(ext.as_ref()))
            .collect::<Vec<_>>()
            .join("|");

        let pattern = RegexBuilder::new(&format!(
            r#"[^\s"'<>()\[\]{{}}`,;]+?(?:{})\b"#,
            alternation
        ))
        .case_insensitive(true)
        .build()?;

        Ok(Self { pattern })
    }

    /// Scans `raw_body` and resolves each match against `base_url`
    pub fn extract(&self, raw_body: &str, base_url: &Url) -> BTreeSet<String> {
        self.pattern
            .find_iter(raw_body)
            .filter_map(|m| resolve(base_url, m.as_str()))
            .map(String::from)
            .collect()
    }
}

/// One-shot convenience around `FileLinkMatcher`
pub fn extract_file_links<S: AsRef<str>>(
    raw_body: &str,
    base_url: &Url,
    extensions: &[S],
) -> Result<BTreeSet<String>, regex::Error> {
    Ok(FileLinkMatcher::new(extensions)?.extract(raw_body, base_url))
}

/// Returns the distinct email-shaped tokens in `body`
///
/// The pattern is deliberately simple: local part `[A-Za-z0-9._%+-]`,
/// domain `[A-Za-z0-9.-]`, alphabetic TLD of two or more letters.
///
/// ```
/// use sumi_harvest::crawler::extract_emails;
///
/// let emails = extract_emails("contact me at foo.bar@example.com or BAD@@x");
/// assert_eq!(emails.len(), 1);
/// assert!(emails.contains("foo.bar@example.com"));
/// ```
pub fn extract_emails(body: &str) -> BTreeSet<String> {
    EMAIL_REGEX
        .find_iter(body)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Returns every double-quoted `http(s)://` literal in a script body
pub fn extract_api_endpoints(script_body: &str) -> BTreeSet<String> {
    API_ENDPOINT_REGEX
        .captures_iter(script_body)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}
