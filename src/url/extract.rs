//! Attribute-level link extraction
//!
//! Links are pulled out of `href` and `src` attributes with a single regular
//! expression instead of a full HTML parse: transfers in load mode can be
//! large and arbitrary, and only the attribute values are ever needed.

use regex::Regex;
use std::sync::OnceLock;

fn link_attribute() -> &'static Regex {
    static LINK: OnceLock<Regex> = OnceLock::new();
    LINK.get_or_init(|| {
        Regex::new(r#"(?i)\b(?:href|src)\s*=\s*(?:"\s*([^"]*)"|'\s*([^']*)')"#)
            .expect("link pattern is valid")
    })
}

/// Extracts raw `href`/`src` attribute values from a document
///
/// Matching is case-insensitive, accepts single or double quotes and runs
/// left-to-right over the whole document without overlapping. Values are
/// returned exactly as written (minus leading whitespace inside the quotes);
/// resolving them is the job of [`canonicalize`](super::canonicalize).
///
/// # Examples
///
/// ```
/// use swarmfetch::url::extract_links;
///
/// let html = r#"<a HREF="/a">a</a><img src='logo.png'>"#;
/// assert_eq!(extract_links(html), vec!["/a", "logo.png"]);
/// ```
pub fn extract_links(html: &str) -> Vec<String> {
    link_attribute()
        .captures_iter(html)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().to_string())
        .collect()
}
