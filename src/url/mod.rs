//! URL processing for Swarmfetch
//!
//! Everything here is a pure function of its inputs: extracting raw links
//! from a body, resolving them into canonical absolute URLs, deciding whether
//! a URL is in crawl scope or excluded, and naming a URL's site.

mod domain;
mod extract;
mod matcher;
mod normalize;

// Re-export main functions
pub use domain::{domain_scope, extract_domain};
pub use extract::extract_links;
pub use matcher::{is_excluded, ExcludeSet};
pub use normalize::{canonicalize, parse_absolute};

use ::url::Url;

/// Runs the full link pipeline for one fetched page
///
/// Extracts every link, canonicalizes it against `base_url`, keeps those on
/// `target_domain` and drops the excluded ones. The result keeps document
/// order and may contain duplicates; deduplication belongs to the frontier.
pub fn in_scope_links(
    body: &str,
    base_url: &str,
    target_domain: &str,
    excludes: &ExcludeSet,
) -> Vec<Url> {
    extract_links(body)
        .into_iter()
        .filter_map(|raw| canonicalize(&raw, base_url))
        .filter(|url| domain_scope(url.as_str(), target_domain))
        .filter(|url| !excludes.is_excluded(url.as_str()))
        .collect()
}
