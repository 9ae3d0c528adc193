use crate::{UrlError, UrlResult};
use url::Url;

/// Resolves a raw link against the page it was found on
///
/// # Resolution Rules
///
/// 1. Trim surrounding whitespace from the raw link
/// 2. Parse the base URL; an unparseable base drops the link
/// 3. Join the link onto the base (handles `/path`, `//host/path`,
///    `../path`, `path` and already-absolute forms)
/// 4. Keep only `http` and `https` results that have a host
/// 5. Remove the fragment
///
/// The `url` crate already lowercases the host, elides default ports and
/// turns an empty path into `/`, so `http://h`, `http://h/`, `//h` and
/// `http://h:80/` all canonicalize to the same string.
///
/// # Returns
///
/// * `Some(Url)` - The canonical absolute URL
/// * `None` - The link could not be resolved and is dropped
///
/// # Examples
///
/// ```
/// use swarmfetch::url::canonicalize;
///
/// let url = canonicalize("../b", "http://example.com/dir/page.html").unwrap();
/// assert_eq!(url.as_str(), "http://example.com/b");
/// ```
pub fn canonicalize(raw: &str, base: &str) -> Option<Url> {
    let raw = raw.trim();

    let base = match Url::parse(base) {
        Ok(b) => b,
        Err(e) => {
            tracing::trace!("Dropping '{}': unparseable base '{}': {}", raw, base, e);
            return None;
        }
    };

    let mut url = match base.join(raw) {
        Ok(u) => u,
        Err(e) => {
            tracing::trace!("Dropping unparseable link '{}': {}", raw, e);
            return None;
        }
    };

    if !is_http_scheme(url.scheme()) || url.host_str().is_none() {
        tracing::trace!("Dropping non-HTTP link '{}'", url);
        return None;
    }

    url.set_fragment(None);
    Some(url)
}

/// Parses a URL that must already be absolute
///
/// This is the gate every URL passes before becoming a transfer.
pub fn parse_absolute(url_str: &str) -> UrlResult<Url> {
    let trimmed = url_str.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let url = Url::parse(trimmed).map_err(|e| UrlError::Parse {
        url: trimmed.to_string(),
        message: e.to_string(),
    })?;

    if !is_http_scheme(url.scheme()) {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost(trimmed.to_string()));
    }

    Ok(url)
}

fn is_http_scheme(scheme: &str) -> bool {
    scheme == "http" || scheme == "https"
}
