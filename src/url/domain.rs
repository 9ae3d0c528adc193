use regex::Regex;
use std::net::IpAddr;
use std::sync::OnceLock;
use url::Url;

/// Label-dot-TLD suffix of a host name
fn registrable_suffix() -> &'static Regex {
    static SUFFIX: OnceLock<Regex> = OnceLock::new();
    SUFFIX.get_or_init(|| {
        Regex::new(r"[A-Za-z0-9_]{1,63}\.[A-Za-z]{2,6}$").expect("suffix pattern is valid")
    })
}

/// Extracts the site name from a URL or bare host
///
/// `localhost` and literal IPv4/IPv6 addresses are returned verbatim. Any
/// other host is reduced to its rightmost `label.tld` part, so every
/// subdomain of a site maps to the same name. A host without such a suffix
/// (e.g. `intranet`) is returned unchanged.
///
/// The input may be a full URL (`http://www.example.com/path`) or a bare host
/// with an optional port or path (`www.example.com/path`, `localhost:8080`).
///
/// # Examples
///
/// ```
/// use swarmfetch::url::extract_domain;
///
/// assert_eq!(extract_domain("http://www.example.com/path"), "example.com");
/// assert_eq!(extract_domain("localhost"), "localhost");
/// assert_eq!(extract_domain("127.0.0.1"), "127.0.0.1");
/// ```
pub fn extract_domain(url: &str) -> String {
    let host = host_of(url);

    if host == "localhost" || is_ip_literal(&host) {
        return host;
    }

    match registrable_suffix().find(&host) {
        Some(m) => m.as_str().to_string(),
        None => host,
    }
}

/// Checks whether a URL belongs to the crawl target
///
/// True iff the URL's host equals `target_domain` (ignoring ASCII case),
/// regardless of port or path. Unparseable URLs are never in scope.
///
/// # Examples
///
/// ```
/// use swarmfetch::url::domain_scope;
///
/// assert!(domain_scope("http://example.com/x", "example.com"));
/// assert!(!domain_scope("http://evil.com/example.com", "example.com"));
/// ```
pub fn domain_scope(url: &str, target_domain: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => parsed
            .host_str()
            .map(|h| h.eq_ignore_ascii_case(target_domain))
            .unwrap_or(false),
        Err(_) => false,
    }
}

/// Returns the lowercase host of a URL, or of the raw string treated as a host
fn host_of(input: &str) -> String {
    let input = input.trim();

    if let Ok(parsed) = Url::parse(input) {
        if let Some(host) = parsed.host_str() {
            return host.to_lowercase();
        }
    }

    // A bare IPv6 literal has colons that would look like a port
    if input.parse::<std::net::Ipv6Addr>().is_ok() {
        return input.to_lowercase();
    }

    let without_scheme = match input.find("://") {
        Some(idx) => &input[idx + 3..],
        None => input,
    };
    let authority = without_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or(without_scheme);

    let host = if authority.starts_with('[') {
        match authority.find(']') {
            Some(end) => &authority[..=end],
            None => authority,
        }
    } else {
        authority.split(':').next().unwrap_or(authority)
    };

    host.to_lowercase()
}

fn is_ip_literal(host: &str) -> bool {
    let unbracketed = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    unbracketed.parse::<IpAddr>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_strips_subdomain() {
        assert_eq!(extract_domain("http://www.example.com/path"), "example.com");
    }

    #[test]
    fn test_extract_nested_subdomains() {
        assert_eq!(
            extract_domain("https://api.v2.example.com/endpoint"),
            "example.com"
        );
        assert_eq!(extract_domain("http://validator.w3.org/check"), "w3.org");
    }

    #[test]
    fn test_extract_localhost() {
        assert_eq!(extract_domain("localhost"), "localhost");
        assert_eq!(extract_domain("http://localhost/"), "localhost");
        assert_eq!(extract_domain("localhost:8080"), "localhost");
    }

    #[test]
    fn test_extract_ipv4() {
        assert_eq!(extract_domain("127.0.0.1"), "127.0.0.1");
        assert_eq!(extract_domain("http://127.0.0.1:8080/x"), "127.0.0.1");
    }

    #[test]
    fn test_extract_ipv6() {
        assert_eq!(extract_domain("::1"), "::1");
        assert_eq!(extract_domain("http://[::1]:8080/"), "[::1]");
    }

    #[test]
    fn test_extract_bare_host_with_path() {
        assert_eq!(extract_domain("www.example.com/index.html"), "example.com");
    }

    #[test]
    fn test_extract_with_port() {
        assert_eq!(extract_domain("http://www.example.com:8080"), "example.com");
    }

    #[test]
    fn test_extract_uppercase_converted_to_lowercase() {
        assert_eq!(extract_domain("https://WWW.EXAMPLE.COM/"), "example.com");
    }

    #[test]
    fn test_extract_single_label_host() {
        assert_eq!(extract_domain("http://intranet/"), "intranet");
    }

    #[test]
    fn test_scope_same_host() {
        assert!(domain_scope("http://example.com/x", "example.com"));
        assert!(domain_scope("http://example.com:8080/a/b", "example.com"));
        assert!(domain_scope("https://EXAMPLE.com/", "example.com"));
    }

    #[test]
    fn test_scope_host_in_path_rejected() {
        assert!(!domain_scope("http://evil.com/example.com", "example.com"));
    }

    #[test]
    fn test_scope_subdomain_rejected() {
        assert!(!domain_scope("http://www.example.com/", "example.com"));
        assert!(!domain_scope("http://example.com.evil.com/", "example.com"));
    }

    #[test]
    fn test_scope_unparseable_rejected() {
        assert!(!domain_scope("not a url", "example.com"));
        assert!(!domain_scope("/relative", "example.com"));
    }

    #[test]
    fn test_scope_ip_host() {
        assert!(domain_scope("http://127.0.0.1:4000/page", "127.0.0.1"));
    }
}
