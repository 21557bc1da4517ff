//! Target URL normalization.

use std::sync::LazyLock;

use regex::Regex;

static SCHEME_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*://").expect("scheme prefix pattern is valid"));

/// Error type for target normalization failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("missing host: {0}")]
    MissingHost(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// A normalized resolution target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// The parsed, scheme-qualified URL.
    pub url: url::Url,
    /// `scheme://host[:port]`, without a trailing slash.
    pub authority: String,
}

impl Target {
    /// `{authority}/robots.txt`
    pub fn robots_url(&self) -> String {
        format!("{}/robots.txt", self.authority)
    }
}

/// Normalize a user-supplied target.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Default scheme to https:// if missing
/// 3. Require an http(s) scheme and a host
/// 4. Reduce to `scheme://host[:port]` (default ports are dropped)
pub fn normalize_target(input: &str) -> Result<Target, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let url_str = if SCHEME_PREFIX.is_match(trimmed) { trimmed.to_string() } else { format!("https://{trimmed}") };

    let parsed = url::Url::parse(&url_str).map_err(|e| UrlError::InvalidUrl(format!("{trimmed}: {e}")))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    let host = match parsed.host_str() {
        Some(host) if !host.is_empty() => host,
        _ => return Err(UrlError::MissingHost(trimmed.to_string())),
    };

    let authority = match parsed.port() {
        Some(port) => format!("{}://{}:{}", parsed.scheme(), host, port),
        None => format!("{}://{}", parsed.scheme(), host),
    };

    Ok(Target { url: parsed, authority })
}

/// Resolve a sitemap location that may be relative against the document
/// that referenced it. Absolute locations are returned unchanged.
pub fn resolve_location(base: Option<&url::Url>, location: &str) -> String {
    let location = location.trim();
    match url::Url::parse(location) {
        Ok(_) => location.to_string(),
        Err(url::ParseError::RelativeUrlWithoutBase) => base
            .and_then(|base| base.join(location).ok())
            .map(|joined| joined.to_string())
            .unwrap_or_else(|| location.to_string()),
        Err(_) => location.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_basic() {
        let target = normalize_target("https://example.com/some/page?q=1").unwrap();
        assert_eq!(target.authority, "https://example.com");
        assert_eq!(target.robots_url(), "https://example.com/robots.txt");
    }

    #[test]
    fn test_normalize_default_scheme() {
        let target = normalize_target("example.com").unwrap();
        assert_eq!(target.url.scheme(), "https");
        assert_eq!(target.authority, "https://example.com");
    }

    #[test]
    fn test_normalize_default_scheme_with_url_in_query() {
        let target = normalize_target("example.com/landing?next=https://example.com/x").unwrap();
        assert_eq!(target.url.scheme(), "https");
        assert_eq!(target.authority, "https://example.com");
    }

    #[test]
    fn test_normalize_keeps_http() {
        let target = normalize_target("http://example.com/sitemap.xml").unwrap();
        assert_eq!(target.authority, "http://example.com");
    }

    #[test]
    fn test_normalize_lowercase_host() {
        let target = normalize_target("https://EXAMPLE.COM").unwrap();
        assert_eq!(target.authority, "https://example.com");
    }

    #[test]
    fn test_normalize_keeps_explicit_port() {
        let target = normalize_target("http://127.0.0.1:8080/x").unwrap();
        assert_eq!(target.authority, "http://127.0.0.1:8080");
    }

    #[test]
    fn test_normalize_drops_default_port() {
        let target = normalize_target("https://example.com:443/").unwrap();
        assert_eq!(target.authority, "https://example.com");
    }

    #[test]
    fn test_normalize_trim_whitespace() {
        let target = normalize_target("  https://example.com  ").unwrap();
        assert_eq!(target.authority, "https://example.com");
    }

    #[test]
    fn test_normalize_not_a_url() {
        let result = normalize_target("not a url");
        assert!(matches!(result, Err(UrlError::InvalidUrl(_))));
    }

    #[test]
    fn test_normalize_unsupported_scheme() {
        let result = normalize_target("ftp://example.com/sitemap.xml");
        assert!(matches!(result, Err(UrlError::UnsupportedScheme(_))));
    }

    #[test]
    fn test_normalize_empty() {
        assert!(matches!(normalize_target(""), Err(UrlError::Empty)));
        assert!(matches!(normalize_target("   "), Err(UrlError::Empty)));
    }

    #[test]
    fn test_resolve_location_absolute() {
        let base = url::Url::parse("https://a.example/sitemaps/index.xml").unwrap();
        assert_eq!(
            resolve_location(Some(&base), "https://b.example/s.xml"),
            "https://b.example/s.xml"
        );
    }

    #[test]
    fn test_resolve_location_relative() {
        let base = url::Url::parse("https://a.example/sitemaps/index.xml").unwrap();
        assert_eq!(resolve_location(Some(&base), "posts.xml"), "https://a.example/sitemaps/posts.xml");
        assert_eq!(resolve_location(Some(&base), "/pages.xml"), "https://a.example/pages.xml");
    }

    #[test]
    fn test_resolve_location_without_base() {
        assert_eq!(resolve_location(None, " /pages.xml "), "/pages.xml");
    }
}
