//! URL resolution for requests issued against the worker's origin.

/// Error type for URL resolution failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Resolve a request target the way a page would.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Paths (`/img/logo.webp`) resolve against `origin`; anything else must be
///    an absolute http(s) URL
/// 3. Lowercase the host
/// 4. Remove fragment (#...)
/// 5. Keep query string intact (do not reorder)
pub fn resolve(origin: &url::Url, input: &str) -> Result<url::Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut parsed = if trimmed.starts_with('/') && !trimmed.starts_with("//") {
        origin.join(trimmed)
    } else {
        url::Url::parse(trimmed)
    }
    .map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    if let Some(host) = parsed.host_str() {
        let host = host.to_lowercase();
        parsed
            .set_host(Some(&host))
            .map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    }

    parsed.set_fragment(None);

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> url::Url {
        url::Url::parse("https://connect-digitals.example").unwrap()
    }

    #[test]
    fn test_resolve_path_against_origin() {
        let url = resolve(&origin(), "/img/logo.webp").unwrap();
        assert_eq!(url.as_str(), "https://connect-digitals.example/img/logo.webp");
    }

    #[test]
    fn test_resolve_absolute_url() {
        let url = resolve(&origin(), "https://formspree.io/f/abc").unwrap();
        assert_eq!(url.host_str(), Some("formspree.io"));
    }

    #[test]
    fn test_resolve_lowercase_host() {
        let url = resolve(&origin(), "https://FORMSPREE.IO/f/abc").unwrap();
        assert_eq!(url.host_str(), Some("formspree.io"));
    }

    #[test]
    fn test_resolve_remove_fragment() {
        let url = resolve(&origin(), "/#contact").unwrap();
        assert_eq!(url.fragment(), None);
        assert_eq!(url.path(), "/");
    }

    #[test]
    fn test_resolve_preserve_query() {
        let url = resolve(&origin(), "/api/data?b=2&a=1").unwrap();
        assert_eq!(url.query(), Some("b=2&a=1"));
    }

    #[test]
    fn test_resolve_trim_whitespace() {
        let url = resolve(&origin(), "  /manifest.json  ").unwrap();
        assert_eq!(url.as_str(), "https://connect-digitals.example/manifest.json");
    }

    #[test]
    fn test_resolve_unsupported_scheme() {
        let result = resolve(&origin(), "file:///etc/passwd");
        assert!(matches!(result, Err(UrlError::UnsupportedScheme(_))));
    }

    #[test]
    fn test_resolve_empty() {
        assert!(matches!(resolve(&origin(), ""), Err(UrlError::Empty)));
        assert!(matches!(resolve(&origin(), "   "), Err(UrlError::Empty)));
    }

    #[test]
    fn test_resolve_bare_host_is_invalid() {
        let result = resolve(&origin(), "example.com");
        assert!(matches!(result, Err(UrlError::InvalidUrl(_))));
    }
}
