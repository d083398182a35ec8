//! Client-side validation of URLs submitted for shortening.
//!
//! The backend validates again on its side; this check exists so a typo
//! fails immediately in the form instead of costing a round trip, and so
//! a guarded request is never spent on input that cannot succeed.

use url::Url;

/// Why a submitted URL was rejected before being sent to the backend.
#[derive(Debug, thiserror::Error)]
pub enum InvalidLongUrl {
    /// The string is not an absolute URL. Covers plain text, relative
    /// paths (`url` only parses absolute URLs without a base), and
    /// `http://` with an empty host.
    #[error("not an absolute URL: {0}")]
    Unparsable(#[source] url::ParseError),

    /// Parsed, but the scheme is something the shortener won't redirect
    /// to (`javascript:`, `file:`, `mailto:`, ...). Only web URLs are
    /// accepted.
    #[error("unsupported scheme \"{0}\", expected http or https")]
    UnsupportedScheme(String),
}

/// Checks that `raw` is a well-formed absolute `http`/`https` URL and
/// returns it parsed.
///
/// The parser guarantees a non-empty host for http/https, so a URL that
/// comes back `Ok` is always sendable.
///
/// # Errors
/// Returns [`InvalidLongUrl`] describing the first failed check.
pub fn validate_long_url(raw: &str) -> Result<Url, InvalidLongUrl> {
    let url = Url::parse(raw.trim()).map_err(InvalidLongUrl::Unparsable)?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(InvalidLongUrl::UnsupportedScheme(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_https_url() {
        let url = validate_long_url("https://example.com/some/path?q=1")
            .expect("should be valid");
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("example.com"));
    }

    #[test]
    fn test_validate_accepts_http_url() {
        assert!(validate_long_url("http://example.com").is_ok());
    }

    #[test]
    fn test_validate_trims_surrounding_whitespace() {
        // Pasted URLs routinely carry a trailing newline or space.
        assert!(validate_long_url("  https://example.com \n").is_ok());
    }

    #[test]
    fn test_validate_rejects_relative_url() {
        let result = validate_long_url("/dashboard/analytics");
        assert!(matches!(result, Err(InvalidLongUrl::Unparsable(_))));
    }

    #[test]
    fn test_validate_rejects_plain_text() {
        let result = validate_long_url("not a url");
        assert!(matches!(result, Err(InvalidLongUrl::Unparsable(_))));
    }

    #[test]
    fn test_validate_rejects_empty_host() {
        let result = validate_long_url("http:///path");
        assert!(matches!(result, Err(InvalidLongUrl::Unparsable(_))));
    }

    #[test]
    fn test_validate_rejects_non_web_scheme() {
        let result = validate_long_url("javascript:alert(1)");
        assert!(
            matches!(result, Err(InvalidLongUrl::UnsupportedScheme(s)) if s == "javascript")
        );

        let result = validate_long_url("ftp://files.example.com/a.iso");
        assert!(
            matches!(result, Err(InvalidLongUrl::UnsupportedScheme(s)) if s == "ftp")
        );
    }
}
