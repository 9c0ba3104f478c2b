use crate::UrlError;
use url::Url;

/// Normalizes a URL according to Sumi-Harvest's identity rules
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Accept only `http` and `https` schemes
/// 3. Require a host (lowercased by the parser)
/// 4. Remove the fragment (everything after #)
///
/// The query string is kept verbatim and trailing slashes are not collapsed:
/// `/docs` and `/docs/` are distinct pages, as are `?page=1` and `?page=2`.
///
/// # Examples
///
/// ```
/// use sumi_harvest::url::normalize_url;
///
/// let url = normalize_url("https://EXAMPLE.com/page/?q=1#top").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/page/?q=1");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingDomain);
    }

    url.set_fragment(None);

    Ok(url)
}

/// Prepends `https://` when the input does not start with `scheme://`
///
/// ```
/// use sumi_harvest::url::ensure_scheme;
///
/// assert_eq!(ensure_scheme("example.com"), "https://example.com");
/// assert_eq!(ensure_scheme("http://example.com"), "http://example.com");
/// ```
pub fn ensure_scheme(input: &str) -> String {
    let trimmed = input.trim();
    if has_scheme_prefix(trimmed) {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

/// RFC 3986 scheme: a letter followed by letters, digits, `+`, `-` or `.`
fn has_scheme_prefix(input: &str) -> bool {
    let Some((scheme, _)) = input.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Turns user-supplied seed text into a normalized absolute URL
///
/// Blank input is rejected with `UrlError::EmptySeed`.
pub fn parse_seed(input: &str) -> Result<Url, UrlError> {
    if input.trim().is_empty() {
        return Err(UrlError::EmptySeed);
    }
    normalize_url(&ensure_scheme(input))
}

/// Resolves a reference against a base and normalizes the result
///
/// Returns `None` when the reference cannot be joined or resolves to
/// something other than an http(s) URL.
pub fn resolve(base: &Url, reference: &str) -> Option<Url> {
    let joined = base.join(reference.trim()).ok()?;
    normalize_url(joined.as_str()).ok()
}
