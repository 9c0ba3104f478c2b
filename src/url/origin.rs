use std::fmt;
use url::Url;

/// Scheme, host and port of a URL
///
/// Two URLs belong to the same site exactly when their origins are equal.
/// Default ports are elided by the parser, so `https://a.com` and
/// `https://a.com:443` share an origin.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Origin {
    scheme: String,
    host: String,
    port: Option<u16>,
}

impl Origin {
    /// Derives the origin of a URL, `None` for host-less URLs
    pub fn of(url: &Url) -> Option<Self> {
        let host = url.host_str()?.to_lowercase();
        Some(Self {
            scheme: url.scheme().to_string(),
            host,
            port: url.port_or_known_default(),
        })
    }

    /// Returns true if `url` is on this origin
    pub fn contains(&self, url: &Url) -> bool {
        Self::of(url).as_ref() == Some(self)
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.host)?;
        match (self.scheme.as_str(), self.port) {
            ("http", Some(80)) | ("https", Some(443)) | (_, None) => Ok(()),
            (_, Some(port)) => write!(f, ":{}", port),
        }
    }
}

/// Key under which a site's output is stored
///
/// This is the lowercase host with a leading `www.` removed.
///
/// ```
/// use url::Url;
/// use sumi_harvest::url::site_key;
///
/// let url = Url::parse("https://www.Example.com/contact").unwrap();
/// assert_eq!(site_key(&url), "example.com");
/// ```
pub fn site_key(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default().to_lowercase();
    match host.strip_prefix("www.") {
        Some(rest) if !rest.is_empty() => rest.to_string(),
        _ => host,
    }
}
