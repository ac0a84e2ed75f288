use serde::{Deserialize, Serialize};
use url::Url;

/// How a discovered URL is matched against the crawled domain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HostMatch {
    /// Prefix/substring matching on the raw URL text. `fakeexample.com` passes the
    /// containment check for `example.com`, and `example.com.evil.net` is internal.
    #[default]
    Loose,
    /// The parsed host (minus a leading `www.`) must equal the domain exactly.
    Strict,
}

/// Resolve a possibly-relative `href` against the URL of the page it was found on.
///
/// Relative paths, protocol-relative references and fragment-only references all come
/// back in absolute form. Returns `None` when either side cannot be parsed.
pub fn resolve(base: &str, href: &str) -> Option<String> {
    let base_url = Url::parse(base).ok()?;
    let resolved = base_url.join(href.trim()).ok()?;
    Some(resolved.to_string())
}

/// Returns true unless `url` points into `domain` and carries no fragment.
pub fn is_outgoing(domain: &str, url: &str) -> bool {
    if !url.contains(domain) {
        return true;
    }

    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    let rest = rest.strip_prefix("www.").unwrap_or(rest);

    !(rest.starts_with(domain) && !url.contains('#'))
}

/// Host-boundary variant of [`is_outgoing`].
pub fn is_outgoing_strict(domain: &str, url: &str) -> bool {
    if url.contains('#') {
        return true;
    }
    let Ok(parsed) = Url::parse(url) else {
        return true;
    };
    if !matches!(parsed.scheme(), "http" | "https") {
        return true;
    }
    let Some(host) = parsed.host_str() else {
        return true;
    };
    let host = host.strip_prefix("www.").unwrap_or(host);
    let authority = match parsed.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };

    !(host.eq_ignore_ascii_case(domain) || authority.eq_ignore_ascii_case(domain))
}

impl HostMatch {
    pub fn is_outgoing(self, domain: &str, url: &str) -> bool {
        match self {
            HostMatch::Loose => is_outgoing(domain, url),
            HostMatch::Strict => is_outgoing_strict(domain, url),
        }
    }
}
