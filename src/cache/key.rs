//! URL → cache key derivation.
//!
//! Keys have the shape `sites/{domain}/pages/{sanitized_path}`. Query string
//! and fragment never take part, so `/article?id=1` and `/article?id=2`
//! share one page entry.
//!
//! `url` only validates the input. Domain and path are taken verbatim from
//! the original string: host case, explicit default ports and unencoded
//! characters survive into the key.

use url::Url;

use crate::cache::CacheError;

/// Domain and sanitized path of a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocation {
    pub domain: String,
    pub path: String,
}

impl PageLocation {
    pub fn parse(url: &str) -> Result<Self, CacheError> {
        let invalid = |reason: String| CacheError::InvalidUrl {
            url: url.to_string(),
            reason,
        };

        let parsed = Url::parse(url).map_err(|e| invalid(e.to_string()))?;
        if parsed.host_str().map_or(true, str::is_empty) {
            return Err(invalid("no host".to_string()));
        }

        let (_, rest) = url
            .trim()
            .split_once("://")
            .ok_or_else(|| invalid("no authority".to_string()))?;
        let authority_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
        let (authority, tail) = rest.split_at(authority_end);
        let domain = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
        let path = &tail[..tail.find(['?', '#']).unwrap_or(tail.len())];

        Ok(Self {
            domain: domain.to_string(),
            path: sanitize_path(path),
        })
    }

    pub fn cache_key(&self) -> String {
        format!("sites/{}/pages/{}", self.domain, self.path)
    }
}

/// Derive the page cache key for a URL.
pub fn url_to_cache_key(url: &str) -> Result<String, CacheError> {
    PageLocation::parse(url).map(|location| location.cache_key())
}

/// Strip surrounding slashes, default to `index`, and replace anything outside
/// `[A-Za-z0-9-_/]` with a single `-`.
pub fn sanitize_path(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        return "index".to_string();
    }

    let mut out = String::with_capacity(trimmed.len());
    for c in trimmed.chars() {
        let c = if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '/') {
            c
        } else {
            '-'
        };
        if c == '-' && out.ends_with('-') {
            continue;
        }
        out.push(c);
    }
    out
}
