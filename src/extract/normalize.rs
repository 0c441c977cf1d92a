//! Resolution, redirect unwrapping and ad filtering for result links.

use url::Url;

/// How a search engine wraps and tags the links on its result pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkRules {
    /// Host serving the redirect wrapper; subdomains match too.
    pub redirect_host: &'static str,
    /// Path prefix identifying a redirect wrapper.
    pub redirect_path_prefix: &'static str,
    /// Query parameter carrying the wrapped destination.
    pub redirect_param: &'static str,
    /// Token marking advertisement links.
    pub ad_marker: &'static str,
}

impl LinkRules {
    /// Link conventions of the DuckDuckGo HTML endpoint.
    pub const DUCKDUCKGO: LinkRules = LinkRules {
        redirect_host: "duckduckgo.com",
        redirect_path_prefix: "/l/",
        redirect_param: "uddg",
        ad_marker: "ad_domain",
    };
}

/// Turns raw `href` values into canonical absolute URLs.
#[derive(Debug, Clone)]
pub struct UrlNormalizer {
    base: Url,
    rules: LinkRules,
}

impl UrlNormalizer {
    /// Creates a normalizer resolving relative links against `base`.
    pub fn new(base: Url, rules: LinkRules) -> Self {
        Self { base, rules }
    }

    /// Returns the base URL relative links are resolved against.
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Normalizes `raw` into a canonical URL string.
    ///
    /// Returns `None` for empty input, advertisement links, unresolvable links and
    /// anything that is not `http` or `https` once unwrapped.
    pub fn normalize(&self, raw: &str) -> Option<String> {
        self.normalize_url(raw).map(String::from)
    }

    /// Same as [`normalize`](Self::normalize), returning the parsed URL.
    pub fn normalize_url(&self, raw: &str) -> Option<Url> {
        let raw = raw.trim();
        if raw.is_empty() || raw.contains(self.rules.ad_marker) {
            return None;
        }

        let resolved = match Url::parse(raw) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => self.base.join(raw).ok()?,
            Err(_) => return None,
        };

        let target = if self.is_redirect(&resolved) {
            match self.wrapped_destination(&resolved) {
                // Destinations must be absolute; they are never resolved against the engine.
                Some(destination) => Url::parse(&destination).ok()?,
                None => resolved,
            }
        } else {
            resolved
        };

        // Unwrapping can surface ad tagging that was hidden in the wrapper.
        if self.has_ad_param(&target) {
            return None;
        }
        if !matches!(target.scheme(), "http" | "https") {
            return None;
        }
        Some(target)
    }

    fn is_redirect(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        let engine_host = host == self.rules.redirect_host
            || host
                .strip_suffix(self.rules.redirect_host)
                .is_some_and(|sub| sub.ends_with('.'))
            || self.base.host_str() == Some(host);
        engine_host && url.path().starts_with(self.rules.redirect_path_prefix)
    }

    /// Reads the redirect parameter without the query parser's decoding, so a
    /// value that fails to percent-decode can be used verbatim.
    fn wrapped_destination(&self, url: &Url) -> Option<String> {
        let raw = url.query()?.split('&').find_map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (key == self.rules.redirect_param).then_some(value)
        })?;
        if raw.is_empty() {
            return None;
        }
        match urlencoding::decode(raw) {
            Ok(decoded) => Some(decoded.into_owned()),
            Err(_) => Some(raw.to_string()),
        }
    }

    fn has_ad_param(&self, url: &Url) -> bool {
        url.query_pairs().any(|(key, _)| key == self.rules.ad_marker)
    }
}
