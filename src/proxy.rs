//! Proxy settings for requests to the release host.
//!
//! Users enter a single proxy URL in the shell's settings. Only plain
//! `scheme://host:port` URLs are honored; anything else is logged and
//! ignored, and the client falls back to the system proxy configuration.

use crate::constants::PROXY_BYPASS;
use reqwest::Url;
use tracing::{debug, error};

const ALLOWED_SCHEMES: &[&str] = &["http", "https", "socks", "socks4", "socks5"];

/// Validate a user-supplied proxy URL.
///
/// Returns `None` for an empty string, an unparsable URL or an unsupported
/// scheme. `socks://` is read as `socks5://`.
#[must_use]
pub fn normalize_proxy_uri(input: &str) -> Option<Url> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let mut url = match Url::parse(input) {
        Ok(url) => url,
        Err(e) => {
            error!(proxy = input, error = %e, "Invalid proxy URL");
            return None;
        }
    };

    if !ALLOWED_SCHEMES.contains(&url.scheme()) {
        error!(proxy = input, scheme = url.scheme(), "Invalid scheme in proxy URL");
        return None;
    }

    if url.host_str().is_none() {
        error!(proxy = input, "Proxy URL has no host");
        return None;
    }

    if url.scheme() == "socks" && url.set_scheme("socks5").is_err() {
        return None;
    }

    Some(url)
}

/// Build the `reqwest` proxy for a configured URL, bypassing local hosts.
pub fn build_proxy(input: &str) -> Option<reqwest::Proxy> {
    let url = normalize_proxy_uri(input)?;
    debug!(proxy = %url, "Loading proxy");
    match reqwest::Proxy::all(url.as_str()) {
        Ok(proxy) => Some(proxy.no_proxy(reqwest::NoProxy::from_string(PROXY_BYPASS))),
        Err(e) => {
            error!(proxy = %url, error = %e, "Proxy rejected by HTTP client");
            None
        }
    }
}
