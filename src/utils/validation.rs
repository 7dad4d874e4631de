//! URL and input validation utilities

use url::Url;

/// Check if URL is an http(s) URL the loader can fetch
pub fn is_http_url(url: &str) -> bool {
    if let Ok(parsed) = Url::parse(url) {
        let scheme = parsed.scheme();
        scheme == "http" || scheme == "https"
    } else {
        false
    }
}
