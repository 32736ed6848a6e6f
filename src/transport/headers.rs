//! Identifying headers rotated per request
//!
//! Each direct or proxied call draws its User-Agent and Accept values from a
//! small fixed pool so consecutive requests do not share one fingerprint.

use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, DNT, USER_AGENT};

/// Desktop browser User-Agent strings
pub const USER_AGENTS: [&str; 5] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Safari/605.1.15",
];

/// Accept header values a browser might send for a JSON document
pub const ACCEPT_VALUES: [&str; 3] = [
    "application/json, text/plain, */*",
    "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
    "*/*",
];

/// Builds a fresh header set with a randomly chosen User-Agent and Accept
///
/// Accept-Encoding is left to reqwest so compressed bodies are still decoded.
pub fn rotating_headers() -> HeaderMap {
    let mut rng = rand::thread_rng();
    let user_agent = USER_AGENTS[rng.gen_range(0..USER_AGENTS.len())];
    let accept = ACCEPT_VALUES[rng.gen_range(0..ACCEPT_VALUES.len())];

    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(user_agent));
    headers.insert(ACCEPT, HeaderValue::from_static(accept));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(DNT, HeaderValue::from_static("1"));
    headers
}
