//! HTTP client construction
//!
//! One client is built per run and shared by every call; the strategy decides
//! whether it goes out directly or through a forward proxy.

use crate::config::TransportConfig;
use crate::ConfigError;
use reqwest::{Client, Proxy};
use std::time::Duration;

/// Builds the HTTP client for a run
///
/// # Arguments
///
/// * `config` - The transport configuration (timeout, TLS verification)
/// * `proxy_url` - Forward proxy for both HTTP and HTTPS, if any
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(ConfigError)` - Invalid proxy address or TLS backend failure
///
/// # Example
///
/// ```no_run
/// use subreddit_harvest::config::TransportConfig;
/// use subreddit_harvest::transport::build_http_client;
///
/// let client = build_http_client(&TransportConfig::default(), None).unwrap();
/// ```
pub fn build_http_client(
    config: &TransportConfig,
    proxy_url: Option<&str>,
) -> Result<Client, ConfigError> {
    let timeout = Duration::from_secs(config.timeout_secs);

    let mut builder = Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .danger_accept_invalid_certs(!config.verify_tls);

    builder = match proxy_url {
        Some(proxy) => builder.proxy(Proxy::all(proxy)?),
        // Ignore HTTP_PROXY and friends unless a proxy was configured
        None => builder.no_proxy(),
    };

    Ok(builder.build()?)
}
