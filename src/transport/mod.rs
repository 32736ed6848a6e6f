//! Transport layer: one logical JSON GET against the platform
//!
//! This module handles:
//! - Choosing a strategy once per run (direct, proxied, relay-unlock)
//! - Rotating identifying headers per call
//! - Bounded retry with exponential backoff
//! - Classifying failures as transient or fatal

mod client;
pub mod headers;
mod retry;

pub use client::build_http_client;
pub use retry::{classify_reqwest_error, classify_status, is_retryable_status, RetryPolicy};

use crate::config::{TransportConfig, TransportStrategy};
use crate::model::raw::RelayRequest;
use crate::{ConfigError, TransportError, TransportResult};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

/// How requests reach the target, fixed for the run
#[derive(Debug, Clone)]
pub enum Strategy {
    /// GET the target from this host
    Direct { client: Client },

    /// GET the target through a forward proxy
    Proxied { client: Client },

    /// POST the target URL to an unlocking relay, which returns the target's body
    Relay {
        client: Client,
        endpoint: String,
        zone: String,
        token: String,
    },
}

impl Strategy {
    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Direct { .. } => "direct",
            Self::Proxied { .. } => "proxied",
            Self::Relay { .. } => "relay",
        }
    }
}

/// Performs JSON GETs with the run's strategy and retry policy
#[derive(Debug, Clone)]
pub struct Transport {
    strategy: Strategy,
    retry: RetryPolicy,
}

impl Transport {
    pub fn new(strategy: Strategy, retry: RetryPolicy) -> Self {
        Self { strategy, retry }
    }

    /// Builds the transport described by the configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Transport)` - Ready to issue requests
    /// * `Err(ConfigError)` - A credential or address required by the
    ///   selected strategy is missing or malformed
    pub fn from_config(config: &TransportConfig) -> Result<Self, ConfigError> {
        let strategy = match config.strategy {
            TransportStrategy::Direct => Strategy::Direct {
                client: build_http_client(config, None)?,
            },
            TransportStrategy::Proxy => {
                let proxy_url = config
                    .proxy_url
                    .clone()
                    .filter(|p| !p.trim().is_empty())
                    .ok_or_else(|| {
                        ConfigError::MissingCredential(
                            "proxy strategy requires transport.proxy-url".to_string(),
                        )
                    })?;
                Strategy::Proxied {
                    client: build_http_client(config, Some(&proxy_url))?,
                }
            }
            TransportStrategy::Relay => {
                let relay = config.relay.as_ref().ok_or_else(|| {
                    ConfigError::MissingCredential(
                        "relay strategy requires a [transport.relay] section".to_string(),
                    )
                })?;
                let token = relay
                    .api_token
                    .clone()
                    .filter(|t| !t.trim().is_empty())
                    .ok_or_else(|| {
                        ConfigError::MissingCredential(
                            "relay strategy requires an API token".to_string(),
                        )
                    })?;
                Strategy::Relay {
                    client: build_http_client(config, None)?,
                    endpoint: relay.endpoint.clone(),
                    zone: relay.zone.clone(),
                    token,
                }
            }
        };

        Ok(Self::new(strategy, RetryPolicy::from_config(config)))
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Fetches `url` with the given query parameters and parses the body as JSON
    ///
    /// Transient failures are retried per the retry policy; the error returned
    /// after that is always fatal for this call.
    pub async fn request(&self, url: &str, query: &[(&str, String)]) -> TransportResult<Value> {
        let target = build_target_url(url, query)?;
        let target_str = target.as_str();

        self.retry
            .run(target_str, move |attempt| async move {
                tracing::debug!(
                    "{} request (attempt {}): {}",
                    self.strategy.name(),
                    attempt,
                    target_str
                );
                self.send_once(target_str).await
            })
            .await
    }

    /// Issues exactly one HTTP exchange for `target`
    async fn send_once(&self, target: &str) -> TransportResult<Value> {
        let request = match &self.strategy {
            Strategy::Direct { client } | Strategy::Proxied { client } => {
                client.get(target).headers(headers::rotating_headers())
            }
            Strategy::Relay {
                client,
                endpoint,
                zone,
                token,
            } => client.post(endpoint).bearer_auth(token).json(&RelayRequest {
                zone: zone.as_str(),
                url: target,
                format: "raw",
            }),
        };

        let response = request
            .send()
            .await
            .map_err(|e| classify_reqwest_error(target, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(classify_status(target, status));
        }

        let body = response
            .text()
            .await
            .map_err(|e| classify_reqwest_error(target, &e))?;

        decode_json(&body).map_err(|e| TransportError::Decode {
            url: target.to_string(),
            message: e.to_string(),
        })
    }
}

/// Parses a response body with no nesting limit
///
/// Comment threads nest one JSON level per reply, so the parser's default
/// depth cap would reject ordinary long conversations. The stack grows on
/// demand instead.
pub fn decode_json(body: &str) -> Result<Value, serde_json::Error> {
    let mut deserializer = serde_json::Deserializer::from_str(body);
    deserializer.disable_recursion_limit();
    let value = Value::deserialize(serde_stacker::Deserializer::new(&mut deserializer))?;
    deserializer.end()?;
    Ok(value)
}

/// Appends query parameters to `url`, keeping any it already has
pub fn build_target_url(url: &str, query: &[(&str, String)]) -> TransportResult<Url> {
    let mut target = Url::parse(url).map_err(|e| TransportError::InvalidRequest {
        url: url.to_string(),
        message: e.to_string(),
    })?;

    if !query.is_empty() {
        let mut pairs = target.query_pairs_mut();
        for (key, value) in query {
            pairs.append_pair(key, value);
        }
    }

    Ok(target)
}
