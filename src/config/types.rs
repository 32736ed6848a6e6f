use crate::model::{Category, TimeWindow};
use serde::Deserialize;

/// Default platform host
pub const DEFAULT_BASE_URL: &str = "https://www.reddit.com";

/// Default relay endpoint for the relay-unlock strategy
pub const DEFAULT_RELAY_ENDPOINT: &str = "https://api.brightdata.com/request";

/// Main configuration structure for Subreddit-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub harvest: HarvestConfig,
    #[serde(default)]
    pub transport: TransportConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Creates a configuration for the given subreddits with default
    /// transport, pacing and output settings
    pub fn new(subreddits: Vec<String>) -> Self {
        Self {
            harvest: HarvestConfig::new(subreddits),
            transport: TransportConfig::default(),
            pacing: PacingConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

/// What to fetch
#[derive(Debug, Clone, Deserialize)]
pub struct HarvestConfig {
    /// Subreddit names, processed in order; `python+rust` fetches a combined feed
    pub subreddits: Vec<String>,

    /// Listing category (hot, top or new)
    #[serde(default = "default_category")]
    pub category: Category,

    /// Time window for `top` listings
    #[serde(rename = "time-window", default)]
    pub time_window: TimeWindow,

    /// Maximum number of posts to fetch from each subreddit
    #[serde(rename = "posts-per-subreddit", default = "default_posts_per_subreddit")]
    pub posts_per_subreddit: usize,

    /// Maximum number of flattened comments attached to each post
    #[serde(rename = "max-comments-per-post", default = "default_max_comments")]
    pub max_comments_per_post: usize,

    /// Whether to fetch post details for comments at all
    #[serde(rename = "include-comments", default = "default_true")]
    pub include_comments: bool,
}

impl HarvestConfig {
    pub fn new(subreddits: Vec<String>) -> Self {
        Self {
            subreddits,
            category: default_category(),
            time_window: TimeWindow::default(),
            posts_per_subreddit: default_posts_per_subreddit(),
            max_comments_per_post: default_max_comments(),
            include_comments: true,
        }
    }
}

/// How requests reach the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportStrategy {
    /// Plain GET requests from this host
    #[default]
    Direct,

    /// GET requests routed through a forward proxy
    Proxy,

    /// POSTs to an unlocking relay that fetches the target on our behalf
    Relay,
}

/// Transport configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TransportConfig {
    #[serde(default)]
    pub strategy: TransportStrategy,

    /// Platform host, e.g. `https://www.reddit.com`
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// Forward proxy address, required for the `proxy` strategy
    #[serde(rename = "proxy-url", default)]
    pub proxy_url: Option<String>,

    /// Verify TLS certificates (disable only for intercepting proxies)
    #[serde(rename = "verify-tls", default = "default_true")]
    pub verify_tls: bool,

    /// Wall-clock timeout for one HTTP call (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Attempts per logical call, including the first
    #[serde(rename = "max-attempts", default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Backoff unit; the delay after attempt `n` is `2^n` units (milliseconds)
    #[serde(rename = "backoff-base-ms", default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,

    /// Relay settings, required for the `relay` strategy
    #[serde(default)]
    pub relay: Option<RelayConfig>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            strategy: TransportStrategy::Direct,
            base_url: default_base_url(),
            proxy_url: None,
            verify_tls: true,
            timeout_secs: default_timeout_secs(),
            max_attempts: default_max_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
            relay: None,
        }
    }
}

/// Relay-unlock settings
#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    /// Relay API endpoint
    #[serde(default = "default_relay_endpoint")]
    pub endpoint: String,

    /// Relay zone the requests are billed against
    #[serde(default)]
    pub zone: String,

    /// Bearer token; may instead come from `HARVEST_RELAY_TOKEN`
    #[serde(rename = "api-token", default)]
    pub api_token: Option<String>,
}

/// Politeness delays and request concurrency
#[derive(Debug, Clone, Deserialize)]
pub struct PacingConfig {
    /// Minimum pause between listing pages (milliseconds)
    #[serde(rename = "page-delay-min-ms", default = "default_page_delay_min_ms")]
    pub page_delay_min_ms: u64,

    /// Maximum pause between listing pages (milliseconds)
    #[serde(rename = "page-delay-max-ms", default = "default_page_delay_max_ms")]
    pub page_delay_max_ms: u64,

    /// Minimum pause between subreddits (milliseconds)
    #[serde(
        rename = "subreddit-delay-min-ms",
        default = "default_subreddit_delay_min_ms"
    )]
    pub subreddit_delay_min_ms: u64,

    /// Maximum pause between subreddits (milliseconds)
    #[serde(
        rename = "subreddit-delay-max-ms",
        default = "default_subreddit_delay_max_ms"
    )]
    pub subreddit_delay_max_ms: u64,

    /// Maximum number of detail fetches in flight for one subreddit
    #[serde(rename = "max-concurrent-details", default = "default_concurrency")]
    pub max_concurrent_details: usize,
}

impl PacingConfig {
    /// No pauses at all, one request at a time
    pub fn none() -> Self {
        Self {
            page_delay_min_ms: 0,
            page_delay_max_ms: 0,
            subreddit_delay_min_ms: 0,
            subreddit_delay_max_ms: 0,
            max_concurrent_details: 1,
        }
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            page_delay_min_ms: default_page_delay_min_ms(),
            page_delay_max_ms: default_page_delay_max_ms(),
            subreddit_delay_min_ms: default_subreddit_delay_min_ms(),
            subreddit_delay_max_ms: default_subreddit_delay_max_ms(),
            max_concurrent_details: default_concurrency(),
        }
    }
}

/// Summarizer digest settings
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Number of posts (from the front of the shuffled batch) in the digest
    #[serde(rename = "digest-posts", default = "default_digest_posts")]
    pub digest_posts: usize,

    /// Comments shown per post in the digest
    #[serde(rename = "digest-comments", default = "default_digest_comments")]
    pub digest_comments: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            digest_posts: default_digest_posts(),
            digest_comments: default_digest_comments(),
        }
    }
}

fn default_category() -> Category {
    Category::Hot
}

fn default_posts_per_subreddit() -> usize {
    10
}

fn default_max_comments() -> usize {
    10
}

fn default_true() -> bool {
    true
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_relay_endpoint() -> String {
    DEFAULT_RELAY_ENDPOINT.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_base_ms() -> u64 {
    1000
}

fn default_page_delay_min_ms() -> u64 {
    1000
}

fn default_page_delay_max_ms() -> u64 {
    2000
}

fn default_subreddit_delay_min_ms() -> u64 {
    5000
}

fn default_subreddit_delay_max_ms() -> u64 {
    20000
}

fn default_concurrency() -> usize {
    1
}

fn default_digest_posts() -> usize {
    10
}

fn default_digest_comments() -> usize {
    5
}
