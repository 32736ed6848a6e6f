//! Subreddit-Harvest: a resilient subreddit scraper
//!
//! This crate walks subreddit listings through Reddit's public JSON endpoints,
//! pulls each post's comment tree, and hands a shuffled batch of normalized
//! posts to a downstream summarizer. Requests go out directly, through a
//! forward proxy, or through an unlocking relay, with bounded retries.

pub mod config;
pub mod model;
pub mod output;
pub mod scraper;
pub mod transport;

use thiserror::Error;

/// Main error type for Subreddit-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Configuration-specific errors
///
/// These are the only errors that abort a run, and they always surface before
/// any network activity.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Category must be 'hot', 'top', or 'new', got '{0}'")]
    InvalidCategory(String),

    #[error("Time window must be one of hour, day, week, month, year, all; got '{0}'")]
    InvalidTimeWindow(String),

    #[error("Invalid subreddit name: '{0}'")]
    InvalidSubreddit(String),

    #[error("Missing credential: {0}")]
    MissingCredential(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Errors raised by a single logical transport call
#[derive(Debug, Error)]
pub enum TransportError {
    /// Timeout, connection failure, or a retryable status (429, 500, 502, 503, 504)
    #[error("Transient failure for {url}: {reason}")]
    Transient { url: String, reason: String },

    /// Non-retryable HTTP status; never retried
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Giving up on {url} after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        last_error: String,
    },

    #[error("Response from {url} is not valid JSON: {message}")]
    Decode { url: String, message: String },

    #[error("Cannot build request for {url}: {message}")]
    InvalidRequest { url: String, message: String },
}

impl TransportError {
    /// Returns true if the call may succeed when repeated
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }
}

/// Result type alias for Subreddit-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for transport operations
pub type TransportResult<T> = std::result::Result<T, TransportError>;

// Re-export commonly used types
pub use config::Config;
pub use model::{Category, Comment, Post, TimeWindow};
pub use output::HarvestStats;
pub use scraper::{harvest, Coordinator, Harvest};
pub use transport::Transport;
