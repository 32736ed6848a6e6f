//! Configuration module for Subreddit-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! The rest of the crate only ever sees an immutable [`Config`].
//!
//! # Example
//!
//! ```no_run
//! use subreddit_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Posts per subreddit: {}", config.harvest.posts_per_subreddit);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, HarvestConfig, OutputConfig, PacingConfig, RelayConfig, TransportConfig,
    TransportStrategy, DEFAULT_BASE_URL, DEFAULT_RELAY_ENDPOINT,
};

// Re-export parser functions
pub use parser::{
    compute_config_hash, load_config, load_config_with_hash, parse_config, RELAY_TOKEN_ENV,
};

pub use validation::{validate, validate_subreddit_name};
