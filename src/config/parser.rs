use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Environment variable consulted when the relay token is not in the file
pub const RELAY_TOKEN_ENV: &str = "HARVEST_RELAY_TOKEN";

/// Loads and parses a configuration file from the given path
///
/// A relay section without an `api-token` picks the token up from
/// `HARVEST_RELAY_TOKEN`, so secrets can stay out of the file.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use subreddit_harvest::config::load_config;
///
/// let config = load_config(Path::new("harvest.toml")).unwrap();
/// println!("Subreddits: {:?}", config.harvest.subreddits);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut config = parse_config(&content)?;

    if let Some(relay) = config.transport.relay.as_mut() {
        if relay.api_token.is_none() {
            relay.api_token = std::env::var(RELAY_TOKEN_ENV)
                .ok()
                .filter(|token| !token.trim().is_empty());
        }
    }

    validate(&config)?;

    Ok(config)
}

/// Parses configuration TOML without validating it
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let mut config: Config = toml::from_str(content)?;

    // Accept "r/rust" as well as "rust"
    for subreddit in config.harvest.subreddits.iter_mut() {
        let trimmed = subreddit.trim();
        let trimmed = trimmed
            .strip_prefix("/r/")
            .or_else(|| trimmed.strip_prefix("r/"))
            .unwrap_or(trimmed);
        *subreddit = trimmed.to_string();
    }

    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so a digest can be traced back to the settings that
/// produced it.
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}
