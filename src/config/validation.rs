use crate::config::types::{
    Config, HarvestConfig, OutputConfig, PacingConfig, TransportConfig, TransportStrategy,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
///
/// Subreddit names are not checked here: a malformed name only disables its
/// own source, and is reported when that source is fetched.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_harvest_config(&config.harvest)?;
    validate_transport_config(&config.transport)?;
    validate_pacing_config(&config.pacing)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates what-to-fetch settings
fn validate_harvest_config(config: &HarvestConfig) -> Result<(), ConfigError> {
    if config.subreddits.is_empty() {
        return Err(ConfigError::Validation(
            "subreddits must list at least one subreddit".to_string(),
        ));
    }

    if config.posts_per_subreddit < 1 {
        return Err(ConfigError::Validation(format!(
            "posts_per_subreddit must be >= 1, got {}",
            config.posts_per_subreddit
        )));
    }

    Ok(())
}

/// Validates transport settings, including the credentials the selected
/// strategy needs
fn validate_transport_config(config: &TransportConfig) -> Result<(), ConfigError> {
    let base = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url must use http or https, got '{}'",
            config.base_url
        )));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.max_attempts < 1 || config.max_attempts > 10 {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be between 1 and 10, got {}",
            config.max_attempts
        )));
    }

    match config.strategy {
        TransportStrategy::Direct => {}
        TransportStrategy::Proxy => {
            let proxy = config
                .proxy_url
                .as_deref()
                .filter(|p| !p.trim().is_empty())
                .ok_or_else(|| {
                    ConfigError::MissingCredential(
                        "proxy strategy requires transport.proxy-url".to_string(),
                    )
                })?;
            Url::parse(proxy)
                .map_err(|e| ConfigError::InvalidUrl(format!("Invalid proxy_url: {}", e)))?;
        }
        TransportStrategy::Relay => {
            let relay = config.relay.as_ref().ok_or_else(|| {
                ConfigError::MissingCredential(
                    "relay strategy requires a [transport.relay] section".to_string(),
                )
            })?;

            Url::parse(&relay.endpoint)
                .map_err(|e| ConfigError::InvalidUrl(format!("Invalid relay endpoint: {}", e)))?;

            if relay.zone.trim().is_empty() {
                return Err(ConfigError::MissingCredential(
                    "relay strategy requires transport.relay.zone".to_string(),
                ));
            }

            if relay
                .api_token
                .as_deref()
                .map_or(true, |token| token.trim().is_empty())
            {
                return Err(ConfigError::MissingCredential(
                    "relay strategy requires transport.relay.api-token or HARVEST_RELAY_TOKEN"
                        .to_string(),
                ));
            }
        }
    }

    Ok(())
}

/// Validates pacing settings
fn validate_pacing_config(config: &PacingConfig) -> Result<(), ConfigError> {
    if config.page_delay_min_ms > config.page_delay_max_ms {
        return Err(ConfigError::Validation(format!(
            "page delay range is inverted: {}ms > {}ms",
            config.page_delay_min_ms, config.page_delay_max_ms
        )));
    }

    if config.subreddit_delay_min_ms > config.subreddit_delay_max_ms {
        return Err(ConfigError::Validation(format!(
            "subreddit delay range is inverted: {}ms > {}ms",
            config.subreddit_delay_min_ms, config.subreddit_delay_max_ms
        )));
    }

    if config.max_concurrent_details < 1 || config.max_concurrent_details > 16 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_details must be between 1 and 16, got {}",
            config.max_concurrent_details
        )));
    }

    Ok(())
}

/// Validates digest settings
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.digest_posts < 1 {
        return Err(ConfigError::Validation(
            "digest_posts must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Checks a subreddit name against the platform's naming rules
///
/// Names are 1-21 characters of ASCII letters, digits and underscores.
/// Several names joined with `+` (`python+rust`) select the combined feed.
pub fn validate_subreddit_name(name: &str) -> Result<(), ConfigError> {
    let valid = name.split('+').all(|part| {
        !part.is_empty()
            && part.len() <= 21
            && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    });

    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidSubreddit(name.to_string()))
    }
}
