use crate::config::types::{Config, FetchConfig, ServerConfig, UserAgentConfig};
use crate::robots::MAX_ROBOTS_CACHE_TTL;
use crate::ConfigError;
use std::net::SocketAddr;
use url::Url;

/// Hard ceiling for any configured download parallelism
const CONCURRENCY_CEILING: usize = 256;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_server_config(&config.server)?;
    validate_fetch_config(&config.fetch)?;
    validate_user_agent_config(&config.user_agent)?;
    Ok(())
}

fn validate_server_config(config: &ServerConfig) -> Result<(), ConfigError> {
    config.bind.parse::<SocketAddr>().map_err(|e| {
        ConfigError::Validation(format!("bind must be a socket address, got '{}': {}", config.bind, e))
    })?;
    Ok(())
}

fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.default_limit < 1 {
        return Err(ConfigError::Validation(format!(
            "default_limit must be >= 1, got {}",
            config.default_limit
        )));
    }

    if config.max_concurrency < 1 || config.max_concurrency > CONCURRENCY_CEILING {
        return Err(ConfigError::Validation(format!(
            "max_concurrency must be between 1 and {}, got {}",
            CONCURRENCY_CEILING, config.max_concurrency
        )));
    }

    if config.default_concurrency < 1 || config.default_concurrency > config.max_concurrency {
        return Err(ConfigError::Validation(format!(
            "default_concurrency must be between 1 and max_concurrency ({}), got {}",
            config.max_concurrency, config.default_concurrency
        )));
    }

    if !(100..=60_000).contains(&config.robots_timeout_ms) {
        return Err(ConfigError::Validation(format!(
            "robots_timeout_ms must be between 100 and 60000, got {}",
            config.robots_timeout_ms
        )));
    }

    if config.robots_cache_ttl_secs > MAX_ROBOTS_CACHE_TTL.as_secs() {
        return Err(ConfigError::Validation(format!(
            "robots_cache_ttl_secs must be at most {}, got {}",
            MAX_ROBOTS_CACHE_TTL.as_secs(),
            config.robots_cache_ttl_secs
        )));
    }

    if config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "connect_timeout_secs must be >= 1, got {}",
            config.connect_timeout_secs
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    Ok(())
}

fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Crawler name doubles as the robots.txt agent token: alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    Ok(())
}
