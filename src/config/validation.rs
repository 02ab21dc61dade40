use crate::config::types::{Config, CrawlerConfig, ExtractionConfig, OutputConfig};
use crate::url::{canonicalize, in_scope, normalize_prefix};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_extraction_config(&config.extraction)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    validate_http_url("start-url", &config.start_url)?;
    validate_http_url("robots-url", &config.robots_url)?;

    if config.target_prefix.trim().is_empty() {
        return Err(ConfigError::Validation(
            "target-prefix cannot be empty".to_string(),
        ));
    }

    // A start URL outside the prefix is marked visited and the crawl ends there
    let start = canonicalize(&config.start_url).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid start-url '{}': {}", config.start_url, e))
    })?;
    if !in_scope(start.as_str(), &normalize_prefix(&config.target_prefix)) {
        return Err(ConfigError::Validation(format!(
            "start-url '{}' does not contain target-prefix '{}'",
            config.start_url, config.target_prefix
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.max_pages == Some(0) {
        return Err(ConfigError::Validation(
            "max-pages must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates the item selector
fn validate_extraction_config(config: &ExtractionConfig) -> Result<(), ConfigError> {
    validate_selector_token("tag", &config.tag)?;
    validate_selector_token("attribute", &config.attribute)?;

    if config.value.contains('"') || config.value.contains('\\') {
        return Err(ConfigError::Validation(format!(
            "extraction value must not contain quotes or backslashes, got '{}'",
            config.value
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.results_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "results-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Checks that a URL is absolute and uses http or https
fn validate_http_url(key: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", key, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            key, value
        )));
    }

    Ok(())
}

/// Tag and attribute names end up inside a CSS selector
fn validate_selector_token(key: &str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!(
            "extraction {} cannot be empty",
            key
        )));
    }

    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConfigError::Validation(format!(
            "extraction {} must contain only letters, digits, '-' or '_', got '{}'",
            key, value
        )));
    }

    Ok(())
}
