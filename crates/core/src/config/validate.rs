use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Enabled sites have a pages directory
/// - Fetch timeout and attempt count are not 0
/// - Retry pause cap is not below the initial pause
/// - Skip tokens are not blank
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    for site in config.enabled_sites() {
        if site.pages_dir.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "sites.{}.pages_dir cannot be empty",
                site.site
            )));
        }
    }

    // Fetch validation
    if config.fetch.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "fetch.timeout_secs cannot be 0".to_string(),
        ));
    }
    if config.fetch.max_attempts == 0 {
        return Err(ConfigError::ValidationError(
            "fetch.max_attempts cannot be 0".to_string(),
        ));
    }
    if config.fetch.retry_max_delay_secs < config.fetch.retry_delay_secs {
        return Err(ConfigError::ValidationError(
            "fetch.retry_max_delay_secs cannot be below fetch.retry_delay_secs".to_string(),
        ));
    }

    if config.grouping.skip_tokens.iter().any(|t| t.trim().is_empty()) {
        return Err(ConfigError::ValidationError(
            "grouping.skip_tokens cannot contain blank entries".to_string(),
        ));
    }

    Ok(())
}
