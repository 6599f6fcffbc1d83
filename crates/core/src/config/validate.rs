use super::{types::Config, ConfigError};

/// Validate a loaded configuration beyond what deserialization checks.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let base_url = config.store.base_url.trim();
    if base_url.is_empty() {
        return Err(ConfigError::ValidationError(
            "store.base_url must not be empty".to_string(),
        ));
    }
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ConfigError::ValidationError(format!(
            "store.base_url must be an http(s) URL, got '{}'",
            base_url
        )));
    }

    if config.store.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "store.timeout_secs must be at least 1".to_string(),
        ));
    }

    if config.events.buffer == 0 {
        return Err(ConfigError::ValidationError(
            "events.buffer must be at least 1".to_string(),
        ));
    }

    Ok(())
}
