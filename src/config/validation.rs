use crate::config::types::{Config, CrawlerConfig, ExtractionConfig, OutputConfig, UserAgentConfig};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_extraction_config(&config.extraction)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_fetches < 1 || config.max_concurrent_fetches > 100 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_fetches must be between 1 and 100, got {}",
            config.max_concurrent_fetches
        )));
    }

    if config.request_timeout_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_ms must be >= 100ms, got {}ms",
            config.request_timeout_ms
        )));
    }

    Ok(())
}

/// Validates the client identity
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.value.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent value cannot be empty".to_string(),
        ));
    }

    // Header values cannot carry control characters
    if config.value.chars().any(|c| c.is_control()) {
        return Err(ConfigError::Validation(
            "user-agent value cannot contain control characters".to_string(),
        ));
    }

    Ok(())
}

/// Validates data-file extensions
fn validate_extraction_config(config: &ExtractionConfig) -> Result<(), ConfigError> {
    if config.file_extensions.is_empty() {
        return Err(ConfigError::Validation(
            "file_extensions must list at least one extension".to_string(),
        ));
    }

    for ext in &config.file_extensions {
        validate_extension(ext)?;
    }

    Ok(())
}

/// Validates a single extension such as `.json`
fn validate_extension(ext: &str) -> Result<(), ConfigError> {
    let Some(stem) = ext.strip_prefix('.') else {
        return Err(ConfigError::Validation(format!(
            "File extension '{}' must start with '.'",
            ext
        )));
    };

    if stem.is_empty() || !stem.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ConfigError::Validation(format!(
            "File extension '{}' must be a dot followed by letters or digits",
            ext
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.data_files_path.is_empty() {
        return Err(ConfigError::Validation(
            "data_files_path cannot be empty".to_string(),
        ));
    }

    if config.emails_dir.is_empty() {
        return Err(ConfigError::Validation(
            "emails_dir cannot be empty".to_string(),
        ));
    }

    if config.apis_dir.is_empty() {
        return Err(ConfigError::Validation("apis_dir cannot be empty".to_string()));
    }

    Ok(())
}
