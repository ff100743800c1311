use crate::config::types::{
    CheckerConfig, Config, OutputConfig, PollingConfig, PoolBackend, PoolConfig, ServerConfig,
    UserAgentConfig, WorkerConfig,
};
use crate::ConfigError;
use std::net::SocketAddr;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_server_config(&config.server)?;
    validate_pool_config(&config.pool)?;
    validate_polling_config(&config.polling)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_worker_config(&config.worker)?;
    validate_checker_config(&config.checker)?;
    validate_output_config(&config.output)?;
    Ok(())
}

fn validate_server_config(config: &ServerConfig) -> Result<(), ConfigError> {
    config.bind.parse::<SocketAddr>().map_err(|e| {
        ConfigError::Validation(format!("bind must be a socket address, got '{}': {}", config.bind, e))
    })?;
    Ok(())
}

fn validate_pool_config(config: &PoolConfig) -> Result<(), ConfigError> {
    if config.backend == PoolBackend::Scrapyd {
        validate_http_url("pool endpoint", &config.endpoint)?;
    }

    if config.queue.trim().is_empty() {
        return Err(ConfigError::Validation("queue cannot be empty".to_string()));
    }

    if config.max_concurrent_tasks < 1 || config.max_concurrent_tasks > 100 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_tasks must be between 1 and 100, got {}",
            config.max_concurrent_tasks
        )));
    }

    if config.task_retention < config.max_concurrent_tasks as usize {
        return Err(ConfigError::Validation(format!(
            "task_retention ({}) must be >= max_concurrent_tasks ({})",
            config.task_retention, config.max_concurrent_tasks
        )));
    }

    Ok(())
}

fn validate_polling_config(config: &PollingConfig) -> Result<(), ConfigError> {
    if config.max_interval_ms < config.initial_interval_ms {
        return Err(ConfigError::Validation(format!(
            "max_interval_ms ({}) must be >= initial_interval_ms ({})",
            config.max_interval_ms, config.initial_interval_ms
        )));
    }

    if !config.multiplier.is_finite() || config.multiplier < 1.0 {
        return Err(ConfigError::Validation(format!(
            "multiplier must be a finite number >= 1.0, got {}",
            config.multiplier
        )));
    }

    if config.timeout_ms == Some(0) {
        return Err(ConfigError::Validation(
            "timeout_ms must be > 0 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    // robots.txt product tokens are alphanumerics, '-' and '_'
    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters, hyphens and underscores, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

fn validate_worker_config(config: &WorkerConfig) -> Result<(), ConfigError> {
    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }
    Ok(())
}

fn validate_checker_config(config: &CheckerConfig) -> Result<(), ConfigError> {
    validate_http_url("checker endpoint", &config.endpoint)?;

    if config.default_language.trim().is_empty() {
        return Err(ConfigError::Validation(
            "default_language cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    if config.retention_hours == Some(0) {
        return Err(ConfigError::Validation(
            "retention_hours must be > 0 when set".to_string(),
        ));
    }

    Ok(())
}

fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            field, value
        )));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
