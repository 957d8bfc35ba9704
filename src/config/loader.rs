//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use crate::config::schema::{LogFormat, RuntimeConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding `service.name`.
pub const ENV_SERVICE_NAME: &str = "RUNTIME_SERVICE_NAME";
/// Environment variable overriding `log.level`.
pub const ENV_LOG_LEVEL: &str = "RUNTIME_LOG_LEVEL";
/// Environment variable overriding `log.format`.
pub const ENV_LOG_FORMAT: &str = "RUNTIME_LOG_FORMAT";
/// Environment variable overriding `shutdown.timeout_secs`.
pub const ENV_SHUTDOWN_TIMEOUT: &str = "RUNTIME_SHUTDOWN_TIMEOUT_SECS";
/// Environment variable overriding `debug.port`.
pub const ENV_DEBUG_PORT: &str = "DEBUG_PORT";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Env { var: &'static str, reason: String },
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Env { var, reason } => write!(f, "Invalid {}: {}", var, reason),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load configuration: defaults, then the optional TOML file, then the
/// process environment. The result is validated before it is returned.
pub fn load_config(path: Option<&Path>) -> Result<RuntimeConfig, ConfigError> {
    load_with_env(path, |var| std::env::var(var).ok())
}

/// Like [`load_config`] but with an injectable environment lookup.
pub fn load_with_env<F>(path: Option<&Path>, lookup: F) -> Result<RuntimeConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => parse_file(path)?,
        None => RuntimeConfig::default(),
    };

    apply_env(&mut config, lookup)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

fn parse_file(path: &Path) -> Result<RuntimeConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    toml::from_str(&content).map_err(ConfigError::Parse)
}

/// Overlay environment variables onto `config`.
pub fn apply_env<F>(config: &mut RuntimeConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(name) = lookup(ENV_SERVICE_NAME) {
        config.service.name = name;
    }
    if let Some(level) = lookup(ENV_LOG_LEVEL) {
        config.log.level = level.to_ascii_lowercase();
    }
    if let Some(format) = lookup(ENV_LOG_FORMAT) {
        config.log.format = format
            .parse::<LogFormat>()
            .map_err(|reason| ConfigError::Env { var: ENV_LOG_FORMAT, reason })?;
    }
    if let Some(secs) = lookup(ENV_SHUTDOWN_TIMEOUT) {
        config.shutdown.timeout_secs = secs.trim().parse().map_err(|e| ConfigError::Env {
            var: ENV_SHUTDOWN_TIMEOUT,
            reason: format!("{e}"),
        })?;
    }
    if let Some(port) = lookup(ENV_DEBUG_PORT) {
        config.debug.port = port.trim().parse().map_err(|e| ConfigError::Env {
            var: ENV_DEBUG_PORT,
            reason: format!("{e}"),
        })?;
    }
    Ok(())
}
