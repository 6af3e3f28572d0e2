//! Configuration module for the Kapili RPC server.
//!
//! Settings are layered: built-in defaults, then an optional file (TOML, YAML, JSON),
//! then environment variables prefixed with `KAPILI` using `__` as the separator
//! (for example `KAPILI__SERVER__ADDRESS`). The merged result is validated
//! before use.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use config::{Config, ConfigError as ExternalConfigError, Environment, File, FileFormat};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::error::config::ConfigError;

pub mod limits;
pub mod server;

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Default environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "KAPILI";

/// A trait for types that can be validated.
pub trait Validate {
    /// Validates that the configuration is correct.
    ///
    /// # Returns
    ///
    /// * `Ok(())` if the configuration is valid
    /// * `Err(ConfigError)` if the configuration is invalid
    fn validate(&self) -> ConfigResult<()>;
}

/// Main configuration for the Kapili RPC server.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct KapiliConfig {
    /// Server configuration
    pub server: server::ServerConfig,

    /// Resource limits configuration
    pub limits: limits::LimitsConfig,

    /// Log configuration
    pub log: LogConfig,
}

impl Validate for KapiliConfig {
    fn validate(&self) -> ConfigResult<()> {
        self.server.validate()?;
        self.limits.validate()?;
        self.log.validate()?;
        Ok(())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Whether to log in JSON format
    pub json: bool,

    /// Whether to include source code locations in logs
    pub source_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            source_location: true,
        }
    }
}

impl Validate for LogConfig {
    fn validate(&self) -> ConfigResult<()> {
        match self.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            _ => Err(ConfigError::ValidationError(format!(
                "Invalid log level: {}",
                self.level
            ))),
        }
    }
}

/// Configuration loader for the Kapili RPC server.
#[derive(Debug)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
    env_prefix: String,
}

impl ConfigLoader {
    /// Creates a new configuration loader.
    ///
    /// # Arguments
    ///
    /// * `config_path` - Optional path to the configuration file
    /// * `env_prefix` - Prefix for environment variables that override configuration values
    pub fn new<P: AsRef<Path>>(config_path: Option<P>, env_prefix: &str) -> Self {
        Self {
            config_path: config_path.map(|p| p.as_ref().to_path_buf()),
            env_prefix: env_prefix.to_string(),
        }
    }

    /// Loads the configuration from a file and environment variables.
    ///
    /// # Returns
    ///
    /// * `Ok(KapiliConfig)` if the configuration was loaded successfully
    /// * `Err(ConfigError)` if there was an error loading the configuration
    pub fn load(&self) -> ConfigResult<KapiliConfig> {
        let mut builder = Config::builder().add_source(
            Config::try_from(&KapiliConfig::default())
                .map_err(|e| ConfigError::ParseError(e.to_string()))?,
        );

        if let Some(path) = &self.config_path {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.clone()));
            }

            let format = match path.extension().and_then(|ext| ext.to_str()) {
                Some("toml") => FileFormat::Toml,
                Some("json") => FileFormat::Json,
                Some("yaml" | "yml") => FileFormat::Yaml,
                _ => {
                    return Err(ConfigError::ParseError(format!(
                        "Unsupported file extension for: {path:?}"
                    )))
                }
            };
            builder = builder.add_source(File::from(path.as_path()).format(format));
        }

        builder = builder.add_source(
            Environment::with_prefix(&self.env_prefix)
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().map_err(|e| match e {
            ExternalConfigError::NotFound(path) => ConfigError::FileNotFound(PathBuf::from(path)),
            ExternalConfigError::FileParse { uri, cause } => ConfigError::ParseError(format!(
                "Error parsing {}: {cause}",
                uri.unwrap_or_else(|| "config file".to_string())
            )),
            other => ConfigError::ParseError(other.to_string()),
        })?;

        let kapili_config: KapiliConfig = config
            .try_deserialize()
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        kapili_config.validate()?;

        Ok(kapili_config)
    }
}

/// Global configuration accessor.
#[derive(Debug, Clone)]
pub struct GlobalConfig {
    config: Arc<KapiliConfig>,
}

impl GlobalConfig {
    /// Creates a new global configuration.
    pub fn new(config: KapiliConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Returns a reference to the configuration.
    pub fn get(&self) -> &KapiliConfig {
        &self.config
    }
}

static GLOBAL_CONFIG: OnceCell<GlobalConfig> = OnceCell::new();

/// Initialize the global configuration.
///
/// Only the first call wins; later calls are logged and ignored.
pub fn init_global_config(config: KapiliConfig) {
    if GLOBAL_CONFIG.set(GlobalConfig::new(config)).is_err() {
        tracing::warn!("Global configuration was already initialized, ignoring new configuration");
    }
}

/// Get the global configuration, if it has been initialized.
pub fn get_global_config() -> Option<GlobalConfig> {
    GLOBAL_CONFIG.get().cloned()
}

impl From<&KapiliConfig> for crate::protocol::jsonrpc::DispatcherOptions {
    fn from(config: &KapiliConfig) -> Self {
        Self {
            request_timeout: config.server.request_timeout(),
            max_batch_size: config.limits.max_batch_size,
        }
    }
}
