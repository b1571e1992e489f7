//! Configuration loading and environment variable handling

use crate::domains::StampedeConfig;
use crate::error::{ConfigError, ConfigResult};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Configuration loader with environment variable support
pub struct ConfigLoader {
    /// Environment variable prefix
    prefix: String,
}

impl ConfigLoader {
    /// Create a new config loader with default prefix
    pub fn new() -> Self {
        Self {
            prefix: "STAMPEDE".to_string(),
        }
    }

    /// Create a new config loader with custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Load configuration from a YAML file with environment overrides
    pub fn from_file(&self, path: impl AsRef<Path>) -> ConfigResult<StampedeConfig> {
        let content = std::fs::read_to_string(path)?;
        let mut config: StampedeConfig = serde_yaml::from_str(&content)?;

        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env(&self) -> ConfigResult<StampedeConfig> {
        let mut config = StampedeConfig::default();
        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;
        Ok(config)
    }

    /// Load configuration with fallback chain
    pub fn load(&self, config_path: Option<impl AsRef<Path>>) -> ConfigResult<StampedeConfig> {
        match config_path {
            Some(path) => self.from_file(path),
            None => self.from_env(),
        }
    }

    /// Apply environment variable overrides to configuration
    fn apply_env_overrides(&self, config: &mut StampedeConfig) -> ConfigResult<()> {
        self.apply_engine_overrides(&mut config.engine)?;
        self.apply_dispatch_overrides(&mut config.dispatch)?;
        self.apply_server_overrides(&mut config.server)?;
        self.apply_logging_overrides(&mut config.logging)?;
        Ok(())
    }

    /// Apply engine config overrides
    fn apply_engine_overrides(
        &self,
        config: &mut crate::domains::engine::EngineConfig,
    ) -> ConfigResult<()> {
        if let Ok(kind) = self.get_env_var("ENGINE_KIND") {
            config.kind = crate::domains::engine::EngineKind::from_str(&kind)
                .map_err(|_| ConfigError::EnvError(format!("Invalid ENGINE_KIND: {}", kind)))?;
        }

        if let Ok(url) = self.get_env_var("ENGINE_URL") {
            config.base_url = url;
        }

        if let Ok(namespace) = self.get_env_var("ENGINE_NAMESPACE") {
            config.namespace = namespace;
        }

        if let Ok(timeout) = self.get_env_var("ENGINE_TIMEOUT") {
            let seconds: u64 = timeout
                .parse()
                .map_err(|e| ConfigError::EnvError(format!("Invalid ENGINE_TIMEOUT: {}", e)))?;
            config.timeout = Duration::from_secs(seconds);
        }

        Ok(())
    }

    /// Apply dispatch config overrides
    fn apply_dispatch_overrides(
        &self,
        config: &mut crate::domains::dispatch::DispatchConfig,
    ) -> ConfigResult<()> {
        if let Ok(seed) = self.get_env_var("SHUFFLE_SEED") {
            let seed: u64 = seed
                .parse()
                .map_err(|e| ConfigError::EnvError(format!("Invalid SHUFFLE_SEED: {}", e)))?;
            config.shuffle_seed = Some(seed);
        }

        if let Ok(max) = self.get_env_var("MAX_WORKFLOW_COUNT") {
            config.max_workflow_count = max.parse().map_err(|e| {
                ConfigError::EnvError(format!("Invalid MAX_WORKFLOW_COUNT: {}", e))
            })?;
        }

        Ok(())
    }

    /// Apply server config overrides
    fn apply_server_overrides(
        &self,
        config: &mut crate::domains::server::ServerConfig,
    ) -> ConfigResult<()> {
        if let Ok(bind) = self.get_env_var("SERVER_BIND_ADDRESS") {
            config.bind_address = bind;
        }

        // Plain PORT is honoured for hosting platforms; the prefixed variable wins
        if let Ok(port) = std::env::var("PORT") {
            config.port = port
                .parse()
                .map_err(|e| ConfigError::EnvError(format!("Invalid PORT: {}", e)))?;
        }

        if let Ok(port) = self.get_env_var("SERVER_PORT") {
            config.port = port
                .parse()
                .map_err(|e| ConfigError::EnvError(format!("Invalid SERVER_PORT: {}", e)))?;
        }

        Ok(())
    }

    /// Apply logging config overrides
    fn apply_logging_overrides(
        &self,
        config: &mut crate::domains::logging::LoggingConfig,
    ) -> ConfigResult<()> {
        if let Ok(log_level) = self.get_env_var("LOG_LEVEL") {
            config.level = crate::domains::logging::LogLevel::from_str(&log_level)
                .map_err(|_| ConfigError::EnvError(format!("Invalid LOG_LEVEL: {}", log_level)))?;
        }

        if let Ok(format) = self.get_env_var("LOG_FORMAT") {
            config.format = crate::domains::logging::LogFormat::from_str(&format)
                .map_err(|_| ConfigError::EnvError(format!("Invalid LOG_FORMAT: {}", format)))?;
        }

        Ok(())
    }

    /// Get environment variable with prefix
    fn get_env_var(&self, name: &str) -> Result<String, std::env::VarError> {
        std::env::var(format!("{}_{}", self.prefix, name))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
