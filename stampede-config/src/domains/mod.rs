//! Domain-specific configuration modules

pub mod dispatch;
pub mod engine;
pub mod logging;
pub mod server;
pub mod utils;

use crate::error::ConfigResult;
use crate::validation::Validatable;
use serde::{Deserialize, Serialize};

/// Main Stampede configuration combining all domains
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StampedeConfig {
    /// Workflow engine connection
    #[serde(default)]
    pub engine: engine::EngineConfig,

    /// Dispatch request defaults
    #[serde(default)]
    pub dispatch: dispatch::DispatchConfig,

    /// HTTP server
    #[serde(default)]
    pub server: server::ServerConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: logging::LoggingConfig,
}

impl StampedeConfig {
    /// Validate all domain configurations
    pub fn validate_all(&self) -> ConfigResult<()> {
        self.engine.validate()?;
        self.dispatch.validate()?;
        self.server.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Generate a sample configuration file
    pub fn generate_sample() -> String {
        let config = StampedeConfig::default();
        serde_yaml::to_string(&config)
            .unwrap_or_else(|_| "# Failed to generate sample config".to_string())
    }
}
