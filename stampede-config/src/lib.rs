//! Domain-driven configuration management for Stampede
//!
//! Configuration is split by functional domain (engine, dispatch, server,
//! logging), each with its own defaults and validation. Files are YAML;
//! `STAMPEDE_*` environment variables override file values.

pub mod error;
pub mod loader;
pub mod validation;

// Domain-specific configuration modules
pub mod domains;

// Re-export main types
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;

// Re-export domain configurations
pub use domains::{
    dispatch::DispatchConfig,
    engine::{EngineConfig, EngineKind},
    logging::{LogFormat, LogLevel, LoggingConfig},
    server::ServerConfig,
    StampedeConfig,
};

// Re-export utilities
pub use domains::utils::serde_duration;
