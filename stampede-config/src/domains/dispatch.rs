//! Batch dispatch defaults

use crate::error::{ConfigError, ConfigResult};
use crate::validation::{validate_positive, validate_required_string, Validatable};
use serde::{Deserialize, Serialize};

/// Defaults applied to dispatch requests that leave fields out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Workflows launched when a request gives no count
    #[serde(default = "default_workflow_count")]
    pub default_workflow_count: u64,

    /// Largest batch a single request may launch
    #[serde(default = "default_max_workflow_count")]
    pub max_workflow_count: u64,

    /// Id prefix used when a request gives none
    #[serde(default = "default_id_prefix")]
    pub default_id_prefix: String,

    /// Fixed seed for explicit-count band shuffles
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shuffle_seed: Option<u64>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            default_workflow_count: default_workflow_count(),
            max_workflow_count: default_max_workflow_count(),
            default_id_prefix: default_id_prefix(),
            shuffle_seed: None,
        }
    }
}

impl Validatable for DispatchConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_required_string(&self.default_id_prefix, "default_id_prefix", self.domain_name())?;
        validate_positive(self.max_workflow_count, "max_workflow_count", self.domain_name())?;

        if self.default_workflow_count > self.max_workflow_count {
            return Err(ConfigError::DomainError {
                domain: self.domain_name().to_string(),
                message: format!(
                    "default_workflow_count ({}) exceeds max_workflow_count ({})",
                    self.default_workflow_count, self.max_workflow_count
                ),
            });
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "dispatch"
    }
}

fn default_workflow_count() -> u64 {
    100
}

fn default_max_workflow_count() -> u64 {
    100_000
}

fn default_id_prefix() -> String {
    "Testing".to_string()
}
