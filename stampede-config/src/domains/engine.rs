//! Workflow engine connection configuration

use crate::error::ConfigResult;
use crate::validation::{validate_positive, validate_required_string, validate_url, Validatable};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Which engine implementation to run against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// The orchestration engine's HTTP API
    #[default]
    Http,
    /// In-process engine, for dry runs
    Memory,
}

impl FromStr for EngineKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "http" => Ok(EngineKind::Http),
            "memory" => Ok(EngineKind::Memory),
            _ => Err(format!("Invalid engine kind: {}", s)),
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineKind::Http => write!(f, "http"),
            EngineKind::Memory => write!(f, "memory"),
        }
    }
}

/// Workflow engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    #[serde(default)]
    pub kind: EngineKind,

    /// Base URL of the engine's HTTP API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Per-request timeout
    #[serde(
        with = "crate::domains::utils::serde_duration",
        default = "default_timeout"
    )]
    pub timeout: Duration,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_priority_task_queue")]
    pub priority_task_queue: String,

    #[serde(default = "default_fairness_task_queue")]
    pub fairness_task_queue: String,

    #[serde(default = "default_priority_workflow_type")]
    pub priority_workflow_type: String,

    #[serde(default = "default_fairness_workflow_type")]
    pub fairness_workflow_type: String,

    /// Executions requested per listing page
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            kind: EngineKind::default(),
            base_url: default_base_url(),
            namespace: default_namespace(),
            timeout: default_timeout(),
            user_agent: default_user_agent(),
            priority_task_queue: default_priority_task_queue(),
            fairness_task_queue: default_fairness_task_queue(),
            priority_workflow_type: default_priority_workflow_type(),
            fairness_workflow_type: default_fairness_workflow_type(),
            page_size: default_page_size(),
        }
    }
}

impl Validatable for EngineConfig {
    fn validate(&self) -> ConfigResult<()> {
        let domain = self.domain_name();

        if self.kind == EngineKind::Http {
            validate_url(&self.base_url, "base_url", domain)?;
        }
        validate_required_string(&self.namespace, "namespace", domain)?;
        validate_positive(self.timeout.as_secs(), "timeout", domain)?;
        validate_required_string(&self.user_agent, "user_agent", domain)?;
        validate_required_string(&self.priority_task_queue, "priority_task_queue", domain)?;
        validate_required_string(&self.fairness_task_queue, "fairness_task_queue", domain)?;
        validate_required_string(&self.priority_workflow_type, "priority_workflow_type", domain)?;
        validate_required_string(&self.fairness_workflow_type, "fairness_workflow_type", domain)?;
        validate_positive(self.page_size, "page_size", domain)?;

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "engine"
    }
}

fn default_base_url() -> String {
    "http://localhost:7243".to_string()
}

fn default_namespace() -> String {
    "default".to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_user_agent() -> String {
    format!("stampede/{}", env!("CARGO_PKG_VERSION"))
}

fn default_priority_task_queue() -> String {
    "priority-queue".to_string()
}

fn default_fairness_task_queue() -> String {
    "fairness-queue".to_string()
}

fn default_priority_workflow_type() -> String {
    "priorityWorkflow".to_string()
}

fn default_fairness_workflow_type() -> String {
    "fairnessWorkflow".to_string()
}

fn default_page_size() -> u32 {
    1000
}
