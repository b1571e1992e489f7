//! Workflow engine interface definitions
//!
//! Abstracts the external orchestration engine so that dispatch and status
//! aggregation can run against a live engine, an in-memory engine, or a test
//! double interchangeably.

use crate::error::{EngineError, EngineResult};
use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// Snapshot of one execution as reported by the engine's listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRecord {
    pub id: String,
    /// Attribute name -> list of scalar values, as the engine reports them
    #[serde(default)]
    pub raw_search_attributes: BTreeMap<String, Value>,
}

impl ExecutionRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            raw_search_attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: Value) -> Self {
        self.raw_search_attributes.insert(name.into(), value);
        self
    }
}

/// Scheduling metadata handed to the engine with a start request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchPriority {
    Priority {
        priority_key: u8,
    },
    Fairness {
        fairness_key: String,
        fairness_weight: u32,
    },
}

/// Request to start one workflow
#[derive(Debug, Clone, PartialEq)]
pub struct StartWorkflowRequest {
    pub workflow_id: String,
    pub workflow_type: String,
    pub task_queue: String,
    /// Initial workflow argument
    pub input: Value,
    /// Delay before the engine starts the workflow
    pub start_delay: Duration,
    /// Scalar search attributes to index the workflow under
    pub search_attributes: BTreeMap<String, Value>,
    pub priority: DispatchPriority,
}

/// Core workflow engine interface
#[async_trait]
pub trait WorkflowEngine: Send + Sync {
    /// Submit one workflow start
    async fn start_workflow(&self, request: StartWorkflowRequest) -> EngineResult<()>;

    /// Lazily list executions visible in the namespace.
    ///
    /// Items that cannot be decoded are yielded as per-item errors
    /// (see [`EngineError::is_per_item`]); any other error ends the listing.
    fn list_executions(&self) -> BoxStream<'_, EngineResult<ExecutionRecord>>;

    /// Release the underlying connection
    async fn close(&self) -> EngineResult<()> {
        Ok(())
    }
}

/// Establishes a connection to a workflow engine
#[async_trait]
pub trait EngineConnector: Send + Sync {
    async fn connect(&self) -> EngineResult<Arc<dyn WorkflowEngine>>;

    /// Human readable target, for logging
    fn target(&self) -> String;
}

/// Connector handing out an engine that already exists
#[derive(Clone)]
pub struct SharedEngineConnector {
    engine: Arc<dyn WorkflowEngine>,
    target: String,
}

impl SharedEngineConnector {
    pub fn new(engine: Arc<dyn WorkflowEngine>, target: impl Into<String>) -> Self {
        Self {
            engine,
            target: target.into(),
        }
    }
}

#[async_trait]
impl EngineConnector for SharedEngineConnector {
    async fn connect(&self) -> EngineResult<Arc<dyn WorkflowEngine>> {
        Ok(self.engine.clone())
    }

    fn target(&self) -> String {
        self.target.clone()
    }
}

/// Lazily established, shared engine connection.
///
/// The first caller connects; later callers reuse the same engine. A failed
/// connect leaves the session empty so the next caller tries again.
pub struct EngineSession {
    connector: Arc<dyn EngineConnector>,
    engine: OnceCell<Arc<dyn WorkflowEngine>>,
}

impl EngineSession {
    pub fn new(connector: Arc<dyn EngineConnector>) -> Self {
        Self {
            connector,
            engine: OnceCell::new(),
        }
    }

    /// Get the engine, connecting on first use
    pub async fn engine(&self) -> EngineResult<Arc<dyn WorkflowEngine>> {
        let engine = self
            .engine
            .get_or_try_init(|| async {
                info!("Connecting to workflow engine at {}", self.connector.target());
                self.connector.connect().await.map_err(|e| {
                    warn!("Workflow engine connection failed: {}", e);
                    match e {
                        EngineError::Connection(_) => e,
                        other => EngineError::Connection(other.to_string()),
                    }
                })
            })
            .await?;
        Ok(engine.clone())
    }

    pub fn is_connected(&self) -> bool {
        self.engine.initialized()
    }

    pub fn target(&self) -> String {
        self.connector.target()
    }

    /// Close the engine connection if one was established
    pub async fn close(&self) {
        if let Some(engine) = self.engine.get() {
            debug!("Closing workflow engine connection");
            if let Err(e) = engine.close().await {
                warn!("Error closing workflow engine connection: {}", e);
            }
        }
    }
}
