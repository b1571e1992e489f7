//! In-process workflow engine
//!
//! Keeps started workflows in memory and lists them back with the search
//! attributes they were started with. Progress can be advanced by hand with
//! [`InMemoryEngine::set_progress`], standing in for the progress marker a
//! running workflow would publish.

use crate::attributes::ACTIVITIES_COMPLETED;
use crate::engine::{ExecutionRecord, StartWorkflowRequest, WorkflowEngine};
use crate::error::{EngineError, EngineResult};
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashSet;
use tracing::debug;

#[derive(Debug, Default)]
struct EngineState {
    started: Vec<StartWorkflowRequest>,
    records: Vec<ExecutionRecord>,
    rejected_ids: HashSet<String>,
}

/// Workflow engine backed by process memory
#[derive(Debug, Default)]
pub struct InMemoryEngine {
    state: RwLock<EngineState>,
}

impl InMemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every start request for `workflow_id` fail
    pub fn reject_workflow(&self, workflow_id: impl Into<String>) {
        self.state.write().rejected_ids.insert(workflow_id.into());
    }

    /// Add an execution to the listing without starting it
    pub fn insert_record(&self, record: ExecutionRecord) {
        self.state.write().records.push(record);
    }

    /// Publish a progress value for a started workflow; returns false if unknown
    pub fn set_progress(&self, workflow_id: &str, steps_completed: i64) -> bool {
        let mut state = self.state.write();
        match state.records.iter_mut().find(|r| r.id == workflow_id) {
            Some(record) => {
                record.raw_search_attributes.insert(
                    ACTIVITIES_COMPLETED.to_string(),
                    Value::Array(vec![Value::from(steps_completed)]),
                );
                true
            }
            None => false,
        }
    }

    /// Start requests accepted so far, in submission order
    pub fn started(&self) -> Vec<StartWorkflowRequest> {
        self.state.read().started.clone()
    }

    pub fn started_count(&self) -> usize {
        self.state.read().started.len()
    }
}

#[async_trait]
impl WorkflowEngine for InMemoryEngine {
    async fn start_workflow(&self, request: StartWorkflowRequest) -> EngineResult<()> {
        let mut state = self.state.write();

        if state.rejected_ids.contains(&request.workflow_id) {
            return Err(EngineError::Api {
                status: 503,
                message: format!("start rejected for {}", request.workflow_id),
            });
        }

        if state.records.iter().any(|r| r.id == request.workflow_id) {
            return Err(EngineError::AlreadyStarted(request.workflow_id));
        }

        // Engines report every search attribute as a list of values
        let raw_search_attributes = request
            .search_attributes
            .iter()
            .map(|(name, value)| (name.clone(), Value::Array(vec![value.clone()])))
            .collect();

        debug!(
            workflow_id = %request.workflow_id,
            task_queue = %request.task_queue,
            delay_secs = request.start_delay.as_secs(),
            "In-memory engine accepted workflow"
        );

        state.records.push(ExecutionRecord {
            id: request.workflow_id.clone(),
            raw_search_attributes,
        });
        state.started.push(request);
        Ok(())
    }

    fn list_executions(&self) -> BoxStream<'_, EngineResult<ExecutionRecord>> {
        let snapshot = self.state.read().records.clone();
        stream::iter(snapshot.into_iter().map(Ok)).boxed()
    }
}
