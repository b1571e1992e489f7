//! Context types for dependency injection in REST API handlers
//!
//! Each endpoint group gets its own context struct; [`AppContext`] bundles
//! them as the router state and hands each handler just the part it needs.

use axum::extract::FromRef;
use stampede_config::DispatchConfig;
use stampede_core::{BatchDispatcher, EngineSession};
use std::sync::Arc;

/// Values used for dispatch request fields the caller leaves out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchDefaults {
    pub workflow_count: u64,
    /// Largest effective batch a request may launch
    pub max_workflow_count: u64,
    pub id_prefix: String,
}

impl Default for DispatchDefaults {
    fn default() -> Self {
        DispatchDefaults::from(&DispatchConfig::default())
    }
}

impl From<&DispatchConfig> for DispatchDefaults {
    fn from(config: &DispatchConfig) -> Self {
        Self {
            workflow_count: config.default_workflow_count,
            max_workflow_count: config.max_workflow_count,
            id_prefix: config.default_id_prefix.clone(),
        }
    }
}

/// Context for the dispatch endpoint
#[derive(Clone)]
pub struct DispatchContext {
    pub session: Arc<EngineSession>,
    pub dispatcher: Arc<BatchDispatcher>,
    pub defaults: DispatchDefaults,
}

/// Context for the run status endpoints
#[derive(Clone)]
pub struct StatusContext {
    pub session: Arc<EngineSession>,
}

/// Router state combining all endpoint contexts
#[derive(Clone)]
pub struct AppContext {
    pub dispatch: DispatchContext,
    pub status: StatusContext,
}

impl AppContext {
    pub fn new(
        session: Arc<EngineSession>,
        dispatcher: Arc<BatchDispatcher>,
        defaults: DispatchDefaults,
    ) -> Self {
        Self {
            dispatch: DispatchContext {
                session: session.clone(),
                dispatcher,
                defaults,
            },
            status: StatusContext { session },
        }
    }
}

impl FromRef<AppContext> for DispatchContext {
    fn from_ref(context: &AppContext) -> Self {
        context.dispatch.clone()
    }
}

impl FromRef<AppContext> for StatusContext {
    fn from_ref(context: &AppContext) -> Self {
        context.status.clone()
    }
}
