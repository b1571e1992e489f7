//! # Stampede REST API
//!
//! HTTP surface of the load-test driver:
//!
//! - `POST /start-workflows` launches a batch of workflows
//! - `GET /run-status?runPrefix=..` reports progress of a priority run
//! - `GET /run-status-fairness?runPrefix=..` reports progress of a fairness run
//! - `GET /health` answers liveness probes
//!
//! Handlers get their dependencies through context structs, so tests can run
//! the router against an in-memory engine.

pub mod app;
pub mod context;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;

// Re-export commonly used types
pub use app::{create_rest_app, AppConfig};
pub use context::{AppContext, DispatchContext, DispatchDefaults, StatusContext};
pub use errors::{RestError, RestResult};
pub use models::*;
