//! Workflow engine client over the engine's HTTP API
//!
//! [`HttpConnector`] checks that the engine and namespace are reachable and
//! hands out an [`HttpEngine`], which implements
//! [`WorkflowEngine`](stampede_core::WorkflowEngine) with one request per
//! workflow start and a paged execution listing.

pub mod client;
pub mod config;
pub mod errors;
pub mod wire;

// Re-export main types for convenience
pub use client::{HttpConnector, HttpEngine};
pub use config::HttpEngineConfig;
pub use errors::HttpError;
