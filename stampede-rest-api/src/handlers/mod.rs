//! HTTP request handlers

pub mod dispatch;
pub mod health;
pub mod status;

pub use dispatch::start_workflows;
pub use health::health_check;
pub use status::{run_status, run_status_fairness};
