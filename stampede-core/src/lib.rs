//! Core domain for Stampede
//!
//! Stampede drives load tests against a workflow orchestration engine. This
//! crate holds the pieces that do not care how the engine is reached:
//! start-time convergence, tier and band assignment, sequential batch
//! dispatch, execution filtering and progress aggregation. The engine itself
//! sits behind the [`WorkflowEngine`] trait.

pub mod attributes;
pub mod bands;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod filter;
pub mod memory;
pub mod progress;
pub mod schedule;
pub mod types;

// Re-export commonly used types at the crate root
pub use attributes::SearchAttributes;
pub use bands::BandAssigner;
pub use dispatch::{BatchDispatcher, BatchPlan, DispatchReport, DispatchSettings};
pub use engine::{
    DispatchPriority, EngineConnector, EngineSession, ExecutionRecord, SharedEngineConnector,
    StartWorkflowRequest, WorkflowEngine,
};
pub use error::{AttributeError, EngineError, EngineResult};
pub use filter::{ExecutionFilter, FilteredExecution};
pub use memory::InMemoryEngine;
pub use progress::{
    ActivitySummary, FairnessRunResults, FairnessSummary, PriorityRunResults, PrioritySummary,
    ProgressAggregator, STEPS_PER_WORKFLOW,
};
pub use schedule::{Clock, DelayCalculator, FixedClock, StartTimeCalculator, SystemClock, TierAssigner};
pub use types::{default_bands, Assignment, Band, BatchRequest, LaunchMode, WorkflowLaunchSpec};
