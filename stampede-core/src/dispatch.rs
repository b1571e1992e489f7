//! Batch dispatch
//!
//! A batch is planned up front (effective size, shared target instant and the
//! tier or band of every ordinal) and then submitted one workflow at a time.
//! Each start delay is measured from the clock at submission, so delays shrink
//! as the loop progresses and every workflow converges on the same target.

use crate::attributes::{ACTIVITIES_COMPLETED, FAIRNESS_KEY, FAIRNESS_WEIGHT, PRIORITY};
use crate::bands::BandAssigner;
use crate::engine::{DispatchPriority, StartWorkflowRequest, WorkflowEngine};
use crate::schedule::{Clock, DelayCalculator, StartTimeCalculator, SystemClock, TierAssigner};
use crate::types::{Assignment, Band, BatchRequest, LaunchMode, WorkflowLaunchSpec};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub const DEFAULT_PRIORITY_QUEUE: &str = "priority-queue";
pub const DEFAULT_FAIRNESS_QUEUE: &str = "fairness-queue";
pub const DEFAULT_PRIORITY_WORKFLOW: &str = "priorityWorkflow";
pub const DEFAULT_FAIRNESS_WORKFLOW: &str = "fairnessWorkflow";

/// Engine-side names and randomness used by the dispatcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchSettings {
    pub priority_task_queue: String,
    pub fairness_task_queue: String,
    pub priority_workflow_type: String,
    pub fairness_workflow_type: String,
    /// Seed for the explicit-count shuffle; entropy when unset
    pub shuffle_seed: Option<u64>,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            priority_task_queue: DEFAULT_PRIORITY_QUEUE.to_string(),
            fairness_task_queue: DEFAULT_FAIRNESS_QUEUE.to_string(),
            priority_workflow_type: DEFAULT_PRIORITY_WORKFLOW.to_string(),
            fairness_workflow_type: DEFAULT_FAIRNESS_WORKFLOW.to_string(),
            shuffle_seed: None,
        }
    }
}

impl DispatchSettings {
    pub fn task_queue(&self, mode: LaunchMode) -> &str {
        match mode {
            LaunchMode::Priority => &self.priority_task_queue,
            LaunchMode::Fairness => &self.fairness_task_queue,
        }
    }

    pub fn workflow_type(&self, mode: LaunchMode) -> &str {
        match mode {
            LaunchMode::Priority => &self.priority_workflow_type,
            LaunchMode::Fairness => &self.fairness_workflow_type,
        }
    }
}

/// How ordinals of a plan map to their tier or band
#[derive(Debug, Clone, PartialEq, Eq)]
enum PlanAssignments {
    /// Tier derived from the ordinal and the batch size
    Tiers,
    /// Bands handed out round-robin by ordinal
    RoundRobin(BandAssigner),
    /// Explicit-count multiset, already shuffled into submission order
    Shuffled(Vec<Band>),
}

/// Pure planning result for one batch.
///
/// Tiers and round-robin bands are derived per ordinal, so planning does not
/// grow with the batch size. Only explicit band counts are materialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchPlan {
    pub mode: LaunchMode,
    pub effective_count: u64,
    pub target_start: DateTime<Utc>,
    assignments: PlanAssignments,
}

impl BatchPlan {
    pub fn build<R: Rng + ?Sized>(request: &BatchRequest, now: DateTime<Utc>, rng: &mut R) -> Self {
        let (effective_count, assignments) = match request.mode {
            LaunchMode::Priority => (request.count, PlanAssignments::Tiers),
            LaunchMode::Fairness => {
                let assigner = BandAssigner::new(request.bands.clone());
                let effective_count = assigner.effective_count(request.count);
                if assigner.has_explicit_counts() {
                    let shuffled = assigner.assign(request.count, rng);
                    (effective_count, PlanAssignments::Shuffled(shuffled))
                } else {
                    (effective_count, PlanAssignments::RoundRobin(assigner))
                }
            }
        };

        Self {
            mode: request.mode,
            effective_count,
            target_start: StartTimeCalculator::target_start(effective_count, request.mode, now),
            assignments,
        }
    }

    /// Assignment of a 1-based ordinal; `None` outside the batch
    pub fn assignment(&self, ordinal: u64) -> Option<Assignment> {
        if ordinal == 0 || ordinal > self.effective_count {
            return None;
        }
        match &self.assignments {
            PlanAssignments::Tiers => Some(Assignment::Tier(TierAssigner::tier_for(
                ordinal,
                self.effective_count,
            ))),
            PlanAssignments::RoundRobin(assigner) => {
                Some(Assignment::from(assigner.round_robin(ordinal)))
            }
            PlanAssignments::Shuffled(bands) => usize::try_from(ordinal - 1)
                .ok()
                .and_then(|index| bands.get(index))
                .map(Assignment::from),
        }
    }

    /// Assignments in submission order
    pub fn assignments(&self) -> impl Iterator<Item = Assignment> + '_ {
        (1..=self.effective_count).map_while(move |ordinal| self.assignment(ordinal))
    }
}

/// Outcome of one dispatch run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchReport {
    pub effective_count: u64,
    pub submitted: u64,
    /// Ids whose start call failed
    pub failed: Vec<String>,
    pub target_start: DateTime<Utc>,
}

impl DispatchReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Submits a batch of workflows, sequentially, to a workflow engine
pub struct BatchDispatcher {
    settings: DispatchSettings,
    clock: Arc<dyn Clock>,
}

impl BatchDispatcher {
    pub fn new(settings: DispatchSettings) -> Self {
        Self {
            settings,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn settings(&self) -> &DispatchSettings {
        &self.settings
    }

    /// Plan a batch against the current clock
    pub fn plan(&self, request: &BatchRequest) -> BatchPlan {
        let now = self.clock.now();
        match self.settings.shuffle_seed {
            Some(seed) => BatchPlan::build(request, now, &mut StdRng::seed_from_u64(seed)),
            None => BatchPlan::build(request, now, &mut StdRng::from_os_rng()),
        }
    }

    /// Submit every workflow of the batch.
    ///
    /// Individual start failures are logged and recorded in the report; the
    /// loop always runs to the end.
    pub async fn dispatch(&self, engine: &dyn WorkflowEngine, request: &BatchRequest) -> DispatchReport {
        let plan = self.plan(request);
        let started_at = Instant::now();

        info!(
            prefix = %request.id_prefix,
            mode = %plan.mode,
            count = plan.effective_count,
            target_start = %plan.target_start,
            "Starting workflow batch"
        );

        let mut report = DispatchReport {
            effective_count: plan.effective_count,
            submitted: 0,
            failed: Vec::new(),
            target_start: plan.target_start,
        };

        for ordinal in 1..=plan.effective_count {
            let Some(assignment) = plan.assignment(ordinal) else {
                break;
            };
            let launch = WorkflowLaunchSpec {
                id: request.workflow_id(ordinal),
                task_queue: self.settings.task_queue(plan.mode).to_string(),
                start_delay_secs: DelayCalculator::delay_seconds(plan.target_start, self.clock.now()),
                assignment,
            };
            let workflow_id = launch.id.clone();
            let start = self.start_request(launch, plan.mode, request.disable_fairness);

            debug!(
                workflow_id = %workflow_id,
                delay_secs = start.start_delay.as_secs(),
                "Submitting workflow"
            );

            match engine.start_workflow(start).await {
                Ok(()) => report.submitted += 1,
                Err(e) => {
                    warn!(workflow_id = %workflow_id, "Failed to start workflow: {}", e);
                    report.failed.push(workflow_id);
                }
            }
        }

        info!(
            prefix = %request.id_prefix,
            submitted = report.submitted,
            failed = report.failed.len(),
            elapsed_ms = started_at.elapsed().as_millis() as u64,
            "Finished workflow batch"
        );
        report
    }

    fn start_request(
        &self,
        launch: WorkflowLaunchSpec,
        mode: LaunchMode,
        disable_fairness: bool,
    ) -> StartWorkflowRequest {
        let mut search_attributes: BTreeMap<String, Value> = BTreeMap::new();
        search_attributes.insert(ACTIVITIES_COMPLETED.to_string(), json!(0));

        let (input, priority) = match launch.assignment {
            Assignment::Tier(tier) => {
                search_attributes.insert(PRIORITY.to_string(), json!(tier));
                (
                    json!({ "priority": tier }),
                    DispatchPriority::Priority { priority_key: tier },
                )
            }
            Assignment::Band { key, weight } => {
                let weight = if disable_fairness { 0 } else { weight };
                search_attributes.insert(FAIRNESS_KEY.to_string(), json!(key));
                search_attributes.insert(FAIRNESS_WEIGHT.to_string(), json!(weight));
                (
                    json!({
                        "fairnessKey": key,
                        "fairnessWeight": weight,
                        "disableFairness": disable_fairness,
                    }),
                    DispatchPriority::Fairness {
                        fairness_key: key,
                        fairness_weight: weight,
                    },
                )
            }
        };

        StartWorkflowRequest {
            workflow_id: launch.id,
            workflow_type: self.settings.workflow_type(mode).to_string(),
            task_queue: launch.task_queue,
            input,
            start_delay: Duration::from_secs(launch.start_delay_secs),
            search_attributes,
            priority,
        }
    }
}
