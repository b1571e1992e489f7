//! Progress aggregation for test runs
//!
//! Each workflow publishes a single "steps completed" counter. A group's
//! histogram entry for step `k` counts the workflows whose counter is at least
//! `k`, so within a group the curve never increases with `k`. Summaries are
//! rebuilt from scratch on every poll.

use crate::attributes::{ACTIVITIES_COMPLETED, FAIRNESS_KEY, FAIRNESS_WEIGHT, PRIORITY};
use crate::error::AttributeError;
use crate::filter::FilteredExecution;
use crate::schedule::PRIORITY_TIERS;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Sequential steps every load-test workflow runs
pub const STEPS_PER_WORKFLOW: u32 = 5;

/// Number of workflows in a group that reached a given step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySummary {
    pub activity_number: u32,
    pub number_completed: u64,
}

/// Progress of one priority tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrioritySummary {
    pub workflow_priority: u8,
    pub number_of_workflows: u64,
    pub activities: Vec<ActivitySummary>,
}

/// Progress of one fairness band, keyed by key and weight together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FairnessSummary {
    pub fairness_key: String,
    pub fairness_weight: i64,
    pub number_of_workflows: u64,
    pub activities: Vec<ActivitySummary>,
}

/// Status of a priority-mode run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityRunResults {
    pub total_workflows_in_test: u64,
    pub workflows_by_priority: Vec<PrioritySummary>,
}

/// Status of a fairness-mode run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FairnessRunResults {
    pub total_workflows_in_test: u64,
    pub workflows_by_fairness: Vec<FairnessSummary>,
}

/// Count one workflow that finished `steps` steps into a histogram.
///
/// Entry `k - 1` holds step `k`; entries are only created for steps that some
/// workflow has reached, always in ascending step order.
fn record_steps(activities: &mut Vec<ActivitySummary>, steps: u32) {
    for step in 1..=steps {
        match activities.get_mut(step as usize - 1) {
            Some(summary) => summary.number_completed += 1,
            None => activities.push(ActivitySummary {
                activity_number: step,
                number_completed: 1,
            }),
        }
    }
}

/// Progress marker clamped into `0..=STEPS_PER_WORKFLOW`
fn steps_completed(execution: &FilteredExecution) -> Result<u32, AttributeError> {
    let steps = execution
        .attributes
        .int(ACTIVITIES_COMPLETED)?
        .unwrap_or(0)
        .clamp(0, i64::from(STEPS_PER_WORKFLOW));
    Ok(steps as u32)
}

fn read_priority(execution: &FilteredExecution) -> Result<(i64, u32), AttributeError> {
    let tier = execution.attributes.int(PRIORITY)?.unwrap_or(0);
    Ok((tier, steps_completed(execution)?))
}

fn read_fairness(execution: &FilteredExecution) -> Result<(String, i64, u32), AttributeError> {
    let key = execution.attributes.text(FAIRNESS_KEY)?.unwrap_or_default();
    let weight = execution.attributes.int(FAIRNESS_WEIGHT)?.unwrap_or(0);
    Ok((key, weight, steps_completed(execution)?))
}

/// Builds per-group completion histograms from a run's executions
pub struct ProgressAggregator;

impl ProgressAggregator {
    /// Summarize a priority run into exactly five tiers, in tier order.
    ///
    /// Executions whose tier is outside 1..=5 still count towards the run
    /// total but not towards any tier.
    pub fn priority(executions: &[FilteredExecution]) -> PriorityRunResults {
        let mut tiers: Vec<PrioritySummary> = (1..=PRIORITY_TIERS)
            .map(|tier| PrioritySummary {
                workflow_priority: tier,
                number_of_workflows: 0,
                activities: Vec::new(),
            })
            .collect();

        for execution in executions {
            let (tier, steps) = match read_priority(execution) {
                Ok(values) => values,
                Err(e) => {
                    warn!(workflow_id = %execution.id, "Error processing workflow metadata: {}", e);
                    continue;
                }
            };

            if !(1..=i64::from(PRIORITY_TIERS)).contains(&tier) {
                debug!(workflow_id = %execution.id, tier, "Ignoring workflow outside priority tiers");
                continue;
            }

            let summary = &mut tiers[(tier - 1) as usize];
            summary.number_of_workflows += 1;
            record_steps(&mut summary.activities, steps);
        }

        PriorityRunResults {
            total_workflows_in_test: executions.len() as u64,
            workflows_by_priority: tiers,
        }
    }

    /// Summarize a fairness run, one group per (key, weight) pair, sorted by
    /// weight descending and then key ascending.
    pub fn fairness(executions: &[FilteredExecution]) -> FairnessRunResults {
        let mut groups: Vec<FairnessSummary> = Vec::new();
        let mut index: HashMap<(String, i64), usize> = HashMap::new();

        for execution in executions {
            let (key, weight, steps) = match read_fairness(execution) {
                Ok(values) => values,
                Err(e) => {
                    warn!(workflow_id = %execution.id, "Error processing fairness metadata: {}", e);
                    continue;
                }
            };

            let position = *index.entry((key.clone(), weight)).or_insert_with(|| {
                groups.push(FairnessSummary {
                    fairness_key: key,
                    fairness_weight: weight,
                    number_of_workflows: 0,
                    activities: Vec::new(),
                });
                groups.len() - 1
            });

            let summary = &mut groups[position];
            summary.number_of_workflows += 1;
            record_steps(&mut summary.activities, steps);
        }

        groups.sort_by(|a, b| {
            b.fairness_weight
                .cmp(&a.fairness_weight)
                .then_with(|| a.fairness_key.cmp(&b.fairness_key))
        });

        FairnessRunResults {
            total_workflows_in_test: executions.len() as u64,
            workflows_by_fairness: groups,
        }
    }
}
