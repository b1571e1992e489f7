//! Prefix filtering of engine execution listings

use crate::attributes::SearchAttributes;
use crate::engine::ExecutionRecord;
use crate::error::EngineResult;
use futures::{Stream, StreamExt};
use tracing::{debug, error, warn};

/// Execution that matched the run prefix, with flattened attributes
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredExecution {
    pub id: String,
    pub attributes: SearchAttributes,
}

/// Keeps the executions of one test run out of an engine listing
#[derive(Debug, Clone)]
pub struct ExecutionFilter {
    prefix: String,
}

impl ExecutionFilter {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Exact, case-sensitive prefix match on the workflow id
    pub fn matches(&self, record: &ExecutionRecord) -> bool {
        !record.id.is_empty() && record.id.starts_with(&self.prefix)
    }

    /// Filter and normalize a single record
    pub fn accept(&self, record: ExecutionRecord) -> Option<FilteredExecution> {
        if !self.matches(&record) {
            return None;
        }
        let attributes = SearchAttributes::normalize(&record.raw_search_attributes);
        Some(FilteredExecution {
            id: record.id,
            attributes,
        })
    }

    /// Drain a listing into the executions of this run.
    ///
    /// Malformed items are logged and skipped. Any other listing error stops
    /// the scan; whatever was collected up to that point is returned.
    pub async fn collect<S>(&self, listing: S) -> Vec<FilteredExecution>
    where
        S: Stream<Item = EngineResult<ExecutionRecord>>,
    {
        let mut listing = std::pin::pin!(listing);
        let mut executions = Vec::new();
        let mut scanned = 0usize;

        while let Some(item) = listing.next().await {
            scanned += 1;
            match item {
                Ok(record) => {
                    if let Some(execution) = self.accept(record) {
                        executions.push(execution);
                    }
                }
                Err(e) if e.is_per_item() => {
                    warn!("Error processing individual execution: {}", e);
                }
                Err(e) => {
                    error!(
                        prefix = %self.prefix,
                        collected = executions.len(),
                        "Error listing executions: {}", e
                    );
                    break;
                }
            }
        }

        debug!(
            prefix = %self.prefix,
            scanned,
            matched = executions.len(),
            "Finished scanning executions"
        );
        executions
    }
}
