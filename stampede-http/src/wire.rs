//! JSON shapes exchanged with the engine's HTTP API
//!
//! Start request (`POST .../workflows/{workflowId}`):
//!
//! ```json
//! {
//!   "workflowId": "Run1-1",
//!   "workflowType": {"name": "priorityWorkflow"},
//!   "taskQueue": {"name": "priority-queue"},
//!   "input": [{"priority": 1}],
//!   "workflowStartDelay": "5s",
//!   "searchAttributes": {"Priority": 1, "ActivitiesCompleted": 0},
//!   "priority": {"priorityKey": 1}
//! }
//! ```
//!
//! Listing page (`GET .../workflows`):
//!
//! ```json
//! {
//!   "executions": [
//!     {"execution": {"workflowId": "Run1-1", "runId": "..."},
//!      "searchAttributes": {"indexedFields": {"Priority": [1]}}}
//!   ],
//!   "nextPageToken": "..."
//! }
//! ```
//!
//! Pages are decoded one execution at a time so that a single malformed entry
//! does not spoil the rest of the page.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use stampede_core::{DispatchPriority, EngineError, EngineResult, ExecutionRecord, StartWorkflowRequest};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedRef {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority_key: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fairness_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fairness_weight: Option<u32>,
}

impl From<&DispatchPriority> for PriorityBody {
    fn from(priority: &DispatchPriority) -> Self {
        match priority {
            DispatchPriority::Priority { priority_key } => Self {
                priority_key: Some(*priority_key),
                fairness_key: None,
                fairness_weight: None,
            },
            DispatchPriority::Fairness {
                fairness_key,
                fairness_weight,
            } => Self {
                priority_key: None,
                fairness_key: Some(fairness_key.clone()),
                fairness_weight: Some(*fairness_weight),
            },
        }
    }
}

/// Body of a start-workflow call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartWorkflowBody {
    pub workflow_id: String,
    pub workflow_type: NamedRef,
    pub task_queue: NamedRef,
    pub input: Vec<Value>,
    pub workflow_start_delay: String,
    pub search_attributes: BTreeMap<String, Value>,
    pub priority: PriorityBody,
}

impl From<&StartWorkflowRequest> for StartWorkflowBody {
    fn from(request: &StartWorkflowRequest) -> Self {
        Self {
            workflow_id: request.workflow_id.clone(),
            workflow_type: NamedRef {
                name: request.workflow_type.clone(),
            },
            task_queue: NamedRef {
                name: request.task_queue.clone(),
            },
            input: vec![request.input.clone()],
            workflow_start_delay: format!("{}s", request.start_delay.as_secs()),
            search_attributes: request.search_attributes.clone(),
            priority: PriorityBody::from(&request.priority),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPage {
    #[serde(default)]
    executions: Vec<Value>,
    #[serde(default)]
    next_page_token: Option<String>,
}

/// One listing page after lenient decoding
#[derive(Debug)]
pub struct DecodedPage {
    pub records: Vec<EngineResult<ExecutionRecord>>,
    /// Token for the next page; `None` when this was the last page
    pub next_page_token: Option<String>,
}

/// Decode a listing page body.
///
/// Fails only when the body as a whole is not a page. Entries that cannot be
/// read become [`EngineError::MalformedRecord`] items.
pub fn decode_page(body: &str) -> Result<DecodedPage, serde_json::Error> {
    let raw: RawPage = serde_json::from_str(body)?;
    Ok(DecodedPage {
        records: raw.executions.iter().map(decode_execution).collect(),
        next_page_token: raw.next_page_token.filter(|token| !token.is_empty()),
    })
}

fn decode_execution(entry: &Value) -> EngineResult<ExecutionRecord> {
    let id = entry
        .pointer("/execution/workflowId")
        .or_else(|| entry.get("workflowId"))
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| EngineError::MalformedRecord(format!("execution without workflow id: {}", entry)))?;

    let raw_search_attributes = match entry.get("searchAttributes") {
        None | Some(Value::Null) => BTreeMap::new(),
        Some(Value::Object(attributes)) => attribute_map(attributes).ok_or_else(|| {
            EngineError::MalformedRecord(format!("search attributes of {} are not a map", id))
        })?,
        Some(_) => {
            return Err(EngineError::MalformedRecord(format!(
                "search attributes of {} are not a map",
                id
            )))
        }
    };

    Ok(ExecutionRecord {
        id: id.to_string(),
        raw_search_attributes,
    })
}

// Attributes arrive either wrapped in `indexedFields` or as a plain map
fn attribute_map(attributes: &Map<String, Value>) -> Option<BTreeMap<String, Value>> {
    let fields = match attributes.get("indexedFields") {
        Some(Value::Object(fields)) => fields,
        Some(Value::Null) => return Some(BTreeMap::new()),
        Some(_) => return None,
        None => attributes,
    };
    Some(fields.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn test_start_body_priority() {
        let mut search_attributes = BTreeMap::new();
        search_attributes.insert("Priority".to_string(), json!(2));
        search_attributes.insert("ActivitiesCompleted".to_string(), json!(0));
        let request = StartWorkflowRequest {
            workflow_id: "Run1-4".to_string(),
            workflow_type: "priorityWorkflow".to_string(),
            task_queue: "priority-queue".to_string(),
            input: json!({"priority": 2}),
            start_delay: Duration::from_secs(6),
            search_attributes,
            priority: DispatchPriority::Priority { priority_key: 2 },
        };

        let body = serde_json::to_value(StartWorkflowBody::from(&request)).unwrap();
        assert_eq!(
            body,
            json!({
                "workflowId": "Run1-4",
                "workflowType": {"name": "priorityWorkflow"},
                "taskQueue": {"name": "priority-queue"},
                "input": [{"priority": 2}],
                "workflowStartDelay": "6s",
                "searchAttributes": {"ActivitiesCompleted": 0, "Priority": 2},
                "priority": {"priorityKey": 2}
            })
        );
    }

    #[test]
    fn test_priority_body_fairness() {
        let body = PriorityBody::from(&DispatchPriority::Fairness {
            fairness_key: "gold".to_string(),
            fairness_weight: 0,
        });
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            json!({"fairnessKey": "gold", "fairnessWeight": 0})
        );
    }

    #[test]
    fn test_decode_recorded_page() {
        let body = r#"{
            "executions": [
                {
                    "execution": {"workflowId": "Run1-1", "runId": "9b2c"},
                    "type": {"name": "priorityWorkflow"},
                    "searchAttributes": {"indexedFields": {"Priority": [1], "ActivitiesCompleted": [3]}}
                },
                {
                    "workflowId": "Run1-2",
                    "searchAttributes": {"Priority": 2}
                },
                {
                    "execution": {"runId": "orphan"}
                },
                {
                    "execution": {"workflowId": "Run1-3"}
                }
            ],
            "nextPageToken": "CiQKEg"
        }"#;

        let page = decode_page(body).unwrap();
        assert_eq!(page.next_page_token.as_deref(), Some("CiQKEg"));
        assert_eq!(page.records.len(), 4);

        let first = page.records[0].as_ref().unwrap();
        assert_eq!(first.id, "Run1-1");
        assert_eq!(first.raw_search_attributes.get("ActivitiesCompleted"), Some(&json!([3])));

        let second = page.records[1].as_ref().unwrap();
        assert_eq!(second.raw_search_attributes.get("Priority"), Some(&json!(2)));

        assert!(matches!(page.records[2], Err(EngineError::MalformedRecord(_))));

        let fourth = page.records[3].as_ref().unwrap();
        assert!(fourth.raw_search_attributes.is_empty());
    }

    #[test]
    fn test_decode_last_page() {
        let page = decode_page(r#"{"executions": [], "nextPageToken": ""}"#).unwrap();
        assert!(page.records.is_empty());
        assert_eq!(page.next_page_token, None);

        let page = decode_page("{}").unwrap();
        assert_eq!(page.next_page_token, None);
    }

    #[test]
    fn test_decode_bad_attributes_is_per_item() {
        let page = decode_page(
            r#"{"executions": [{"workflowId": "Run-1", "searchAttributes": [1, 2]}]}"#,
        )
        .unwrap();
        assert!(page.records[0].as_ref().unwrap_err().is_per_item());
    }

    #[test]
    fn test_decode_invalid_page() {
        assert!(decode_page("<html>bad gateway</html>").is_err());
        assert!(decode_page(r#"{"executions": 5}"#).is_err());
    }
}
