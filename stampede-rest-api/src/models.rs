//! Request and response bodies

use crate::context::DispatchDefaults;
use crate::errors::{RestError, RestResult};
use serde::{Deserialize, Serialize};
use stampede_core::{Band, BatchRequest, LaunchMode};

/// Body of `POST /start-workflows`; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartWorkflowsRequest {
    #[serde(default, alias = "idPrefix")]
    pub workflow_id_prefix: Option<String>,

    #[serde(default, alias = "count")]
    pub number_of_workflows: Option<u64>,

    /// `priority` or `fairness`; anything else means priority
    #[serde(default)]
    pub mode: Option<String>,

    #[serde(default)]
    pub bands: Option<Vec<Band>>,

    #[serde(default)]
    pub disable_fairness: Option<bool>,
}

impl StartWorkflowsRequest {
    /// Parse a raw body; an empty body means "all defaults"
    pub fn from_body(body: &[u8]) -> RestResult<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice::<Option<Self>>(body)
            .map(Option::unwrap_or_default)
            .map_err(|e| RestError::bad_request(format!("Invalid dispatch request body: {}", e)))
    }

    /// Resolve defaults and check the request
    pub fn into_batch_request(self, defaults: &DispatchDefaults) -> RestResult<BatchRequest> {
        let id_prefix = self
            .workflow_id_prefix
            .map(|prefix| prefix.trim().to_string())
            .filter(|prefix| !prefix.is_empty())
            .unwrap_or_else(|| defaults.id_prefix.clone());

        let bands = self.bands.unwrap_or_default();
        for band in &bands {
            band.validate()
                .map_err(|e| RestError::bad_request(format!("Invalid band '{}': {}", band.key, e)))?;
        }

        let request = BatchRequest {
            id_prefix,
            count: self.number_of_workflows.unwrap_or(defaults.workflow_count),
            mode: self
                .mode
                .as_deref()
                .map(LaunchMode::from_request)
                .unwrap_or_default(),
            bands,
            disable_fairness: self.disable_fairness.unwrap_or(false),
        };

        let effective_count = request.effective_count();
        if effective_count > defaults.max_workflow_count {
            return Err(RestError::bad_request(format!(
                "Batch of {} workflows exceeds the limit of {}",
                effective_count, defaults.max_workflow_count
            )));
        }
        Ok(request)
    }
}

/// Response of `POST /start-workflows`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchResponse {
    pub status: String,
}

impl DispatchResponse {
    pub fn done() -> Self {
        Self {
            status: "done".to_string(),
        }
    }
}

/// Query string of the run status endpoints
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStatusQuery {
    #[serde(default)]
    pub run_prefix: Option<String>,
}

impl RunStatusQuery {
    pub fn required_prefix(self) -> RestResult<String> {
        self.run_prefix
            .filter(|prefix| !prefix.is_empty())
            .ok_or_else(|| RestError::bad_request("runPrefix query parameter is required"))
    }
}

/// Response of `GET /health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Whether the workflow engine session has been established
    pub engine_connected: bool,
}
