//! REST API error types and their HTTP responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use stampede_core::EngineError;
use thiserror::Error;

/// REST API specific error type
#[derive(Error, Debug)]
pub enum RestError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

/// Result type for REST operations
pub type RestResult<T> = Result<T, RestError>;

impl RestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RestError::NotFound(_) => StatusCode::NOT_FOUND,
            RestError::BadRequest(_) => StatusCode::BAD_REQUEST,
            RestError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            RestError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            RestError::NotFound(_) => "NOT_FOUND",
            RestError::BadRequest(_) => "BAD_REQUEST",
            RestError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            RestError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            RestError::NotFound(msg)
            | RestError::BadRequest(msg)
            | RestError::ServiceUnavailable(msg)
            | RestError::InternalError(msg) => msg,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        RestError::BadRequest(message.into())
    }
}

impl From<EngineError> for RestError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Connection(msg) => {
                RestError::ServiceUnavailable(format!("Workflow engine unavailable: {}", msg))
            }
            other => RestError::InternalError(other.to_string()),
        }
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }

        let error_response = json!({
            "error": {
                "code": self.code(),
                "message": self.message(),
                "status": status.as_u16()
            }
        });
        (status, Json(error_response)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_error_mapping() {
        let err: RestError = EngineError::Connection("refused".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.code(), "SERVICE_UNAVAILABLE");

        let err: RestError = EngineError::Api {
            status: 500,
            message: "boom".to_string(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_bad_request_response_status() {
        let response = RestError::bad_request("runPrefix is required").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
