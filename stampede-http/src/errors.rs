//! HTTP error types

use stampede_core::EngineError;

/// Error type for HTTP operations
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Engine returned {status}: {message}")]
    Status { status: u16, message: String },
}

impl From<HttpError> for EngineError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::NetworkError(e) if e.is_connect() || e.is_timeout() => {
                EngineError::Network(e.to_string())
            }
            HttpError::NetworkError(e) => match e.status() {
                Some(status) => EngineError::Api {
                    status: status.as_u16(),
                    message: e.to_string(),
                },
                None => EngineError::Network(e.to_string()),
            },
            HttpError::InvalidUrl(message) => EngineError::Other(format!("Invalid URL: {}", message)),
            HttpError::InvalidJson(e) => EngineError::Serialization(e),
            HttpError::Status { status, message } => EngineError::Api { status, message },
        }
    }
}
