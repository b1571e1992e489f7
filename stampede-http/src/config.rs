//! HTTP engine client configuration

use crate::errors::HttpError;
use stampede_config::EngineConfig;
use std::time::Duration;
use url::Url;

/// Settings the HTTP engine client needs
#[derive(Debug, Clone, PartialEq)]
pub struct HttpEngineConfig {
    pub base_url: Url,
    pub namespace: String,
    pub timeout: Duration,
    pub user_agent: String,
    pub page_size: u32,
}

impl HttpEngineConfig {
    pub fn new(base_url: &str, namespace: impl Into<String>) -> Result<Self, HttpError> {
        let defaults = EngineConfig::default();
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            namespace: namespace.into(),
            timeout: defaults.timeout,
            user_agent: defaults.user_agent,
            page_size: defaults.page_size,
        })
    }

    /// URL of `/api/v1/namespaces/{namespace}` followed by `segments`.
    /// Segments are percent-encoded, so workflow ids may hold any character.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, HttpError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| HttpError::InvalidUrl(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(["api", "v1", "namespaces", self.namespace.as_str()])
            .extend(segments);
        Ok(url)
    }
}

impl TryFrom<&EngineConfig> for HttpEngineConfig {
    type Error = HttpError;

    fn try_from(config: &EngineConfig) -> Result<Self, Self::Error> {
        Ok(Self {
            base_url: parse_base_url(&config.base_url)?,
            namespace: config.namespace.clone(),
            timeout: config.timeout,
            user_agent: config.user_agent.clone(),
            page_size: config.page_size,
        })
    }
}

fn parse_base_url(base_url: &str) -> Result<Url, HttpError> {
    Url::parse(base_url).map_err(|e| HttpError::InvalidUrl(format!("{}: {}", base_url, e)))
}
