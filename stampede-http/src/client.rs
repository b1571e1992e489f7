//! HTTP engine client implementation

use crate::config::HttpEngineConfig;
use crate::errors::HttpError;
use crate::wire::{decode_page, DecodedPage, StartWorkflowBody};
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use reqwest::{Client, Response};
use stampede_core::{
    EngineConnector, EngineError, EngineResult, ExecutionRecord, StartWorkflowRequest,
    WorkflowEngine,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Longest slice of an error body kept in error messages
const MAX_ERROR_BODY: usize = 512;

/// Workflow engine reached over its HTTP API
#[derive(Debug, Clone)]
pub struct HttpEngine {
    client: Client,
    config: HttpEngineConfig,
}

#[derive(Debug, PartialEq, Eq)]
enum PageCursor {
    First,
    Next(String),
    Done,
}

impl PageCursor {
    /// Cursor after a page; a token seen earlier in this listing ends it
    fn advance(seen: &mut HashSet<String>, next: Option<String>) -> Self {
        match next {
            None => PageCursor::Done,
            Some(token) if !seen.insert(token.clone()) => {
                warn!(token = %token, "Engine repeated a page token, stopping listing");
                PageCursor::Done
            }
            Some(token) => PageCursor::Next(token),
        }
    }
}

impl HttpEngine {
    pub fn new(config: HttpEngineConfig) -> Result<Self, HttpError> {
        debug!(
            "Creating HTTP engine client with {}s timeout",
            config.timeout.as_secs()
        );
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &HttpEngineConfig {
        &self.config
    }

    /// Check that the engine answers for the configured namespace
    pub async fn describe_namespace(&self) -> Result<(), HttpError> {
        let url = self.config.endpoint(&[])?;
        let response = self.client.get(url).send().await?;
        check_status(response).await?;
        Ok(())
    }

    async fn fetch_page(&self, page_token: Option<&str>) -> Result<DecodedPage, HttpError> {
        let mut url = self.config.endpoint(&["workflows"])?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("pageSize", &self.config.page_size.to_string());
            if let Some(token) = page_token {
                query.append_pair("nextPageToken", token);
            }
        }

        let response = self.client.get(url).send().await?;
        let body = check_status(response).await?.text().await?;
        Ok(decode_page(&body)?)
    }
}

#[async_trait]
impl WorkflowEngine for HttpEngine {
    async fn start_workflow(&self, request: StartWorkflowRequest) -> EngineResult<()> {
        let url = self
            .config
            .endpoint(&["workflows", request.workflow_id.as_str()])
            .map_err(EngineError::from)?;
        let body = StartWorkflowBody::from(&request);

        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(HttpError::from)?;

        match check_status(response).await {
            Ok(_) => Ok(()),
            Err(HttpError::Status { status: 409, .. }) => {
                Err(EngineError::AlreadyStarted(request.workflow_id))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn list_executions(&self) -> BoxStream<'_, EngineResult<ExecutionRecord>> {
        let start = (PageCursor::First, HashSet::new());
        stream::unfold(start, move |(cursor, mut seen)| async move {
            let token = match cursor {
                PageCursor::Done => return None,
                PageCursor::First => None,
                PageCursor::Next(token) => Some(token),
            };

            match self.fetch_page(token.as_deref()).await {
                Ok(page) => {
                    let next = PageCursor::advance(&mut seen, page.next_page_token);
                    debug!(records = page.records.len(), "Fetched execution page");
                    Some((page.records, (next, seen)))
                }
                Err(e) => Some((vec![Err(EngineError::from(e))], (PageCursor::Done, seen))),
            }
        })
        .flat_map(stream::iter)
        .boxed()
    }
}

/// Turn a non-2xx response into [`HttpError::Status`]
async fn check_status(response: Response) -> Result<Response, HttpError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let mut message = response.text().await.unwrap_or_default();
    if message.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !message.is_char_boundary(cut) {
            cut -= 1;
        }
        message.truncate(cut);
    }
    if message.is_empty() {
        message = status.canonical_reason().unwrap_or("request failed").to_string();
    }

    Err(HttpError::Status {
        status: status.as_u16(),
        message,
    })
}

/// Connects to the engine over HTTP, verifying the namespace first
#[derive(Debug, Clone)]
pub struct HttpConnector {
    config: HttpEngineConfig,
}

impl HttpConnector {
    pub fn new(config: HttpEngineConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl EngineConnector for HttpConnector {
    async fn connect(&self) -> EngineResult<Arc<dyn WorkflowEngine>> {
        let engine = HttpEngine::new(self.config.clone())?;
        engine.describe_namespace().await?;
        info!(
            namespace = %self.config.namespace,
            "Connected to workflow engine at {}", self.config.base_url
        );
        Ok(Arc::new(engine))
    }

    fn target(&self) -> String {
        format!("{} (namespace {})", self.config.base_url, self.config.namespace)
    }
}
