//! Subcommand implementations

use anyhow::{Context, Result};
use serde_json::Value;
use stampede_config::{DispatchConfig, StampedeConfig};
use stampede_core::{
    Band, BatchDispatcher, BatchRequest, DispatchReport, DispatchSettings, ExecutionFilter,
    LaunchMode, ProgressAggregator, WorkflowEngine,
};
use stampede_server::{build_connector, dispatch_settings, Server};
use std::sync::Arc;
use tracing::{info, warn};

/// Options of the `launch` subcommand
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub prefix: String,
    pub count: Option<u64>,
    pub mode: LaunchMode,
    pub bands: Vec<Band>,
    pub disable_fairness: bool,
}

impl LaunchOptions {
    /// Resolve defaults and check the batch against the configured limit
    pub fn into_batch_request(self, dispatch: &DispatchConfig) -> Result<BatchRequest> {
        let prefix = self.prefix.trim();
        if prefix.is_empty() {
            anyhow::bail!("Workflow id prefix cannot be empty");
        }
        let count = self.count.unwrap_or(dispatch.default_workflow_count);

        let request = match self.mode {
            LaunchMode::Priority => {
                if !self.bands.is_empty() {
                    warn!("Bands are ignored in priority mode");
                }
                BatchRequest::priority(prefix, count)
            }
            LaunchMode::Fairness => BatchRequest::fairness(prefix, count, self.bands),
        };

        let effective_count = request.effective_count();
        if effective_count > dispatch.max_workflow_count {
            anyhow::bail!(
                "Batch of {} workflows exceeds the limit of {} (dispatch.max_workflow_count)",
                effective_count,
                dispatch.max_workflow_count
            );
        }
        Ok(request.with_disable_fairness(self.disable_fairness))
    }
}

pub async fn serve(mut config: StampedeConfig, bind: Option<String>, port: Option<u16>) -> Result<()> {
    if let Some(bind) = bind {
        config.server.bind_address = bind;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    Server::new(config)?.start().await
}

/// Connect to the configured engine
async fn connect(config: &StampedeConfig) -> Result<Arc<dyn WorkflowEngine>> {
    let connector = build_connector(&config.engine)?;
    connector
        .connect()
        .await
        .with_context(|| format!("Failed to connect to workflow engine at {}", connector.target()))
}

pub async fn launch(config: &StampedeConfig, options: LaunchOptions) -> Result<()> {
    let request = options.into_batch_request(&config.dispatch)?;
    let engine = connect(config).await?;

    let report = launch_batch(engine.as_ref(), dispatch_settings(config), &request).await;
    println!("{}", serde_json::to_string_pretty(&report)?);

    if !report.is_complete() {
        warn!("{} of {} workflows failed to start", report.failed.len(), report.effective_count);
    }
    if let Err(e) = engine.close().await {
        warn!("Error closing workflow engine connection: {}", e);
    }
    Ok(())
}

pub async fn launch_batch(
    engine: &dyn WorkflowEngine,
    settings: DispatchSettings,
    request: &BatchRequest,
) -> DispatchReport {
    BatchDispatcher::new(settings).dispatch(engine, request).await
}

pub async fn status(config: &StampedeConfig, prefix: String, mode: LaunchMode) -> Result<()> {
    let engine = connect(config).await?;
    let summary = run_summary(engine.as_ref(), &prefix, mode).await?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    if let Err(e) = engine.close().await {
        warn!("Error closing workflow engine connection: {}", e);
    }
    Ok(())
}

/// Poll the engine once and aggregate the run with the given prefix
pub async fn run_summary(engine: &dyn WorkflowEngine, prefix: &str, mode: LaunchMode) -> Result<Value> {
    let prefix = prefix.trim();
    if prefix.is_empty() {
        anyhow::bail!("Run prefix cannot be empty");
    }

    let executions = ExecutionFilter::new(prefix)
        .collect(engine.list_executions())
        .await;
    info!(prefix = %prefix, matched = executions.len(), "Collected run executions");

    let summary = match mode {
        LaunchMode::Priority => serde_json::to_value(ProgressAggregator::priority(&executions))?,
        LaunchMode::Fairness => serde_json::to_value(ProgressAggregator::fairness(&executions))?,
    };
    Ok(summary)
}

pub fn print_config(config: &StampedeConfig) -> Result<()> {
    let yaml = serde_yaml::to_string(config).context("Failed to serialize configuration")?;
    print!("{}", yaml);
    Ok(())
}
