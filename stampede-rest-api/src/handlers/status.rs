//! Run status endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use stampede_core::{
    ExecutionFilter, FairnessRunResults, FilteredExecution, PriorityRunResults, ProgressAggregator,
};
use tracing::debug;

use crate::{context::StatusContext, errors::RestResult, models::RunStatusQuery};

async fn collect_run(ctx: &StatusContext, prefix: String) -> RestResult<Vec<FilteredExecution>> {
    let engine = ctx.session.engine().await?;
    let executions = ExecutionFilter::new(prefix)
        .collect(engine.list_executions())
        .await;
    Ok(executions)
}

/// Progress of a priority run, one summary per tier
pub async fn run_status(
    State(ctx): State<StatusContext>,
    Query(query): Query<RunStatusQuery>,
) -> RestResult<Json<PriorityRunResults>> {
    let prefix = query.required_prefix()?;
    debug!(prefix = %prefix, "Priority run status requested");

    let executions = collect_run(&ctx, prefix).await?;
    Ok(Json(ProgressAggregator::priority(&executions)))
}

/// Progress of a fairness run, one summary per band
pub async fn run_status_fairness(
    State(ctx): State<StatusContext>,
    Query(query): Query<RunStatusQuery>,
) -> RestResult<Json<FairnessRunResults>> {
    let prefix = query.required_prefix()?;
    debug!(prefix = %prefix, "Fairness run status requested");

    let executions = collect_run(&ctx, prefix).await?;
    Ok(Json(ProgressAggregator::fairness(&executions)))
}
