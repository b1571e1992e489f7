//! Batch launch endpoint

use axum::{body::Bytes, extract::State, Json};
use tracing::{info, warn};

use crate::{
    context::DispatchContext,
    errors::RestResult,
    models::{DispatchResponse, StartWorkflowsRequest},
};

/// Launch a batch of workflows.
///
/// Answers `done` once every workflow has been submitted, whether or not
/// individual submissions failed. Fails only when the request is invalid or
/// the engine cannot be reached.
pub async fn start_workflows(
    State(ctx): State<DispatchContext>,
    body: Bytes,
) -> RestResult<Json<DispatchResponse>> {
    let request = StartWorkflowsRequest::from_body(&body)?.into_batch_request(&ctx.defaults)?;
    info!(
        prefix = %request.id_prefix,
        mode = %request.mode,
        count = request.count,
        "Dispatch requested"
    );

    let engine = ctx.session.engine().await?;
    let report = ctx.dispatcher.dispatch(engine.as_ref(), &request).await;

    if !report.is_complete() {
        warn!(
            prefix = %request.id_prefix,
            failed = report.failed.len(),
            "Batch finished with failed submissions"
        );
    }

    Ok(Json(DispatchResponse::done()))
}
