//! Health check endpoint

use axum::{extract::State, Json};

use crate::{context::StatusContext, models::HealthResponse};

/// Liveness probe; never touches the engine
pub async fn health_check(State(ctx): State<StatusContext>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        engine_connected: ctx.session.is_connected(),
    })
}
