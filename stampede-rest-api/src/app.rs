//! Main application configuration and router setup

use axum::{
    http::Uri,
    routing::{get, post},
    Router,
};
use stampede_config::ServerConfig;
use tower_http::trace::TraceLayer;

use crate::{context::AppContext, errors::RestError, handlers, middleware::cors_layer_with_config};

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Allowed CORS origins; empty disables the CORS layer
    pub cors_origins: Vec<String>,
    /// Enable request tracing
    pub enable_tracing: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig::from(&ServerConfig::default())
    }
}

impl From<&ServerConfig> for AppConfig {
    fn from(config: &ServerConfig) -> Self {
        Self {
            cors_origins: config.cors.clone(),
            enable_tracing: config.enable_tracing,
        }
    }
}

/// Create the complete REST API application
pub fn create_rest_app(context: AppContext, config: AppConfig) -> Router {
    let mut app = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/start-workflows", post(handlers::start_workflows))
        .route("/run-status", get(handlers::run_status))
        .route("/run-status-fairness", get(handlers::run_status_fairness))
        .fallback(not_found)
        .with_state(context);

    // Middleware layers (applied in reverse order)
    if !config.cors_origins.is_empty() {
        app = app.layer(cors_layer_with_config(&config.cors_origins));
    }

    if config.enable_tracing {
        app = app.layer(TraceLayer::new_for_http());
    }

    app
}

async fn not_found(uri: Uri) -> RestError {
    RestError::NotFound(format!("No route for {}", uri.path()))
}
