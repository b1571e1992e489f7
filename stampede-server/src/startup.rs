//! Server startup and shutdown logic

use anyhow::{Context, Result};
use axum::Router;
use stampede_config::{EngineConfig, EngineKind, StampedeConfig};
use stampede_core::{
    BatchDispatcher, DispatchSettings, EngineConnector, EngineSession, InMemoryEngine,
    SharedEngineConnector,
};
use stampede_http::{HttpConnector, HttpEngineConfig};
use stampede_rest_api::{create_rest_app, AppConfig, AppContext, DispatchDefaults};
use std::sync::Arc;
use tokio::net::TcpListener;

/// Server application struct
pub struct Server {
    config: StampedeConfig,
    session: Arc<EngineSession>,
}

impl Server {
    /// Create a server from validated configuration.
    ///
    /// No engine connection is made here; the session connects on the first
    /// request that needs the engine.
    pub fn new(config: StampedeConfig) -> Result<Self> {
        config
            .validate_all()
            .context("Invalid server configuration")?;
        let connector = build_connector(&config.engine)?;

        Ok(Self {
            config,
            session: Arc::new(EngineSession::new(connector)),
        })
    }

    pub fn config(&self) -> &StampedeConfig {
        &self.config
    }

    pub fn session(&self) -> Arc<EngineSession> {
        self.session.clone()
    }

    /// Build the complete application router
    pub fn build_app(&self) -> Router {
        let dispatcher = BatchDispatcher::new(dispatch_settings(&self.config));
        let context = AppContext::new(
            self.session.clone(),
            Arc::new(dispatcher),
            DispatchDefaults::from(&self.config.dispatch),
        );

        create_rest_app(context, AppConfig::from(&self.config.server))
    }

    /// Start the server
    pub async fn start(self) -> Result<()> {
        let app = self.build_app();
        let addr = self.config.server.socket_address();

        tracing::info!("Starting Stampede server on {}", addr);
        self.log_config_summary();

        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind to {}", addr))?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("Server error")?;

        self.session.close().await;
        tracing::info!("Server shutdown complete");
        Ok(())
    }

    fn log_config_summary(&self) {
        let engine = &self.config.engine;
        tracing::info!("=== Stampede Server Configuration ===");
        tracing::info!("Engine: {} ({})", engine.kind, self.session.target());
        tracing::info!(
            "Task queues: {} / {}",
            engine.priority_task_queue,
            engine.fairness_task_queue
        );
        tracing::info!(
            "Default batch: {} x {} (limit {})",
            self.config.dispatch.default_workflow_count,
            self.config.dispatch.default_id_prefix,
            self.config.dispatch.max_workflow_count
        );
        tracing::info!(
            "CORS: {}",
            if self.config.server.cors.is_empty() {
                "Disabled".to_string()
            } else {
                self.config.server.cors.join(", ")
            }
        );
        tracing::info!(
            "Tracing: {}",
            if self.config.server.enable_tracing { "Enabled" } else { "Disabled" }
        );
        tracing::info!("=====================================");
    }
}

/// Build the connector for the configured engine kind
pub fn build_connector(config: &EngineConfig) -> Result<Arc<dyn EngineConnector>> {
    match config.kind {
        EngineKind::Http => {
            let http_config = HttpEngineConfig::try_from(config)
                .context("Invalid engine HTTP configuration")?;
            Ok(Arc::new(HttpConnector::new(http_config)))
        }
        EngineKind::Memory => {
            tracing::warn!("Using the in-memory engine; workflows will not reach a real engine");
            Ok(Arc::new(SharedEngineConnector::new(
                Arc::new(InMemoryEngine::new()),
                "in-memory engine",
            )))
        }
    }
}

/// Dispatcher settings from configuration
pub fn dispatch_settings(config: &StampedeConfig) -> DispatchSettings {
    DispatchSettings {
        priority_task_queue: config.engine.priority_task_queue.clone(),
        fairness_task_queue: config.engine.fairness_task_queue.clone(),
        priority_workflow_type: config.engine.priority_workflow_type.clone(),
        fairness_workflow_type: config.engine.fairness_workflow_type.clone(),
        shuffle_seed: config.dispatch.shuffle_seed,
    }
}

/// Graceful shutdown signal
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
