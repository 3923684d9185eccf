//! HTTP surface: route registration, shared context and process boot.
//!
//! The registry is fully populated before the listener binds, and cleared
//! only after graceful shutdown has drained in-flight requests, so no request
//! can observe a partially loaded or partially cleared registry.

mod routes;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;

use crate::adapters::minijinja::JinjaRenderer;
use crate::application::{ModelRegistry, PredictionService, UploadSteward};
use crate::config::Config;
use crate::domain::ModelId;
use crate::ports::PageRenderer;

/// Shared per-process context handed to every handler.
pub struct AppContext {
    pub service: PredictionService,
    pub renderer: Arc<dyn PageRenderer>,
}

/// Build the router over an already-populated context.
#[must_use]
pub fn router(ctx: Arc<AppContext>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route(
            "/diabetes",
            get(routes::diabetes_form).post(routes::diabetes_predict),
        )
        .route(
            "/lungcancer",
            get(routes::lungcancer_form).post(routes::lungcancer_predict),
        )
        .route(
            "/braintumor",
            get(routes::braintumor_form).post(routes::braintumor_predict),
        )
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(ctx)
}

/// Load every model, bind, and serve until shutdown.
///
/// # Errors
/// Startup failures (model load, staging directory, bind) abort before the
/// listener opens; the service never serves with a partial registry.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let registry = Arc::new(ModelRegistry::new());
    for id in ModelId::ALL {
        registry
            .load(id, &config.model_dir)
            .map_err(|e| anyhow::anyhow!("loading model `{id}` failed: {e}"))?;
    }
    tracing::info!(count = registry.len(), "all models loaded");

    let steward = UploadSteward::new(&config.upload_dir)?;
    let renderer: Arc<dyn PageRenderer> = Arc::new(JinjaRenderer::new()?);
    let ctx = Arc::new(AppContext {
        service: PredictionService::new(Arc::clone(&registry), steward),
        renderer,
    });

    let listener = TcpListener::bind(config.bind).await?;
    tracing::info!(addr = %config.bind, "listening");

    axum::serve(listener, router(ctx, config.max_upload_bytes))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // In-flight requests have drained; lookups fail from here on.
    registry.clear();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install shutdown handler");
    }
    tracing::info!("shutdown signal received, draining requests");
}
