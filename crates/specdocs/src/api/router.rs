//! Axum router configuration.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use specdocs_telemetry::MetricsRegistry;

use super::{docs, health, metrics};
use crate::pipeline::DocsPipeline;
use crate::templates::Templates;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub templates: Arc<Templates>,
    pub pipeline: DocsPipeline,
    pub metrics: Arc<MetricsRegistry>,
}

impl AppState {
    pub fn new(
        templates: Arc<Templates>,
        pipeline: DocsPipeline,
        metrics: Arc<MetricsRegistry>,
    ) -> Self {
        Self {
            templates,
            pipeline,
            metrics,
        }
    }
}

/// Create the router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/docs/{spec_type}/{*spec_url}", get(docs::render_docs))
        .route("/health", get(health::health_check))
        .route("/metrics", get(metrics::prometheus_metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
