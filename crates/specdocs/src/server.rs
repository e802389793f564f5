//! Documentation HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use specdocs_telemetry::{log_listening, log_shutdown, log_templates_loaded, MetricsRegistry};

use crate::api::{create_router, AppState};
use crate::fetch::SpecFetcher;
use crate::pipeline::DocsPipeline;
use crate::templates::Templates;

/// Server configuration.
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    pub metrics: Arc<MetricsRegistry>,
}

/// Load the templates, bind, and serve until a shutdown signal arrives.
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    // A template that does not parse is fatal.
    let templates = Templates::load()?;
    log_templates_loaded!(count = templates.names().count(), "templates parsed");

    let fetcher = SpecFetcher::new()?;
    let pipeline = DocsPipeline::new(fetcher, Arc::clone(&config.metrics));
    let state = AppState::new(Arc::new(templates), pipeline, config.metrics);
    let app = create_router(state);

    let listener = TcpListener::bind(config.listen_addr).await?;
    log_listening!(address = %config.listen_addr, "documentation server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log_shutdown!(reason = "signal", "documentation server stopped");
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
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
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
