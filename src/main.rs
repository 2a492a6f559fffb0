use anyhow::Context;
use dotenvy::dotenv;
use tracing::{error, info};

use quill::logging::{init_basic_logging, init_tracing, shutdown_tracer};
use quill::metrics::{init_metrics, is_observability_enabled, metrics_app};
use quill::router::init_router;
use quill::state::init_app_state;
use quill_config::ServerConfig;

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let observability = is_observability_enabled();
    if observability {
        init_tracing()?;
    } else {
        init_basic_logging();
    }

    let state = init_app_state().await?;
    quill_db::run_migrations(&state.db).await?;

    let server_config = ServerConfig::from_env();

    if let Some(handle) = init_metrics()? {
        let metrics_addr = server_config.metrics_bind_address();
        let listener = tokio::net::TcpListener::bind(&metrics_addr)
            .await
            .with_context(|| format!("failed to bind metrics listener on {metrics_addr}"))?;
        info!("Metrics available at http://{metrics_addr}/metrics");
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, metrics_app(handle)).await {
                error!(error = %e, "metrics server stopped");
            }
        });
    }

    let app = init_router(state);

    let addr = server_config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server running on http://{addr}");
    info!("Swagger UI available at http://{addr}/swagger-ui");
    info!("Scalar UI available at http://{addr}/scalar");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if observability {
        shutdown_tracer();
    }
    Ok(())
}
