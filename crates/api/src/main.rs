use std::sync::Arc;

use anyhow::Context;

use ledgerbus_api::app;
use ledgerbus_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    ledgerbus_observability::init();

    let config = ApiConfig::from_env();
    let services = Arc::new(
        app::services::build_services(&config)
            .await
            .context("failed to wire event bus")?,
    );
    let app = app::build_router(services.clone());

    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr()))?;

    tracing::info!(
        addr = %listener.local_addr()?,
        stream = config.stream(),
        delivery = ?config.delivery(),
        "listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    services.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
