use anyhow::Context;
use tracing_subscriber::{EnvFilter, fmt};

use time_trackers::shell::{build_state, config::Config, http::router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    // RUST_LOG wins over the configured default.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    fmt().with_env_filter(filter).init();

    let app = router(build_state(&config)?);

    tracing::info!("REST endpoint: http://{}/api/v1/tracker", config.http_addr);
    tracing::info!("GraphQL endpoint: http://{}/gql", config.http_addr);
    let listener = tokio::net::TcpListener::bind(config.http_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.http_addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {err}");
    }
    tracing::info!("shutting down");
}
