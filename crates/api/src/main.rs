use std::sync::Arc;

use anyhow::Context as _;
use labor_api::app::{self, AppState};
use labor_api::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    labor_observability::init();

    let settings = match Settings::from_env() {
        Ok(settings) => Arc::new(settings),
        Err(e) => {
            tracing::error!(error = %e, "invalid settings");
            return Err(e).context("failed to load settings");
        }
    };

    let health = app::default_health_checks(&settings).context("failed to configure health checks")?;
    let state = AppState::from_settings(settings.clone(), health)
        .context("failed to configure the connection pool")?;

    let data = state.data.clone();
    tokio::spawn(async move { data.warm_up().await });

    let router = app::build_app(state);

    let listener = tokio::net::TcpListener::bind(settings.hosting.bind_address)
        .await
        .with_context(|| format!("failed to bind {}", settings.hosting.bind_address))?;

    tracing::info!(
        environment = ?settings.hosting.environment,
        "listening on {}",
        listener.local_addr()?
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
