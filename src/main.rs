use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use synth_metrics::config::{ConfigSource, EnvConfig, ServerConfig};
use synth_metrics::series::{Algorithm, NumericType, Registry};
use synth_metrics::{engine, server, AppState};

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    // ── 1. Configuration ─────────────────────────────────────────
    let config: Arc<dyn ConfigSource> = Arc::new(EnvConfig::new());
    let settings = ServerConfig::from_source(config.as_ref());

    // ── 2. Build every series before serving ─────────────────────
    let registry = match Registry::initialize(&NumericType::ALL, &Algorithm::ALL, config) {
        Ok(r) => Arc::new(r),
        Err(e) => {
            error!(error = %e, "cannot build series");
            std::process::exit(1);
        }
    };

    // ── 3. Engine loop ───────────────────────────────────────────
    let ticker = engine::spawn(registry.clone(), settings.tick_interval);

    // ── 4. Router ────────────────────────────────────────────────
    let state = Arc::new(AppState::new(registry, settings.stream_interval));
    let app = server::create_router(state);

    // ── 5. Bind & serve ──────────────────────────────────────────
    let listener = tokio::net::TcpListener::bind(&settings.listen_addr)
        .await
        .expect("Failed to bind listen address — is it already in use?");

    info!(addr = %settings.listen_addr, "synth-metrics listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server exited with error");

    ticker.stop().await;
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
