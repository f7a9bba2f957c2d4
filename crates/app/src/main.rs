use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::routing::get;
use axum::{Json, Router};
use hotline_app::config::AppConfig;
use hotline_app::workflow::HttpWorkflowClient;
use hotline_app::{stream, AppState};
use hotline_foundation::ShutdownHandler;
use hotline_vad::EngineConfig;

fn init_logging() {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt().with_env_filter(log_level).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    tracing::info!("starting hotline");

    let config = AppConfig::from_env()?;
    let workflow = Arc::new(HttpWorkflowClient::new(
        config.workflow_base_url.clone(),
        &config.workflow_path,
    ));

    let state = Arc::new(AppState {
        engine_config: EngineConfig::default(),
        workflow,
        greeting_payload: config.greeting_payload.clone(),
    });

    let app = Router::new()
        .route("/calls/stream", get(stream::ws_handler))
        .route(
            "/health",
            get(|| async { Json(serde_json::json!({"status": "ok"})) }),
        )
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("failed to parse listen address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind TCP listener")?;
    tracing::info!(address = %addr, "listening for media streams");

    let shutdown = ShutdownHandler::install();
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown.wait())
        .await
        .context("server error")?;

    Ok(())
}
