use std::sync::Arc;

use api::{router, ApiConfig, AppState};
use orchestrator::ModelSpecialistFactory;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use user_proxy::SessionRegistry;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run().await {
        error!(error = %e, "API_FATAL");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ApiConfig::from_env()?;
    // fail before serving if the model settings are missing
    let factory = ModelSpecialistFactory::from_env()?;

    let addr = config.addr;
    let default_kind = config.default_kind;
    let debug = config.debug;
    info!(
        service = %config.service_name,
        version = %config.service_version,
        strategy = %default_kind,
        "API_STARTING"
    );

    let state = AppState::new(config);
    let app = router(state.clone());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API_LISTENING");

    state.mark_ready(SessionRegistry::new(Arc::new(factory), default_kind).with_debug(debug));
    info!("API_READY");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Ok(sessions) = state.sessions() {
        info!(active_sessions = sessions.len().await, "API_SHUTDOWN");
        sessions.clear().await;
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "SIGNAL_HANDLER_FAILED");
    }
}
