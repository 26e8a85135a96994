//! liverelay bridge
//!
//! - WebSocket ingest: /v1/ingest?room=<id>, one JSON event per text frame
//! - Chat messages relayed downstream as length-prefixed JSON over TCP
//! - Ops: /healthz, /readyz, /metrics
//!
//! Usage: `liverelay-bridge [config.yaml]` (defaults to `liverelay.yaml`).

use tracing_subscriber::{fmt, EnvFilter};

use liverelay_bridge::{app_state::AppState, config, router};
use liverelay_core::error::{RelayError, Result};

const DEFAULT_CONFIG_PATH: &str = "liverelay.yaml";

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    if let Err(e) = run().await {
        tracing::error!(code = e.code().as_str(), error = %e, "liverelay-bridge failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let cfg = config::load_from_file(&path)?;
    let listen = cfg.ingest.listen_addr()?;
    let drain = cfg.relay.drain_timeout();

    let (state, relay) = AppState::build(cfg).await?;
    let metrics = state.metrics();
    let app = router::build_router(state);

    tracing::info!(%listen, config = %path, "liverelay-bridge starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| RelayError::Internal(format!("bind {listen} failed: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            metrics.set_draining();
        })
        .await
        .map_err(|e| RelayError::Internal(format!("server failed: {e}")))?;

    relay.shutdown(drain).await;
    tracing::info!("liverelay-bridge stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "ctrl-c handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("signal received, draining");
}
