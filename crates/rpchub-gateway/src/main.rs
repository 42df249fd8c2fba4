//! rpchub gateway binary.
//!
//! - Config: first CLI argument, default `rpchub.yaml`
//! - Socket endpoint at `gateway.ws_path`, one-shot POST at `gateway.rpc_path`
//! - Ctrl-C: mark draining, stop accepting, close live connections

use std::net::SocketAddr;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, EnvFilter};

use rpchub_core::error::{HubError, Result};
use rpchub_gateway::{app_state::AppState, config, router, services};

const DEFAULT_CONFIG: &str = "rpchub.yaml";

#[tokio::main]
async fn main() {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "rpchub-gateway failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG.to_string());
    let cfg = config::load_from_file(&path)?;
    let listen: SocketAddr = cfg
        .gateway
        .listen
        .parse()
        .map_err(|e| HubError::Config(format!("gateway.listen must be a valid SocketAddr: {e}")))?;
    let tick_every = cfg.hub.tick_interval_ms;

    let (state, runtime) = AppState::new(cfg)?;
    let hub = state.hub().clone();
    let shutdown = CancellationToken::new();

    let hub_task = runtime.spawn(shutdown.clone());
    if tick_every > 0 {
        tokio::spawn(services::system::run_ticker(
            hub.clone(),
            Duration::from_millis(tick_every),
            shutdown.clone(),
        ));
    }
    if state.cfg().docs.enabled {
        hub.generate_docs()?;
    }

    let app = router::build_router(state);
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| HubError::Config(format!("bind {listen} failed: {e}")))?;
    tracing::info!(%listen, "rpchub-gateway starting");

    let drain = {
        let hub = hub.clone();
        let shutdown = shutdown.clone();
        async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "ctrl-c handler unavailable");
                std::future::pending::<()>().await;
            }
            tracing::info!("shutdown requested, draining");
            hub.metrics().set_draining();
            shutdown.cancel();
        }
    };

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(drain)
    .await
    .map_err(|e| HubError::Internal(format!("server failed: {e}")))?;

    shutdown.cancel();
    if let Err(e) = hub_task.await {
        tracing::warn!(error = %e, "hub control loop task failed");
    }
    tracing::info!("rpchub-gateway stopped");
    Ok(())
}
