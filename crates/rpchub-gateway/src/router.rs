//! Axum router wiring.
//!
//! - `gateway.ws_path` (GET): socket upgrade
//! - `gateway.rpc_path` (POST): one-shot request
//! - `/healthz`, `/readyz`, `/metrics`: ops

use axum::{
    routing::{get, post},
    Router,
};

use crate::{app_state::AppState, ops, transport};

pub fn build_router(state: AppState) -> Router {
    let gw = &state.cfg().gateway;
    Router::new()
        .route(&gw.ws_path, get(transport::ws::ws_upgrade))
        .route(&gw.rpc_path, post(transport::http::rpc_post))
        .route("/healthz", get(ops::healthz))
        .route("/readyz", get(ops::readyz))
        .route("/metrics", get(ops::metrics))
        .with_state(state.clone())
}
