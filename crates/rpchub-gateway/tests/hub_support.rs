//! Shared fixtures for gateway integration tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(dead_code)]

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use rpchub_core::error::HubError;
use rpchub_core::protocol::{codec, Request, Response};
use rpchub_gateway::config::HubSettings;
use rpchub_gateway::context::HandlerCtx;
use rpchub_gateway::realtime::{Connection, Frame, Hub};

#[derive(Debug, Deserialize)]
pub struct AddParams {
    pub a: i64,
    pub b: i64,
}

#[derive(Debug, Serialize)]
pub struct AddResult {
    pub result: i64,
}

#[derive(Debug, Serialize)]
pub struct Ping {
    pub n: u64,
}

pub fn settings() -> HubSettings {
    HubSettings {
        handler_timeout: Duration::from_millis(200),
        ..HubSettings::default()
    }
}

/// Hub with `add` registered and its control loop running.
pub fn start(settings: HubSettings) -> (Hub, CancellationToken) {
    let (hub, runtime) = Hub::builder(settings).build();
    register_add(&hub);
    let shutdown = CancellationToken::new();
    runtime.spawn(shutdown.clone());
    (hub, shutdown)
}

pub fn register_add(hub: &Hub) {
    hub.register_method("add", |_ctx: HandlerCtx, p: AddParams| async move {
        Ok(AddResult { result: p.a + p.b })
    })
    .unwrap();
}

pub fn request(text: &str) -> Request {
    codec::decode_request(text.as_bytes()).unwrap()
}

pub async fn connected(hub: &Hub, capacity: usize) -> (Connection, mpsc::Receiver<Frame>) {
    let (conn, rx) = Connection::new(None, capacity);
    hub.connect(conn.clone()).await.unwrap();
    (conn, rx)
}

pub fn encoded(resp: &Response) -> serde_json::Value {
    serde_json::from_str(&codec::encode_response(resp)).unwrap()
}

pub fn error_code(resp: &Response) -> i64 {
    resp.error_object().expect("error response").code
}

pub fn frame_json(frame: &Frame) -> serde_json::Value {
    serde_json::from_str(frame.as_str()).unwrap()
}

pub fn domain(code: i64, msg: &str) -> HubError {
    HubError::domain(code, msg)
}
