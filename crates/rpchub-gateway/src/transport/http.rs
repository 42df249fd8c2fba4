//! One-shot HTTP transport: one POST body in, one envelope out.
//!
//! Same dispatch path as sockets, but no queue and no subscriptions. Every
//! answer is a JSON-RPC envelope, including decode failures. Bodies over the
//! limit get 413, bodies that fail to arrive get 400.

use std::error::Error as StdError;
use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use http_body_util::LengthLimitError;

use rpchub_core::error::HubError;
use rpchub_core::protocol::{codec, Response as RpcResponse};

use crate::app_state::AppState;
use crate::context::{OneShotRequest, Origin};

pub async fn rpc_post(
    State(app): State<AppState>,
    remote: Option<ConnectInfo<SocketAddr>>,
    body: Body,
) -> Response {
    let hub = app.hub();
    let limit = hub.settings().max_body_bytes;

    // Over-limit bodies are refused before any JSON work.
    let bytes = match axum::body::to_bytes(body, limit).await {
        Ok(b) => b,
        Err(e) => {
            hub.metrics().decode_errors.inc(&[("transport", "http")]);
            tracing::debug!(error = %e, limit, "request body rejected");
            let (status, err) = if exceeds_limit(&e) {
                (
                    StatusCode::PAYLOAD_TOO_LARGE,
                    HubError::InvalidRequest(format!("request body exceeds {limit} bytes")),
                )
            } else {
                (
                    StatusCode::BAD_REQUEST,
                    HubError::InvalidRequest(format!("request body unreadable: {e}")),
                )
            };
            return envelope(status, &RpcResponse::error(None, err.to_error_object()));
        }
    };

    let req = match codec::decode_request(&bytes) {
        Ok(r) => r,
        Err(e) => {
            hub.metrics().decode_errors.inc(&[("transport", "http")]);
            return envelope(StatusCode::OK, &codec::rejection(&bytes, &e));
        }
    };

    let origin = Origin::OneShot(OneShotRequest::new(remote.map(|ConnectInfo(addr)| addr)));
    let resp = hub.dispatch(origin, req).await;
    envelope(StatusCode::OK, &resp)
}

fn exceeds_limit(err: &axum::Error) -> bool {
    let mut cur: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(e) = cur {
        if e.is::<LengthLimitError>() {
            return true;
        }
        cur = e.source();
    }
    false
}

fn envelope(status: StatusCode, resp: &RpcResponse) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        codec::encode_response(resp),
    )
        .into_response()
}
