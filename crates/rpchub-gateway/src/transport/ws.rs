//! WebSocket transport.
//!
//! One task per socket runs the read loop; a second runs the write loop.
//! Either loop exiting cancels the connection, which stops the other.
//! Lifecycle: upgrade → `Hub::connect` (Open) → loops → close (Closing)
//! → `Hub::disconnect` (Closed).

use std::net::SocketAddr;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        ConnectInfo, State,
    },
    response::Response,
};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{Duration, Instant, MissedTickBehavior};
use tracing::Instrument;

use rpchub_core::error::HubError;
use rpchub_core::protocol::{Request, Response as RpcResponse};

use crate::app_state::AppState;
use crate::config::HubSettings;
use crate::context::Origin;
use crate::realtime::{Connection, Frame, Hub};
use crate::transport::codec::{decode, Inbound};

// --------------------
// Entry
// --------------------
pub async fn ws_upgrade(
    State(app): State<AppState>,
    remote: Option<ConnectInfo<SocketAddr>>,
    ws: WebSocketUpgrade,
) -> Response {
    let hub = app.hub().clone();
    let remote = remote.map(|ConnectInfo(addr)| addr);
    ws.max_message_size(hub.settings().max_body_bytes)
        .on_upgrade(move |socket| run_connection(hub, socket, remote))
}

// --------------------
// Connection lifecycle
// --------------------

/// Drive one accepted socket until either side gives up.
pub async fn run_connection(hub: Hub, socket: WebSocket, remote: Option<SocketAddr>) {
    let settings = hub.settings().clone();
    let (conn, out_rx) = Connection::new(remote, settings.outbound_queue);
    let span = conn.span().clone();

    async move {
        if let Err(e) = hub.connect(conn.clone()).await {
            tracing::warn!(error = %e, "hub rejected connection");
            return;
        }
        tracing::info!("connected");

        let (sink, stream) = socket.split();
        let writer = tokio::spawn(
            write_loop(sink, out_rx, conn.clone(), hub.clone(), settings.clone())
                .instrument(tracing::Span::current()),
        );

        read_loop(&hub, &conn, stream, &settings).await;

        conn.close();
        hub.disconnect(conn.id()).await;
        if let Err(e) = writer.await {
            tracing::warn!(error = %e, "write loop task failed");
        }
        tracing::info!("disconnected");
    }
    .instrument(span)
    .await
}

async fn read_loop(hub: &Hub, conn: &Connection, mut stream: SplitStream<WebSocket>, settings: &HubSettings) {
    loop {
        let next = tokio::select! {
            _ = conn.closed() => break,
            r = tokio::time::timeout(settings.idle_timeout, stream.next()) => r,
        };

        let msg = match next {
            Err(_) => {
                tracing::info!(idle_ms = settings.idle_timeout.as_millis() as u64, "idle timeout");
                break;
            }
            Ok(None) => break,
            Ok(Some(Err(e))) => {
                tracing::debug!(error = %e, "socket read failed");
                break;
            }
            Ok(Some(Ok(msg))) => msg,
        };

        match decode(&msg) {
            Inbound::Request(req) => {
                let task = handle_request(hub.clone(), conn.clone(), req);
                if settings.ordered_dispatch {
                    task.await;
                } else {
                    tokio::spawn(task.instrument(tracing::Span::current()));
                }
            }
            Inbound::Reject(resp) => {
                hub.metrics().decode_errors.inc(&[("transport", "ws")]);
                tracing::debug!(code = resp.error_object().map(|e| e.code), "undecodable frame");
                send_response(conn, &resp);
            }
            Inbound::Control => {}
            Inbound::Close => break,
        }
    }
}

async fn handle_request(hub: Hub, conn: Connection, req: Request) {
    let resp = hub.dispatch(Origin::Connection(conn.clone()), req).await;
    send_response(&conn, &resp);
}

fn send_response(conn: &Connection, resp: &RpcResponse) {
    match conn.try_enqueue(Frame::response(resp)) {
        Ok(()) => {}
        Err(HubError::QueueFull) => tracing::warn!("outbound queue full, response dropped"),
        Err(_) => tracing::debug!("connection closed, response dropped"),
    }
}

// --------------------
// Writer
// --------------------
async fn write_loop(
    mut sink: SplitSink<WebSocket, Message>,
    mut out_rx: mpsc::Receiver<Frame>,
    conn: Connection,
    hub: Hub,
    settings: HubSettings,
) {
    let mut ping = tokio::time::interval_at(Instant::now() + settings.ping_interval, settings.ping_interval);
    ping.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let msg = tokio::select! {
            _ = conn.closed() => break,
            frame = out_rx.recv() => match frame {
                Some(f) => f.to_ws_message(),
                None => break,
            },
            _ = ping.tick() => Message::Ping(Vec::new()),
        };

        match tokio::time::timeout(settings.write_timeout, sink.send(msg)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::debug!(error = %e, "socket write failed");
                break;
            }
            Err(_) => {
                hub.metrics().write_timeouts.inc(&[]);
                tracing::warn!(
                    timeout_ms = settings.write_timeout.as_millis() as u64,
                    "socket write timed out"
                );
                break;
            }
        }
    }

    conn.close();
    out_rx.close();
    let _ = tokio::time::timeout(Duration::from_secs(1), sink.send(Message::Close(None))).await;
}
