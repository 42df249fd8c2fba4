use std::time::Duration;

use serde::de::IgnoredAny;
use serde::Serialize;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use rpchub_core::error::Result;

use crate::context::HandlerCtx;
use crate::realtime::{Hub, MethodOptions};

pub const TICK_EVENT: &str = "system.tick";

#[derive(Debug, Serialize)]
pub struct Pong {
    pub pong: bool,
}

#[derive(Debug, Serialize)]
pub struct Status {
    pub connections: usize,
    pub events: Vec<String>,
    pub methods: Vec<String>,
    pub uptime_secs: u64,
}

#[derive(Debug, Serialize)]
pub struct Tick {
    pub seq: u64,
}

pub fn register(hub: &Hub) -> Result<()> {
    hub.register_method_with(
        "system.ping",
        MethodOptions::default().docs("Liveness check. Params are ignored."),
        |_ctx: HandlerCtx, _: IgnoredAny| async move { Ok(Pong { pong: true }) },
    )?;

    hub.register_method_with(
        "system.status",
        MethodOptions::default().docs("Connection count, registered names and uptime."),
        |ctx: HandlerCtx, _: IgnoredAny| async move {
            let hub = ctx.hub();
            Ok(Status {
                connections: hub.connections().len(),
                events: hub.events(),
                methods: hub.methods(),
                uptime_secs: hub.uptime().as_secs(),
            })
        },
    )?;

    hub.register_event::<Tick>(TICK_EVENT, "Periodic heartbeat with a sequence number.");
    Ok(())
}

/// Publish `system.tick` every `every` until `shutdown` fires.
pub async fn run_ticker(hub: Hub, every: Duration, shutdown: CancellationToken) {
    let mut interval = tokio::time::interval(every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut seq: u64 = 0;

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = interval.tick() => {
                seq += 1;
                // Never wait on a flooded broadcast channel; the next tick supersedes this one.
                if let Err(e) = hub.try_publish_event(TICK_EVENT, &Tick { seq }) {
                    tracing::debug!(seq, error = %e, "tick dropped");
                }
            }
        }
    }
    tracing::debug!(last_seq = seq, "ticker stopped");
}
