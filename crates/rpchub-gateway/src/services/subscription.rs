use serde::{Deserialize, Serialize};

use rpchub_core::error::Result;

use crate::context::HandlerCtx;
use crate::realtime::{Hub, MethodOptions};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventParams {
    pub event: String,
}

#[derive(Debug, Serialize)]
pub struct Subscribed {
    pub subscribed: bool,
}

#[derive(Debug, Serialize)]
pub struct Unsubscribed {
    pub unsubscribed: bool,
}

/// `subscribe` / `unsubscribe`: event membership for the calling socket.
pub fn register(hub: &Hub) -> Result<()> {
    hub.register_method_with(
        "subscribe",
        MethodOptions::default()
            .docs("Subscribe this connection to a registered event."),
        |ctx: HandlerCtx, p: EventParams| async move {
            ctx.subscribe(&p.event)?;
            Ok(Subscribed { subscribed: true })
        },
    )?;

    hub.register_method_with(
        "unsubscribe",
        MethodOptions::default()
            .docs("Drop this connection's subscription to an event. False if it had none."),
        |ctx: HandlerCtx, p: EventParams| async move {
            let unsubscribed = ctx.unsubscribe(&p.event)?;
            Ok(Unsubscribed { unsubscribed })
        },
    )?;

    Ok(())
}
