use std::sync::Arc;

use axum::extract::ws::Message;

use rpchub_core::protocol::codec;
use rpchub_core::protocol::{Event, Response};
use rpchub_core::Result;

/// Encoded outbound frame. Broadcasts encode once and share the buffer
/// across every subscriber queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame(Arc<str>);

impl Frame {
    pub fn text(s: impl Into<Arc<str>>) -> Self {
        Frame(s.into())
    }

    /// Responses always encode (failures become internal-error envelopes).
    pub fn response(resp: &Response) -> Self {
        Frame::text(codec::encode_response(resp))
    }

    pub fn event(ev: &Event) -> Result<Self> {
        codec::encode_event(ev).map(Frame::text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to axum::ws::Message for transport.
    /// NOTE: axum::Message::Text owns a String, so each socket gets its own copy.
    pub fn to_ws_message(&self) -> Message {
        Message::Text(self.0.to_string())
    }
}

/// One event on its way through the hub's broadcast channel.
#[derive(Debug, Clone)]
pub struct Broadcast {
    pub event: Arc<str>,
    pub frame: Frame,
}
