//! Decode-once codec for socket frames.
//!
//! - Text and binary frames => `Request`, or the error envelope to send back
//! - Ping/Pong are lifecycle only (tungstenite answers pings itself)
//! - Close ends the read loop

use axum::extract::ws::Message;

use rpchub_core::protocol::{codec, Request, Response};

#[derive(Debug)]
pub enum Inbound {
    Request(Request),
    /// Payload did not decode; the envelope answers it.
    Reject(Response),
    Control,
    Close,
}

pub fn decode(msg: &Message) -> Inbound {
    match msg {
        Message::Text(s) => decode_bytes(s.as_bytes()),
        Message::Binary(b) => decode_bytes(b),
        Message::Ping(_) | Message::Pong(_) => Inbound::Control,
        Message::Close(_) => Inbound::Close,
    }
}

pub fn decode_bytes(bytes: &[u8]) -> Inbound {
    match codec::decode_request(bytes) {
        Ok(req) => Inbound::Request(req),
        Err(e) => Inbound::Reject(codec::rejection(bytes, &e)),
    }
}
