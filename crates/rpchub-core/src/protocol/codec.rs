//! Strict envelope codec.
//!
//! Decoding rules:
//! - Unknown fields are rejected by the envelope types themselves.
//! - Anything but whitespace after the JSON value is a parse error, so two
//!   concatenated envelopes can never be smuggled through as one.
//! - Syntax errors map to `-32700`; well-formed JSON of the wrong shape maps
//!   to `-32600`.
//!
//! Encoding never HTML-escapes (serde_json does not) and is deterministic for
//! a given envelope. `encode_response` cannot fail: an encode failure is turned
//! into an internal-error envelope before it reaches a transport.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::error::Category;

use crate::error::{HubError, Result};
use crate::protocol::envelope::{Event, Id, Request, Response};

/// Last-resort frame when even the fallback error envelope fails to encode.
const INTERNAL_ERROR_FRAME: &str =
    r#"{"jsonrpc":"2.0","id":null,"error":{"code":-32603,"message":"internal error: response encode failed"}}"#;

fn classify(e: serde_json::Error) -> HubError {
    match e.classify() {
        Category::Data => HubError::InvalidRequest(e.to_string()),
        Category::Syntax | Category::Eof | Category::Io => HubError::Parse(e.to_string()),
    }
}

/// Decode exactly one JSON value of type `T` from `bytes`.
pub fn decode_strict<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut de = serde_json::Deserializer::from_slice(bytes);
    let value = T::deserialize(&mut de).map_err(classify)?;
    de.end()
        .map_err(|e| HubError::Parse(format!("trailing data after envelope: {e}")))?;
    Ok(value)
}

pub fn decode_request(bytes: &[u8]) -> Result<Request> {
    decode_strict(bytes)
}

pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    decode_strict(bytes)
}

pub fn decode_event(bytes: &[u8]) -> Result<Event> {
    decode_strict(bytes)
}

pub fn encode_request(req: &Request) -> Result<String> {
    serde_json::to_string(req).map_err(|e| HubError::Internal(format!("request encode failed: {e}")))
}

pub fn encode_event(ev: &Event) -> Result<String> {
    serde_json::to_string(ev)
        .map_err(|e| HubError::Internal(format!("event {} encode failed: {e}", ev.event)))
}

/// Encode a response. Never fails.
pub fn encode_response(resp: &Response) -> String {
    match serde_json::to_string(resp) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, id = ?resp.id, "response encode failed");
            let fallback = Response::error(
                resp.id.clone(),
                HubError::Internal(format!("response encode failed: {e}")).to_error_object(),
            );
            serde_json::to_string(&fallback).unwrap_or_else(|_| INTERNAL_ERROR_FRAME.to_owned())
        }
    }
}

#[derive(Deserialize)]
struct IdOnly {
    #[serde(default)]
    id: Option<Id>,
}

/// Best-effort id recovery from a payload that is valid JSON but not a valid
/// request. Unparseable payloads yield `None`.
pub fn recover_id(bytes: &[u8]) -> Option<Id> {
    serde_json::from_slice::<IdOnly>(bytes).ok().and_then(|p| p.id)
}

/// Error envelope answering a payload that failed to decode.
///
/// Parse errors always get a `null` id. Invalid requests keep the id when one
/// can be recovered.
pub fn rejection(bytes: &[u8], err: &HubError) -> Response {
    let id = match err {
        HubError::Parse(_) => None,
        _ => recover_id(bytes),
    };
    Response::error(id, err.to_error_object())
}

