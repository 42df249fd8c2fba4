//! Protocol modules (JSON-RPC 2.0 envelopes + strict codec).
//!
//! - `envelope`: request, response, event and error object shapes.
//! - `codec`: strict decode (unknown fields and trailing data rejected) and
//!   encode that never lets a response fail to leave the process.
//!
//! Decoding is panic-free: malformed input is reported as `HubError`, keeping
//! the hub resilient to hostile traffic.

pub mod codec;
pub mod envelope;

pub use envelope::{ErrorObject, Event, Id, Outcome, Request, Response, Version};
