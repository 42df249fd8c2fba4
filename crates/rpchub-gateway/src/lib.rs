//! rpchub gateway library entry.
//!
//! This crate wires the transports, dispatcher, realtime hub, and built-in
//! services into a JSON-RPC 2.0 hub. It is consumed by the binary
//! (`main.rs`), by embedders registering their own methods, and by the
//! integration tests.

pub mod app_state;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod docs;
pub mod obs;
pub mod ops;
pub mod realtime;
pub mod router;
pub mod services;
pub mod transport;
