//! rpchub core: JSON-RPC 2.0 envelopes, the strict codec, and the shared error surface.
//!
//! This crate defines the wire-level contracts shared by the hub, both
//! transports, and client tooling. It carries no transport or runtime
//! dependencies so it can be reused by clients and tests alike.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Malformed input surfaces as `HubError`, never as a panic.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;

/// Shared result type.
pub use error::{ErrorCode, HubError, Result};
