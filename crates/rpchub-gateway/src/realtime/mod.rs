//! Realtime runtime for the hub.
//!
//! Connection handles, the connection set, the subscription registry and the
//! hub control loop that serializes connect/disconnect/broadcast.

pub mod core;
pub mod types;

pub use core::{
    ConnId, Connection, ConnectionSet, Hub, HubBuilder, HubRuntime, MethodOptions,
    SubscriptionRegistry,
};
pub use types::{Broadcast, Frame};
