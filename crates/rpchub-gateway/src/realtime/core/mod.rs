//! Realtime core components for the hub runtime.
//!
//! Connection handles and set, subscription tracking, and the hub coordinator
//! shared by both transports.

mod connection;
mod connection_set;
mod hub;
mod subscriptions;

pub use connection::{ConnId, Connection};
pub use connection_set::ConnectionSet;
pub use hub::{Hub, HubBuilder, HubRuntime, MethodOptions};
pub use subscriptions::SubscriptionRegistry;
