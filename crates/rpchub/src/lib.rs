//! Top-level facade crate for rpchub.
//!
//! Re-exports the wire types and the hub/gateway library so users can depend on a single crate.

pub mod core {
    pub use rpchub_core::*;
}

pub mod gateway {
    pub use rpchub_gateway::*;
}
