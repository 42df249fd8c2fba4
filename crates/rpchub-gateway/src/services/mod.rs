//! Built-in methods and events.
//!
//! - `subscribe` / `unsubscribe`
//! - `system.ping`, `system.status`, event `system.tick`

pub mod subscription;
pub mod system;

use rpchub_core::Result;

use crate::realtime::Hub;

/// Register every built-in on `hub`.
pub fn register_builtins(hub: &Hub) -> Result<()> {
    subscription::register(hub)?;
    system::register(hub)?;
    Ok(())
}
