use std::time::Duration;

use serde::Deserialize;
use rpchub_core::error::{HubError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub gateway: GatewaySection,

    #[serde(default)]
    pub hub: HubSection,

    #[serde(default)]
    pub docs: DocsSection,
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(HubError::Config(format!(
                "unsupported config version {} (expected 1)",
                self.version
            )));
        }

        self.gateway.validate()?;
        self.hub.validate()?;
        self.docs.validate()?;

        Ok(())
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            version: 1,
            gateway: GatewaySection::default(),
            hub: HubSection::default(),
            docs: DocsSection::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_ws_path")]
    pub ws_path: String,

    #[serde(default = "default_rpc_path")]
    pub rpc_path: String,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            ws_path: default_ws_path(),
            rpc_path: default_rpc_path(),
        }
    }
}

impl GatewaySection {
    pub fn validate(&self) -> Result<()> {
        for (name, path) in [("ws_path", &self.ws_path), ("rpc_path", &self.rpc_path)] {
            if !path.starts_with('/') {
                return Err(HubError::Config(format!("gateway.{name} must start with '/'")));
            }
        }
        if self.ws_path == self.rpc_path {
            return Err(HubError::Config(
                "gateway.ws_path and gateway.rpc_path must differ".into(),
            ));
        }
        Ok(())
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_ws_path() -> String {
    "/v1/ws".into()
}
fn default_rpc_path() -> String {
    "/v1/rpc".into()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HubSection {
    #[serde(default = "default_outbound_queue")]
    pub outbound_queue: usize,

    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,

    #[serde(default = "default_handler_timeout_ms")]
    pub handler_timeout_ms: u64,

    #[serde(default = "default_write_timeout_ms")]
    pub write_timeout_ms: u64,

    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    #[serde(default)]
    pub ordered_dispatch: bool,

    #[serde(default = "default_ping_interval_ms")]
    pub ping_interval_ms: u64,

    #[serde(default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: u64,

    /// 0 disables the `system.tick` event.
    #[serde(default)]
    pub tick_interval_ms: u64,
}

impl Default for HubSection {
    fn default() -> Self {
        Self {
            outbound_queue: default_outbound_queue(),
            event_buffer: default_event_buffer(),
            handler_timeout_ms: default_handler_timeout_ms(),
            write_timeout_ms: default_write_timeout_ms(),
            max_body_bytes: default_max_body_bytes(),
            ordered_dispatch: false,
            ping_interval_ms: default_ping_interval_ms(),
            idle_timeout_ms: default_idle_timeout_ms(),
            tick_interval_ms: 0,
        }
    }
}

impl HubSection {
    pub fn validate(&self) -> Result<()> {
        if !(1..=65_536).contains(&self.outbound_queue) {
            return Err(HubError::Config(
                "hub.outbound_queue must be between 1 and 65536".into(),
            ));
        }
        if !(1..=1_048_576).contains(&self.event_buffer) {
            return Err(HubError::Config(
                "hub.event_buffer must be between 1 and 1048576".into(),
            ));
        }
        if !(100..=600_000).contains(&self.handler_timeout_ms) {
            return Err(HubError::Config(
                "hub.handler_timeout_ms must be between 100 and 600000".into(),
            ));
        }
        if !(100..=120_000).contains(&self.write_timeout_ms) {
            return Err(HubError::Config(
                "hub.write_timeout_ms must be between 100 and 120000".into(),
            ));
        }
        if !(64..=64 * 1024 * 1024).contains(&self.max_body_bytes) {
            return Err(HubError::Config(
                "hub.max_body_bytes must be between 64 and 67108864".into(),
            ));
        }
        if !(1000..=120_000).contains(&self.ping_interval_ms) {
            return Err(HubError::Config(
                "hub.ping_interval_ms must be between 1000 and 120000".into(),
            ));
        }
        if self.idle_timeout_ms <= self.ping_interval_ms {
            return Err(HubError::Config(
                "hub.idle_timeout_ms must be greater than ping_interval_ms".into(),
            ));
        }
        if self.tick_interval_ms != 0 && self.tick_interval_ms < 100 {
            return Err(HubError::Config(
                "hub.tick_interval_ms must be 0 (off) or at least 100".into(),
            ));
        }
        Ok(())
    }

    /// Runtime view handed to the hub and the transports.
    pub fn settings(&self) -> HubSettings {
        HubSettings {
            outbound_queue: self.outbound_queue,
            event_buffer: self.event_buffer,
            handler_timeout: Duration::from_millis(self.handler_timeout_ms),
            write_timeout: Duration::from_millis(self.write_timeout_ms),
            max_body_bytes: self.max_body_bytes,
            ordered_dispatch: self.ordered_dispatch,
            ping_interval: Duration::from_millis(self.ping_interval_ms),
            idle_timeout: Duration::from_millis(self.idle_timeout_ms),
        }
    }
}

fn default_outbound_queue() -> usize {
    256
}
fn default_event_buffer() -> usize {
    1024
}
fn default_handler_timeout_ms() -> u64 {
    30_000
}
fn default_write_timeout_ms() -> u64 {
    10_000
}
fn default_max_body_bytes() -> usize {
    1024 * 1024
}
fn default_ping_interval_ms() -> u64 {
    20_000
}
fn default_idle_timeout_ms() -> u64 {
    60_000
}

/// Hub tunables in their runtime form.
#[derive(Debug, Clone)]
pub struct HubSettings {
    pub outbound_queue: usize,
    pub event_buffer: usize,
    pub handler_timeout: Duration,
    pub write_timeout: Duration,
    pub max_body_bytes: usize,
    pub ordered_dispatch: bool,
    pub ping_interval: Duration,
    pub idle_timeout: Duration,
}

impl Default for HubSettings {
    fn default() -> Self {
        HubSection::default().settings()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DocsSection {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_docs_output")]
    pub output: String,
}

impl Default for DocsSection {
    fn default() -> Self {
        Self {
            enabled: false,
            output: default_docs_output(),
        }
    }
}

impl DocsSection {
    pub fn validate(&self) -> Result<()> {
        if self.enabled && self.output.trim().is_empty() {
            return Err(HubError::Config(
                "docs.output must be set when docs.enabled is true".into(),
            ));
        }
        Ok(())
    }
}

fn default_docs_output() -> String {
    "rpchub-catalog.json".into()
}
