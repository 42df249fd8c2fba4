//! Shared application state for the hub gateway.
//!
//! Builds the hub from config, registers the built-ins, and hands the control
//! loop back to the caller. Startup errors are returned, never panicked.

use std::sync::Arc;

use rpchub_core::error::Result;

use crate::config::GatewayConfig;
use crate::dispatch;
use crate::docs::{CatalogSink, NoopSink, TypeSink};
use crate::obs::HubMetrics;
use crate::realtime::{Hub, HubRuntime};
use crate::services;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    hub: Hub,
}

struct AppStateInner {
    cfg: GatewayConfig,
}

impl AppState {
    /// Build application state. The returned runtime must be run (or
    /// spawned) before any connection can be accepted.
    pub fn new(cfg: GatewayConfig) -> Result<(Self, HubRuntime)> {
        let sink: Arc<dyn TypeSink> = if cfg.docs.enabled {
            Arc::new(CatalogSink::new(cfg.docs.output.clone()))
        } else {
            Arc::new(NoopSink)
        };

        let (hub, runtime) = Hub::builder(cfg.hub.settings())
            .middleware(dispatch::logging())
            .type_sink(sink)
            .metrics(Arc::new(HubMetrics::default()))
            .build();

        services::register_builtins(&hub)?;

        tracing::info!(
            methods = hub.methods().len(),
            events = hub.events().len(),
            "built-ins registered"
        );

        Ok((
            Self {
                inner: Arc::new(AppStateInner { cfg }),
                hub,
            },
            runtime,
        ))
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn hub(&self) -> &Hub {
        &self.hub
    }

    pub fn metrics(&self) -> &Arc<HubMetrics> {
        self.hub.metrics()
    }

    pub fn is_draining(&self) -> bool {
        self.hub.metrics().is_draining()
    }

    /// Gauges read straight from the hub's maps at scrape time.
    pub fn metrics_extra(&self) -> Vec<(&'static str, u64)> {
        let hub = &self.hub;
        vec![
            ("rpchub_connections_current", hub.connections().len() as u64),
            ("rpchub_subscriptions_current", hub.subscriptions().total_subscriptions() as u64),
            ("rpchub_methods_registered", hub.methods().len() as u64),
            ("rpchub_uptime_seconds", hub.uptime().as_secs()),
        ]
    }
}
