//! Lightweight in-process metrics (dependency-free).
//!
//! Prometheus-compatible counters, gauges and histograms stored as atomics and
//! rendered by the `/metrics` handler.

pub mod metrics;

pub use metrics::HubMetrics;
