use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::FutureExt;
use serde_json::value::RawValue;
use tracing::{Instrument, Span};

use rpchub_core::error::{HubError, Result};
use rpchub_core::protocol::{Id, Request, Response};

use super::handler::MethodEntry;
use super::registry::MethodRegistry;
use crate::context::{HandlerCtx, Origin};
use crate::obs::HubMetrics;
use crate::realtime::Hub;

/// Shared request path for both transports.
///
/// lookup → (timeout ∘ catch_unwind)(parse params → composed handler) → map
/// errors. Whatever happens, the caller gets a well-formed `Response`.
pub struct Dispatcher {
    registry: MethodRegistry,
    timeout: Duration,
    metrics: Arc<HubMetrics>,
}

impl Dispatcher {
    pub fn new(timeout: Duration, metrics: Arc<HubMetrics>) -> Self {
        Self {
            registry: MethodRegistry::new(),
            timeout,
            metrics,
        }
    }

    pub fn registry(&self) -> &MethodRegistry {
        &self.registry
    }

    pub async fn dispatch(&self, hub: &Hub, origin: Origin, req: Request) -> Response {
        let Request {
            id, method, params, ..
        } = req;
        let transport = origin.transport();
        let remote = origin.remote();
        let span = tracing::info_span!("rpc", method = %method, id = %id, transport, remote = ?remote);

        let outcome = self
            .invoke(hub, origin, &id, &method, params.as_deref(), span.clone())
            .instrument(span.clone())
            .await;

        match outcome {
            Ok(raw) => {
                self.metrics
                    .requests
                    .inc(&[("transport", transport), ("outcome", "ok")]);
                Response::result(id, raw)
            }
            Err(e) => {
                let code = e.code();
                self.metrics
                    .requests
                    .inc(&[("transport", transport), ("outcome", code.as_str())]);
                span.in_scope(|| {
                    tracing::debug!(code = code.as_i64(), error = %e, "request failed")
                });
                Response::error(Some(id), e.to_error_object())
            }
        }
    }

    async fn invoke(
        &self,
        hub: &Hub,
        origin: Origin,
        id: &Id,
        method: &str,
        params: Option<&RawValue>,
        span: Span,
    ) -> Result<Box<RawValue>> {
        let entry: Arc<MethodEntry> = self
            .registry
            .lookup(method)
            .ok_or_else(|| HubError::MethodNotFound(method.to_string()))?;
        let ctx = HandlerCtx::new(
            Arc::clone(entry.name()),
            id.clone(),
            span,
            origin,
            hub.clone(),
        );
        // Params are parsed and the handler is called inside the guarded
        // future: user `Deserialize` impls and handler construction may panic.
        let call = AssertUnwindSafe(async move {
            let params = entry.parse(params)?;
            let handler = entry.handler();
            handler(ctx, params).await
        })
        .catch_unwind();

        let started = Instant::now();
        let res = tokio::time::timeout(self.timeout, call).await;
        self.metrics
            .dispatch_duration
            .observe(&[("method", method)], started.elapsed());

        match res {
            Err(_) => {
                tracing::warn!(timeout_ms = self.timeout.as_millis() as u64, "handler timed out");
                Err(HubError::Timeout {
                    method: method.to_string(),
                    after_ms: self.timeout.as_millis() as u64,
                })
            }
            Ok(Err(panic)) => {
                let msg = panic_message(panic.as_ref());
                self.metrics.handler_panics.inc(&[("method", method)]);
                tracing::error!(panic = %msg, "method panicked");
                Err(HubError::Internal(format!("{method}: panicked: {msg}")))
            }
            Ok(Ok(Ok(raw))) => Ok(raw),
            Ok(Ok(Err(e))) if e.is_client_facing() => Err(e),
            Ok(Ok(Err(e))) => {
                let text = match e {
                    HubError::Internal(m) => m,
                    other => other.to_string(),
                };
                Err(HubError::Internal(format!("{method}: {text}")))
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
