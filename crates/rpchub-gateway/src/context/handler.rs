use std::net::SocketAddr;
use std::sync::Arc;

use tracing::Span;

use rpchub_core::error::{HubError, Result};
use rpchub_core::protocol::Id;

use crate::realtime::{Connection, Hub};

/// Stateless one-shot (HTTP POST) caller.
#[derive(Debug, Clone, Default)]
pub struct OneShotRequest {
    remote: Option<SocketAddr>,
}

impl OneShotRequest {
    pub fn new(remote: Option<SocketAddr>) -> Self {
        Self { remote }
    }

    pub fn remote(&self) -> Option<SocketAddr> {
        self.remote
    }
}

/// Which transport a request came in on. Never both.
#[derive(Debug, Clone)]
pub enum Origin {
    Connection(Connection),
    OneShot(OneShotRequest),
}

impl Origin {
    /// Label used in spans, metrics, and error messages.
    pub fn transport(&self) -> &'static str {
        match self {
            Origin::Connection(_) => "ws",
            Origin::OneShot(_) => "http",
        }
    }

    pub fn remote(&self) -> Option<SocketAddr> {
        match self {
            Origin::Connection(c) => c.remote(),
            Origin::OneShot(r) => r.remote(),
        }
    }
}

/// Per-dispatch context: request identity, enriched span, origin, hub.
#[derive(Clone)]
pub struct HandlerCtx {
    method: Arc<str>,
    request_id: Id,
    span: Span,
    origin: Origin,
    hub: Hub,
}

impl HandlerCtx {
    pub fn new(method: Arc<str>, request_id: Id, span: Span, origin: Origin, hub: Hub) -> Self {
        Self {
            method,
            request_id,
            span,
            origin,
            hub,
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub(crate) fn method_arc(&self) -> &Arc<str> {
        &self.method
    }

    pub fn request_id(&self) -> &Id {
        &self.request_id
    }

    /// Span carrying `method`, `id` and `transport`. Handler futures already
    /// run inside it; use it when spawning follow-up work.
    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// The originating socket, if the request came over one.
    pub fn connection(&self) -> Option<&Connection> {
        match &self.origin {
            Origin::Connection(c) => Some(c),
            Origin::OneShot(_) => None,
        }
    }

    pub fn hub(&self) -> &Hub {
        &self.hub
    }

    /// Subscribe the calling connection. Visible to broadcasts once this returns.
    pub fn subscribe(&self, event: &str) -> Result<bool> {
        match &self.origin {
            Origin::Connection(conn) => self.hub.subscribe(conn, event),
            Origin::OneShot(_) => Err(HubError::SubscriptionsUnavailable(self.origin.transport())),
        }
    }

    pub fn unsubscribe(&self, event: &str) -> Result<bool> {
        match &self.origin {
            Origin::Connection(conn) => Ok(self.hub.unsubscribe(conn, event)),
            Origin::OneShot(_) => Err(HubError::SubscriptionsUnavailable(self.origin.transport())),
        }
    }
}
