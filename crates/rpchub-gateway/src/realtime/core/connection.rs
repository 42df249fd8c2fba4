use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};
use tracing::Span;
use uuid::Uuid;

use rpchub_core::error::{HubError, Result};

use crate::realtime::types::Frame;

/// Per-connection identity. Subscriber sets compare by this, never by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnId(Uuid);

impl ConnId {
    pub fn new() -> Self {
        ConnId(Uuid::new_v4())
    }
}

impl Default for ConnId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

struct ConnInner {
    id: ConnId,
    remote: Option<SocketAddr>,
    tx: mpsc::Sender<Frame>,
    cancel: CancellationToken,
    span: Span,
}

/// Shared handle to one live socket.
///
/// Holders may only enqueue (non-blocking) or request close. The receiving
/// half of the outbound queue belongs to the connection's write loop.
#[derive(Clone)]
pub struct Connection {
    inner: Arc<ConnInner>,
}

impl Connection {
    /// Create a handle plus the receiving half of its bounded outbound queue.
    pub fn new(remote: Option<SocketAddr>, capacity: usize) -> (Self, mpsc::Receiver<Frame>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let id = ConnId::new();
        let span = tracing::info_span!("conn", id = %id, remote = ?remote);
        let conn = Self {
            inner: Arc::new(ConnInner {
                id,
                remote,
                tx,
                cancel: CancellationToken::new(),
                span,
            }),
        };
        (conn, rx)
    }

    pub fn id(&self) -> ConnId {
        self.inner.id
    }

    pub fn remote(&self) -> Option<SocketAddr> {
        self.inner.remote
    }

    /// Creation-scoped span carrying the connection id and remote host.
    pub fn span(&self) -> &Span {
        &self.inner.span
    }

    /// Enqueue without waiting. A full queue is the slow consumer's problem:
    /// the frame is dropped and `QueueFull` returned.
    pub fn try_enqueue(&self, frame: Frame) -> Result<()> {
        match self.inner.tx.try_send(frame) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(HubError::QueueFull),
            Err(TrySendError::Closed(_)) => Err(HubError::ConnectionClosed),
        }
    }

    /// Begin teardown; both loops observe this.
    pub fn close(&self) {
        self.inner.cancel.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.cancel.is_cancelled() || self.inner.tx.is_closed()
    }

    /// Resolves once teardown has begun.
    pub fn closed(&self) -> WaitForCancellationFuture<'_> {
        self.inner.cancel.cancelled()
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.inner.id)
            .field("remote", &self.inner.remote)
            .field("closed", &self.is_closed())
            .finish()
    }
}
