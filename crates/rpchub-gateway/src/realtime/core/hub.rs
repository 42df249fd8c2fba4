use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use rpchub_core::error::{HubError, Result};
use rpchub_core::protocol::{Event, Request, Response};

use crate::config::HubSettings;
use crate::context::{HandlerCtx, Origin};
use crate::dispatch::handler::{typed_handler, typed_parser};
use crate::dispatch::{compose, Dispatcher, MethodEntry, Middleware};
use crate::docs::{NoopSink, TypeShape, TypeSink};
use crate::obs::HubMetrics;
use crate::realtime::types::{Broadcast, Frame};

use super::connection::{ConnId, Connection};
use super::connection_set::ConnectionSet;
use super::subscriptions::SubscriptionRegistry;

/// Capacity of the connect/disconnect control channels.
const CONTROL_CAPACITY: usize = 1024;

/// Per-method registration options.
#[derive(Default, Clone)]
pub struct MethodOptions {
    pub docs: String,
    /// Wrapped inside the hub's global middleware, first entry outermost.
    pub middleware: Vec<Middleware>,
}

impl MethodOptions {
    pub fn docs(mut self, docs: impl Into<String>) -> Self {
        self.docs = docs.into();
        self
    }

    pub fn middleware(mut self, m: Middleware) -> Self {
        self.middleware.push(m);
        self
    }
}

pub struct HubBuilder {
    settings: HubSettings,
    middleware: Vec<Middleware>,
    sink: Arc<dyn TypeSink>,
    metrics: Arc<HubMetrics>,
}

impl HubBuilder {
    /// Global middleware, applied to every method registered afterwards.
    /// First added is outermost.
    pub fn middleware(mut self, m: Middleware) -> Self {
        self.middleware.push(m);
        self
    }

    pub fn type_sink(mut self, sink: Arc<dyn TypeSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn metrics(mut self, metrics: Arc<HubMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn build(self) -> (Hub, HubRuntime) {
        let (register_tx, register_rx) = mpsc::channel(CONTROL_CAPACITY);
        let (unregister_tx, unregister_rx) = mpsc::channel(CONTROL_CAPACITY);
        let (broadcast_tx, broadcast_rx) = mpsc::channel(self.settings.event_buffer.max(1));

        let hub = Hub {
            inner: Arc::new(HubInner {
                dispatcher: Dispatcher::new(self.settings.handler_timeout, Arc::clone(&self.metrics)),
                settings: self.settings,
                global_middleware: self.middleware,
                subscriptions: SubscriptionRegistry::new(),
                connections: ConnectionSet::new(),
                sink: self.sink,
                metrics: self.metrics,
                register_tx,
                unregister_tx,
                broadcast_tx,
                started: Instant::now(),
            }),
        };

        let runtime = HubRuntime {
            hub: hub.clone(),
            register_rx,
            unregister_rx,
            broadcast_rx,
        };
        (hub, runtime)
    }
}

struct HubInner {
    settings: HubSettings,
    dispatcher: Dispatcher,
    global_middleware: Vec<Middleware>,
    subscriptions: SubscriptionRegistry,
    connections: ConnectionSet,
    sink: Arc<dyn TypeSink>,
    metrics: Arc<HubMetrics>,
    register_tx: mpsc::Sender<(Connection, oneshot::Sender<()>)>,
    unregister_tx: mpsc::Sender<(ConnId, oneshot::Sender<()>)>,
    broadcast_tx: mpsc::Sender<Broadcast>,
    started: Instant,
}

/// Central coordinator: methods, events, subscriptions, live connections.
///
/// Cheap to clone. Connect, disconnect and broadcast fan-out are serialized
/// through [`HubRuntime::run`]; method lookup and subscription changes are
/// not, and each has its own lock.
#[derive(Clone)]
pub struct Hub {
    inner: Arc<HubInner>,
}

impl Hub {
    pub fn builder(settings: HubSettings) -> HubBuilder {
        HubBuilder {
            settings,
            middleware: Vec::new(),
            sink: Arc::new(NoopSink),
            metrics: Arc::new(HubMetrics::default()),
        }
    }

    pub fn settings(&self) -> &HubSettings {
        &self.inner.settings
    }

    pub fn metrics(&self) -> &Arc<HubMetrics> {
        &self.inner.metrics
    }

    pub fn connections(&self) -> &ConnectionSet {
        &self.inner.connections
    }

    pub fn subscriptions(&self) -> &SubscriptionRegistry {
        &self.inner.subscriptions
    }

    pub fn uptime(&self) -> Duration {
        self.inner.started.elapsed()
    }

    // --------------------
    // Registration (startup)
    // --------------------

    /// Register a method with no docs and no per-method middleware.
    pub fn register_method<P, R, F, Fut>(&self, name: &str, f: F) -> Result<()>
    where
        P: DeserializeOwned + Send + 'static,
        R: Serialize + Send + 'static,
        F: Fn(HandlerCtx, P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R>> + Send + 'static,
    {
        self.register_method_with(name, MethodOptions::default(), f)
    }

    /// Register a method. A second registration under the same name fails.
    pub fn register_method_with<P, R, F, Fut>(&self, name: &str, opts: MethodOptions, f: F) -> Result<()>
    where
        P: DeserializeOwned + Send + 'static,
        R: Serialize + Send + 'static,
        F: Fn(HandlerCtx, P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R>> + Send + 'static,
    {
        let handler = compose(
            typed_handler::<P, R, F, Fut>(f),
            &self.inner.global_middleware,
            &opts.middleware,
        );
        let entry = MethodEntry::new(name, handler, typed_parser::<P>(name));
        self.inner.dispatcher.registry().register(entry)?;
        self.inner
            .sink
            .add_handler_type(name, TypeShape::of::<P>(), TypeShape::of::<R>(), &opts.docs);
        tracing::debug!(method = %name, "method registered");
        Ok(())
    }

    /// Register an event name. Re-registration only warns.
    pub fn register_event<T: 'static>(&self, name: &str, docs: &str) -> bool {
        let fresh = self.inner.subscriptions.register_event(name);
        if fresh {
            self.inner
                .sink
                .add_event_type(name, TypeShape::of::<T>(), docs);
        }
        fresh
    }

    pub fn methods(&self) -> Vec<String> {
        self.inner.dispatcher.registry().names()
    }

    pub fn events(&self) -> Vec<String> {
        self.inner.subscriptions.events()
    }

    /// Flush registration metadata to the documentation sink.
    pub fn generate_docs(&self) -> Result<()> {
        self.inner.sink.generate()
    }

    // --------------------
    // Connection lifecycle
    // --------------------

    /// Hand a new connection to the control loop and wait until it is registered.
    pub async fn connect(&self, conn: Connection) -> Result<()> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.inner
            .register_tx
            .send((conn, ack_tx))
            .await
            .map_err(|_| HubError::ConnectionClosed)?;
        ack_rx.await.map_err(|_| HubError::ConnectionClosed)
    }

    /// Unregister a connection and purge its subscriptions. Falls back to
    /// inline cleanup when the control loop is gone.
    pub async fn disconnect(&self, id: ConnId) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.inner.unregister_tx.send((id, ack_tx)).await.is_err() || ack_rx.await.is_err() {
            self.on_disconnect(id);
        }
    }

    fn on_connect(&self, conn: Connection) {
        let m = &self.inner.metrics;
        m.connections_accepted.inc(&[]);
        m.connections_active.inc(&[]);
        tracing::debug!(parent: conn.span(), active = self.inner.connections.len() + 1, "connection registered");
        self.inner.connections.insert(conn);
    }

    fn on_disconnect(&self, id: ConnId) {
        let purged = self.inner.subscriptions.remove_connection(id);
        if let Some(conn) = self.inner.connections.remove(id) {
            conn.close();
            self.inner.metrics.connections_active.dec(&[]);
            tracing::debug!(parent: conn.span(), subscriptions = purged, "connection unregistered");
        }
    }

    // --------------------
    // Subscriptions (synchronous, on the caller's task)
    // --------------------

    /// Subscribe a live connection. Returns whether it was newly added.
    pub fn subscribe(&self, conn: &Connection, event: &str) -> Result<bool> {
        if !self.inner.connections.contains(conn.id()) || conn.is_closed() {
            return Err(HubError::ConnectionClosed);
        }
        let added = self.inner.subscriptions.subscribe(conn, event)?;
        // Teardown may have started between the check and the insert; its
        // purge could already have run.
        if conn.is_closed() {
            self.inner.subscriptions.unsubscribe(conn.id(), event);
            return Err(HubError::ConnectionClosed);
        }
        Ok(added)
    }

    /// Returns whether the connection was subscribed.
    pub fn unsubscribe(&self, conn: &Connection, event: &str) -> bool {
        self.inner.subscriptions.unsubscribe(conn.id(), event)
    }

    // --------------------
    // Events
    // --------------------

    /// Queue an event for broadcast. Waits for buffer space when the
    /// broadcast channel is full.
    pub async fn publish_event<T: Serialize>(&self, event: &str, data: &T) -> Result<()> {
        let b = prepare(event, data)?;
        self.inner
            .broadcast_tx
            .send(b)
            .await
            .map_err(|_| HubError::Internal("hub control loop stopped".into()))
    }

    /// Like [`Hub::publish_event`] but fails with `QueueFull` instead of waiting.
    pub fn try_publish_event<T: Serialize>(&self, event: &str, data: &T) -> Result<()> {
        let b = prepare(event, data)?;
        self.inner.broadcast_tx.try_send(b).map_err(|e| match e {
            TrySendError::Full(_) => HubError::QueueFull,
            TrySendError::Closed(_) => HubError::Internal("hub control loop stopped".into()),
        })
    }

    fn fan_out(&self, b: Broadcast) {
        let m = &self.inner.metrics;
        let Some(subs) = self.inner.subscriptions.subscribers(&b.event) else {
            tracing::warn!(event = %b.event, "publish to unregistered event dropped");
            m.events_dropped
                .inc(&[("event", "_unregistered"), ("reason", "unknown_event")]);
            return;
        };
        m.events_published.inc(&[("event", &*b.event)]);

        for conn in subs {
            match conn.try_enqueue(b.frame.clone()) {
                Ok(()) => {}
                Err(HubError::QueueFull) => {
                    tracing::warn!(parent: conn.span(), event = %b.event, "outbound queue full, event dropped");
                    m.events_dropped
                        .inc(&[("event", &*b.event), ("reason", "queue_full")]);
                }
                Err(_) => {
                    self.inner.subscriptions.unsubscribe(conn.id(), &b.event);
                    m.events_dropped
                        .inc(&[("event", &*b.event), ("reason", "closed")]);
                }
            }
        }
    }

    // --------------------
    // Dispatch
    // --------------------

    pub async fn dispatch(&self, origin: Origin, req: Request) -> Response {
        self.inner.dispatcher.dispatch(self, origin, req).await
    }
}

fn prepare<T: Serialize>(event: &str, data: &T) -> Result<Broadcast> {
    let ev = Event::new(event, data)?;
    Ok(Broadcast {
        event: Arc::from(event),
        frame: Frame::event(&ev)?,
    })
}

/// The hub's control loop. Owns the receiving ends of the three control
/// channels.
pub struct HubRuntime {
    hub: Hub,
    register_rx: mpsc::Receiver<(Connection, oneshot::Sender<()>)>,
    unregister_rx: mpsc::Receiver<(ConnId, oneshot::Sender<()>)>,
    broadcast_rx: mpsc::Receiver<Broadcast>,
}

impl HubRuntime {
    /// Run until `shutdown` fires, then close every live connection.
    ///
    /// Each branch finishes without awaiting anything external: registration
    /// is a map insert, broadcast is `try_send` per subscriber.
    pub async fn run(mut self, shutdown: CancellationToken) {
        tracing::info!("hub control loop started");
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                Some((conn, ack)) = self.register_rx.recv() => {
                    self.hub.on_connect(conn);
                    let _ = ack.send(());
                }
                Some((id, ack)) = self.unregister_rx.recv() => {
                    self.hub.on_disconnect(id);
                    let _ = ack.send(());
                }
                Some(b) = self.broadcast_rx.recv() => self.hub.fan_out(b),
                else => break,
            }
        }

        let live = self.hub.inner.connections.drain();
        for conn in &live {
            conn.close();
            self.hub.inner.subscriptions.remove_connection(conn.id());
            self.hub.inner.metrics.connections_active.dec(&[]);
        }
        tracing::info!(closed = live.len(), "hub control loop stopped");
    }

    /// Spawn the loop on the current runtime.
    pub fn spawn(self, shutdown: CancellationToken) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }
}
