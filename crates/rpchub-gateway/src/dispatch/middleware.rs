//! Middleware: a function from one handler to another.
//!
//! Composition order is fixed: global middleware is outermost, per-method
//! middleware sits inside it, the handler is innermost. Within each list the
//! first entry wraps the ones after it.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use futures_util::future::BoxFuture;
use serde_json::value::RawValue;

use rpchub_core::error::Result;

use super::handler::{HandlerFn, Params};
use crate::context::HandlerCtx;

pub type Middleware = Arc<dyn Fn(HandlerFn) -> HandlerFn + Send + Sync>;

/// Wrap `handler` so a request flows global[0] → … → method[n] → handler.
pub fn compose(handler: HandlerFn, global: &[Middleware], method: &[Middleware]) -> HandlerFn {
    global
        .iter()
        .chain(method.iter())
        .rev()
        .fold(handler, |next, mw| mw(next))
}

/// Build middleware from an async closure receiving the next handler.
pub fn from_fn<F, Fut>(f: F) -> Middleware
where
    F: Fn(HandlerCtx, Params, HandlerFn) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Box<RawValue>>> + Send + 'static,
{
    let f = Arc::new(f);
    Arc::new(move |next: HandlerFn| -> HandlerFn {
        let f = Arc::clone(&f);
        Arc::new(
            move |ctx: HandlerCtx, params: Params| -> BoxFuture<'static, Result<Box<RawValue>>> {
                Box::pin(f(ctx, params, Arc::clone(&next)))
            },
        )
    })
}

/// Debug-level round-trip logging, inside the request span.
pub fn logging() -> Middleware {
    from_fn(|ctx: HandlerCtx, params: Params, next: HandlerFn| async move {
        let started = Instant::now();
        let res = next(ctx, params).await;
        match &res {
            Ok(_) => tracing::debug!(elapsed_us = started.elapsed().as_micros() as u64, "handled"),
            Err(e) => tracing::debug!(
                elapsed_us = started.elapsed().as_micros() as u64,
                code = e.code().as_i64(),
                error = %e,
                "handler returned error"
            ),
        }
        res
    })
}
