//! Type-erased method entries.
//!
//! A method is an immutable pair: a parser turning raw params into a boxed
//! typed value, and an invoker that takes that value back out and runs the
//! user's async function. Middleware wraps the invoker only.

use std::any::Any;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::value::RawValue;

use rpchub_core::error::{HubError, Result};

use crate::context::HandlerCtx;

/// Parsed params, boxed so every method shares one invoker signature.
pub type Params = Box<dyn Any + Send>;

/// Invoker after type erasure. Returns the already-encoded result.
pub type HandlerFn =
    Arc<dyn Fn(HandlerCtx, Params) -> BoxFuture<'static, Result<Box<RawValue>>> + Send + Sync>;

/// Raw params (absent = `None`) to typed params.
pub type ParserFn = Arc<dyn Fn(Option<&RawValue>) -> Result<Params> + Send + Sync>;

pub struct MethodEntry {
    name: Arc<str>,
    handler: HandlerFn,
    parser: ParserFn,
}

impl MethodEntry {
    pub fn new(name: impl Into<Arc<str>>, handler: HandlerFn, parser: ParserFn) -> Self {
        Self {
            name: name.into(),
            handler,
            parser,
        }
    }

    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    pub fn parse(&self, raw: Option<&RawValue>) -> Result<Params> {
        (self.parser)(raw)
    }

    pub fn handler(&self) -> HandlerFn {
        Arc::clone(&self.handler)
    }
}

/// Parser for `P`. Missing params are parsed as JSON `null`.
pub fn typed_parser<P>(method: &str) -> ParserFn
where
    P: DeserializeOwned + Send + 'static,
{
    let method = method.to_string();
    Arc::new(move |raw: Option<&RawValue>| {
        let text = raw.map(RawValue::get).unwrap_or("null");
        serde_json::from_str::<P>(text)
            .map(|p| Box::new(p) as Params)
            .map_err(|e| HubError::InvalidParams {
                method: method.clone(),
                reason: e.to_string(),
            })
    })
}

/// Erase an `async fn(ctx, P) -> Result<R>` into a [`HandlerFn`].
pub fn typed_handler<P, R, F, Fut>(f: F) -> HandlerFn
where
    P: Send + 'static,
    R: Serialize + Send + 'static,
    F: Fn(HandlerCtx, P) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R>> + Send + 'static,
{
    let f = Arc::new(f);
    Arc::new(move |ctx: HandlerCtx, params: Params| -> BoxFuture<'static, Result<Box<RawValue>>> {
        let f = Arc::clone(&f);
        Box::pin(async move {
            let method = Arc::clone(ctx.method_arc());
            let params = params.downcast::<P>().map_err(|_| {
                HubError::Internal(format!("{method}: params reached handler with the wrong type"))
            })?;
            let out = f(ctx, *params).await?;
            serde_json::value::to_raw_value(&out)
                .map_err(|e| HubError::Internal(format!("encode result for {method}: {e}")))
        })
    })
}
