//! Dispatch core: method registry, middleware composition, and the shared
//! request path used by both transports.

pub mod dispatcher;
pub mod handler;
pub mod middleware;
pub mod registry;

pub use dispatcher::Dispatcher;
pub use handler::{HandlerFn, MethodEntry, Params, ParserFn};
pub use middleware::{compose, from_fn, logging, Middleware};
pub use registry::MethodRegistry;
