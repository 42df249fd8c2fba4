//! Request-scoped context handed to every handler invocation.
//!
//! The originating transport is a closed sum type so code that only makes
//! sense on a live socket (subscriptions) has to say what happens otherwise.

pub mod handler;

pub use handler::{HandlerCtx, OneShotRequest, Origin};
