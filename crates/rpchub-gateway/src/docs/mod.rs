//! Registration metadata sinks.
//!
//! The hub reports every method (params/result types) and event (payload
//! type) to a [`TypeSink`] as it is registered. The sink decides what to do
//! with it; `generate` is called once after startup registration.

mod catalog;

pub use catalog::{CatalogSink, EventDoc, MethodDoc};

use rpchub_core::Result;

/// Rust type name of a registered params/result/payload type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeShape {
    pub type_name: &'static str,
}

impl TypeShape {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
        }
    }
}

pub trait TypeSink: Send + Sync {
    fn add_handler_type(&self, method: &str, params: TypeShape, result: TypeShape, docs: &str);
    fn add_event_type(&self, event: &str, payload: TypeShape, docs: &str);
    fn generate(&self) -> Result<()>;
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl TypeSink for NoopSink {
    fn add_handler_type(&self, _: &str, _: TypeShape, _: TypeShape, _: &str) {}
    fn add_event_type(&self, _: &str, _: TypeShape, _: &str) {}
    fn generate(&self) -> Result<()> {
        Ok(())
    }
}
