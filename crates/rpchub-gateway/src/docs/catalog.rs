use std::path::PathBuf;

use dashmap::DashMap;
use serde::Serialize;

use rpchub_core::error::{HubError, Result};

use super::{TypeShape, TypeSink};

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MethodDoc {
    pub name: String,
    pub params: &'static str,
    pub result: &'static str,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub docs: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EventDoc {
    pub name: String,
    pub payload: &'static str,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub docs: String,
}

#[derive(Serialize)]
struct Catalog {
    methods: Vec<MethodDoc>,
    events: Vec<EventDoc>,
}

/// Collects registrations and writes them as a JSON catalog on `generate`.
///
/// With no output path, `generate` only logs the counts.
#[derive(Default)]
pub struct CatalogSink {
    output: Option<PathBuf>,
    methods: DashMap<String, MethodDoc>,
    events: DashMap<String, EventDoc>,
}

impl CatalogSink {
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            output: Some(output.into()),
            ..Self::default()
        }
    }

    /// In-memory only.
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn methods(&self) -> Vec<MethodDoc> {
        let mut v: Vec<MethodDoc> = self.methods.iter().map(|e| e.value().clone()).collect();
        v.sort_by(|a, b| a.name.cmp(&b.name));
        v
    }

    pub fn events(&self) -> Vec<EventDoc> {
        let mut v: Vec<EventDoc> = self.events.iter().map(|e| e.value().clone()).collect();
        v.sort_by(|a, b| a.name.cmp(&b.name));
        v
    }

    /// Pretty-printed catalog document.
    pub fn render(&self) -> Result<String> {
        let catalog = Catalog {
            methods: self.methods(),
            events: self.events(),
        };
        serde_json::to_string_pretty(&catalog)
            .map_err(|e| HubError::Internal(format!("render catalog: {e}")))
    }
}

impl TypeSink for CatalogSink {
    fn add_handler_type(&self, method: &str, params: TypeShape, result: TypeShape, docs: &str) {
        self.methods.insert(
            method.to_string(),
            MethodDoc {
                name: method.to_string(),
                params: params.type_name,
                result: result.type_name,
                docs: docs.to_string(),
            },
        );
    }

    fn add_event_type(&self, event: &str, payload: TypeShape, docs: &str) {
        self.events.insert(
            event.to_string(),
            EventDoc {
                name: event.to_string(),
                payload: payload.type_name,
                docs: docs.to_string(),
            },
        );
    }

    fn generate(&self) -> Result<()> {
        let Some(path) = &self.output else {
            tracing::info!(methods = self.methods.len(), events = self.events.len(), "catalog collected");
            return Ok(());
        };
        let body = self.render()?;
        std::fs::write(path, body)
            .map_err(|e| HubError::Internal(format!("write catalog {}: {e}", path.display())))?;
        tracing::info!(
            path = %path.display(),
            methods = self.methods.len(),
            events = self.events.len(),
            "catalog written"
        );
        Ok(())
    }
}
