use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use rpchub_core::error::{HubError, Result};

use super::handler::MethodEntry;

/// Method name -> entry. Written during startup, read on every request.
#[derive(Default)]
pub struct MethodRegistry {
    methods: DashMap<String, Arc<MethodEntry>>,
}

impl MethodRegistry {
    pub fn new() -> Self {
        Self {
            methods: DashMap::new(),
        }
    }

    /// Fails on a second registration under the same name.
    pub fn register(&self, entry: MethodEntry) -> Result<()> {
        match self.methods.entry(entry.name().to_string()) {
            Entry::Occupied(o) => Err(HubError::DuplicateMethod(o.key().clone())),
            Entry::Vacant(v) => {
                v.insert(Arc::new(entry));
                Ok(())
            }
        }
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<MethodEntry>> {
        self.methods.get(name).map(|e| Arc::clone(e.value()))
    }

    /// Registered method names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.methods.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}
