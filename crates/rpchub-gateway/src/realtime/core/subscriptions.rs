use std::collections::HashMap;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use rpchub_core::error::{HubError, Result};

use super::connection::{ConnId, Connection};

/// Event subscriptions: event name -> subscribed connections (by id).
///
/// An event exists once `register_event` has run for it; subscribing to
/// anything else fails and leaves the map untouched.
#[derive(Default)]
pub struct SubscriptionRegistry {
    events: DashMap<String, HashMap<ConnId, Connection>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self {
            events: DashMap::new(),
        }
    }

    /// Returns false (and warns) when the event was already registered.
    pub fn register_event(&self, name: &str) -> bool {
        match self.events.entry(name.to_string()) {
            Entry::Occupied(_) => {
                tracing::warn!(event = %name, "event registered twice");
                false
            }
            Entry::Vacant(v) => {
                v.insert(HashMap::new());
                true
            }
        }
    }

    /// Returns whether the connection was newly added. Membership is a set:
    /// repeat subscribes are no-ops.
    pub fn subscribe(&self, conn: &Connection, name: &str) -> Result<bool> {
        let mut subs = self
            .events
            .get_mut(name)
            .ok_or_else(|| HubError::UnknownEvent(name.to_string()))?;
        Ok(subs.insert(conn.id(), conn.clone()).is_none())
    }

    /// Returns whether the connection was subscribed.
    pub fn unsubscribe(&self, id: ConnId, name: &str) -> bool {
        self.events
            .get_mut(name)
            .map(|mut subs| subs.remove(&id).is_some())
            .unwrap_or(false)
    }

    /// Purge a connection from every event. Returns how many sets it left.
    pub fn remove_connection(&self, id: ConnId) -> usize {
        let mut removed = 0;
        for mut subs in self.events.iter_mut() {
            if subs.remove(&id).is_some() {
                removed += 1;
            }
        }
        removed
    }

    /// Snapshot of an event's subscribers, or `None` for unknown events.
    pub fn subscribers(&self, name: &str) -> Option<Vec<Connection>> {
        self.events
            .get(name)
            .map(|subs| subs.values().cloned().collect())
    }

    pub fn subscriber_count(&self, name: &str) -> usize {
        self.events.get(name).map(|s| s.len()).unwrap_or(0)
    }

    /// Registered event names, sorted.
    pub fn events(&self) -> Vec<String> {
        let mut names: Vec<String> = self.events.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Total (event, connection) pairs.
    pub fn total_subscriptions(&self) -> usize {
        self.events.iter().map(|e| e.value().len()).sum()
    }
}
