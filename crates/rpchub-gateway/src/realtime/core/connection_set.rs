use dashmap::DashMap;

use super::connection::{ConnId, Connection};

/// Live connections: `conn_id -> Connection`.
///
/// Only the hub control loop inserts and removes; everyone else reads.
#[derive(Default)]
pub struct ConnectionSet {
    conns: DashMap<ConnId, Connection>,
}

impl ConnectionSet {
    pub fn new() -> Self {
        Self {
            conns: DashMap::new(),
        }
    }

    pub fn insert(&self, conn: Connection) {
        self.conns.insert(conn.id(), conn);
    }

    pub fn remove(&self, id: ConnId) -> Option<Connection> {
        self.conns.remove(&id).map(|(_, conn)| conn)
    }

    pub fn contains(&self, id: ConnId) -> bool {
        self.conns.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.conns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conns.is_empty()
    }

    /// Remove and return every connection (shutdown path).
    pub fn drain(&self) -> Vec<Connection> {
        let ids: Vec<ConnId> = self.conns.iter().map(|e| *e.key()).collect();
        ids.into_iter().filter_map(|id| self.remove(id)).collect()
    }
}
