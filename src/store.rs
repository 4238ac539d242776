use std::sync::atomic::{AtomicI64, Ordering};

use dashmap::DashMap;
use tracing::debug;

/// A record the store can hold. The identity starts out unset and is
/// assigned once, by the store, on first save.
pub trait Entity: Clone + Send + Sync {
    fn id(&self) -> Option<i64>;
    fn assign_id(&mut self, id: i64);
}

/// In-memory keyed container with store-generated identities.
///
/// Every record going in or coming out is cloned, so callers never share
/// state with what the store keeps.
pub struct EntityStore<T: Entity> {
    sequence: AtomicI64,
    pub(crate) entities: DashMap<i64, T>,
}

impl<T: Entity> Default for EntityStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> EntityStore<T> {
    pub fn new() -> Self {
        Self {
            sequence: AtomicI64::new(0),
            entities: DashMap::new(),
        }
    }

    /// Insert a new record (assigning an id) or overwrite the one stored
    /// under `entity.id()`.
    pub fn save(&self, mut entity: T) -> T {
        let id = match entity.id() {
            Some(id) => id,
            None => {
                let id = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
                entity.assign_id(id);
                debug!(id, "allocated entity id");
                id
            }
        };
        self.entities.insert(id, entity.clone());
        entity
    }

    pub fn find_by_id(&self, id: i64) -> Option<T> {
        self.entities.get(&id).map(|entry| entry.value().clone())
    }

    /// Unknown ids are ignored.
    pub fn delete_by_id(&self, id: i64) {
        self.entities.remove(&id);
    }

    /// Drops every record. The id sequence keeps counting.
    pub fn delete_all(&self) {
        self.entities.clear();
    }

    pub fn count_all(&self) -> usize {
        self.entities.len()
    }
}
