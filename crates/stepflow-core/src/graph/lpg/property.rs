//! Property storage for the LPG model.
//!
//! Every property key owns a dense column indexed by entity id. Columns
//! are reference counted and copied on write, so freezing the storage for
//! a snapshot only clones column handles; the first write after a freeze
//! copies the one column it touches.

use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::RwLock;
use stepflow_common::types::{EdgeId, NodeId, PropertyKey, Value};
use stepflow_common::utils::hash::FxHashMap;

/// Entity ids that address a slot in a property column.
pub trait EntityId: Copy + Eq + Send + Sync + 'static {
    /// Returns the column slot of this entity.
    fn slot(self) -> usize;
}

impl EntityId for NodeId {
    fn slot(self) -> usize {
        self.index()
    }
}

impl EntityId for EdgeId {
    fn slot(self) -> usize {
        self.index()
    }
}

/// Values of one property key, one slot per entity.
#[derive(Debug, Clone, Default)]
pub struct PropertyColumn {
    slots: Vec<Option<Value>>,
    present: usize,
}

impl PropertyColumn {
    /// Creates an empty column.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value in `slot`.
    #[must_use]
    pub fn get(&self, slot: usize) -> Option<&Value> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    /// Stores `value` in `slot`, returning the previous value.
    pub fn set(&mut self, slot: usize, value: Value) -> Option<Value> {
        if slot >= self.slots.len() {
            self.slots.resize(slot + 1, None);
        }
        let previous = self.slots[slot].replace(value);
        if previous.is_none() {
            self.present += 1;
        }
        previous
    }

    /// Clears `slot`, returning its value.
    pub fn take(&mut self, slot: usize) -> Option<Value> {
        let previous = self.slots.get_mut(slot).and_then(Option::take);
        if previous.is_some() {
            self.present -= 1;
        }
        previous
    }

    /// Returns the number of entities with a value.
    #[must_use]
    pub fn len(&self) -> usize {
        self.present
    }

    /// Returns true if no entity has a value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.present == 0
    }
}

type Columns = FxHashMap<PropertyKey, Arc<PropertyColumn>>;

/// Mutable property storage for one kind of entity.
#[derive(Debug)]
pub struct PropertyStorage<Id: EntityId> {
    columns: RwLock<Columns>,
    _entity: PhantomData<fn() -> Id>,
}

impl<Id: EntityId> PropertyStorage<Id> {
    /// Creates empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self {
            columns: RwLock::new(Columns::default()),
            _entity: PhantomData,
        }
    }

    /// Sets `key` of entity `id`.
    pub fn set(&self, id: Id, key: PropertyKey, value: Value) {
        let mut columns = self.columns.write();
        let column = columns.entry(key).or_default();
        Arc::make_mut(column).set(id.slot(), value);
    }

    /// Returns `key` of entity `id`.
    #[must_use]
    pub fn get(&self, id: Id, key: &PropertyKey) -> Option<Value> {
        self.columns
            .read()
            .get(key)
            .and_then(|column| column.get(id.slot()).cloned())
    }

    /// Removes every property of entity `id`.
    ///
    /// Only columns holding a value for `id` are copied.
    pub fn clear_entity(&self, id: Id) {
        let slot = id.slot();
        let mut columns = self.columns.write();
        for column in columns.values_mut() {
            if column.get(slot).is_some() {
                Arc::make_mut(column).take(slot);
            }
        }
    }

    /// Returns the number of property keys ever set.
    #[must_use]
    pub fn key_count(&self) -> usize {
        self.columns.read().len()
    }

    /// Captures the current columns for a snapshot.
    #[must_use]
    pub fn freeze(&self) -> FrozenProperties<Id> {
        FrozenProperties {
            columns: self.columns.read().clone(),
            _entity: PhantomData,
        }
    }
}

impl<Id: EntityId> Default for PropertyStorage<Id> {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only property columns captured by a snapshot.
pub struct FrozenProperties<Id: EntityId> {
    columns: Columns,
    _entity: PhantomData<fn() -> Id>,
}

impl<Id: EntityId> FrozenProperties<Id> {
    /// Returns `key` of entity `id`.
    #[must_use]
    pub fn get(&self, id: Id, key: &PropertyKey) -> Option<&Value> {
        self.columns.get(key).and_then(|column| column.get(id.slot()))
    }
}

impl<Id: EntityId> std::fmt::Debug for FrozenProperties<Id> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrozenProperties")
            .field("keys", &self.columns.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let storage = PropertyStorage::new();
        let name = PropertyKey::new("name");
        let age = PropertyKey::new("age");

        storage.set(NodeId::new(1), name.clone(), "Alice".into());
        storage.set(NodeId::new(1), age.clone(), 30i64.into());
        storage.set(NodeId::new(5), name.clone(), "Bob".into());

        assert_eq!(
            storage.get(NodeId::new(1), &age).and_then(|v| v.as_int64()),
            Some(30)
        );
        assert!(storage.get(NodeId::new(5), &age).is_none());
        assert!(storage.get(NodeId::new(9), &name).is_none());
        assert_eq!(storage.key_count(), 2);
    }

    #[test]
    fn test_clear_entity() {
        let storage = PropertyStorage::new();
        let edge = EdgeId::new(3);
        storage.set(edge, PropertyKey::new("weight"), 1.5f64.into());
        storage.set(edge, PropertyKey::new("since"), 2019i64.into());

        storage.clear_entity(edge);

        assert!(storage.get(edge, &PropertyKey::new("weight")).is_none());
        assert!(storage.get(edge, &PropertyKey::new("since")).is_none());
    }

    #[test]
    fn test_frozen_columns_ignore_later_writes() {
        let storage = PropertyStorage::new();
        let node = NodeId::new(0);
        let key = PropertyKey::new("age");
        storage.set(node, key.clone(), 30i64.into());

        let frozen = storage.freeze();
        storage.set(node, key.clone(), 31i64.into());
        storage.clear_entity(node);

        assert_eq!(frozen.get(node, &key).and_then(Value::as_int64), Some(30));
        assert!(storage.get(node, &key).is_none());
    }

    #[test]
    fn test_column_counts_present_values() {
        let mut column = PropertyColumn::new();
        assert!(column.set(4, "x".into()).is_none());
        assert!(column.set(4, "y".into()).is_some());
        column.set(0, "z".into());
        assert_eq!(column.len(), 2);

        assert!(column.take(4).is_some());
        assert!(column.take(4).is_none());
        assert!(column.take(100).is_none());
        assert_eq!(column.len(), 1);
        assert!(!column.is_empty());
    }
}
