//! Property lookups against a snapshot.

use std::sync::Arc;

use stepflow_common::types::{EdgeId, NodeId, PropertyKey, Value};

use crate::execution::ColumnValue;
use crate::graph::lpg::GraphSnapshot;

/// Entities that carry properties in a snapshot.
pub trait SnapshotEntity: ColumnValue + Copy {
    /// Name used in plan descriptions.
    const NAME: &'static str;

    /// Looks up a property of `id`.
    fn property<'a>(snapshot: &'a GraphSnapshot, id: Self, key: &PropertyKey) -> Option<&'a Value>;
}

impl SnapshotEntity for NodeId {
    const NAME: &'static str = "Node";

    fn property<'a>(snapshot: &'a GraphSnapshot, id: Self, key: &PropertyKey) -> Option<&'a Value> {
        snapshot.node_property(id, key)
    }
}

impl SnapshotEntity for EdgeId {
    const NAME: &'static str = "Edge";

    fn property<'a>(snapshot: &'a GraphSnapshot, id: Self, key: &PropertyKey) -> Option<&'a Value> {
        snapshot.edge_property(id, key)
    }
}

/// Reads one property key for a batch of entities.
pub struct PropertyReader {
    snapshot: Arc<GraphSnapshot>,
    key: PropertyKey,
}

impl PropertyReader {
    /// Creates a reader for `key`.
    #[must_use]
    pub fn new(snapshot: Arc<GraphSnapshot>, key: PropertyKey) -> Self {
        Self { snapshot, key }
    }

    /// Returns the key being read.
    #[must_use]
    pub fn key(&self) -> &PropertyKey {
        &self.key
    }

    /// Maps every id through `convert`, stopping at the first error.
    ///
    /// `convert` sees `None` for entities without the property.
    pub fn read_all<Id, T, E>(
        &self,
        ids: &[Id],
        mut convert: impl FnMut(Option<&Value>) -> Result<T, E>,
    ) -> Result<Vec<T>, E>
    where
        Id: SnapshotEntity,
    {
        ids.iter()
            .map(|&id| convert(Id::property(&self.snapshot, id, &self.key)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::lpg::LpgStore;

    #[test]
    fn test_read_all() {
        let store = LpgStore::new();
        let a = store.create_node_with_props(&[], [("age", 30i64)]);
        let b = store.create_node(&[]);
        let e = store
            .create_edge_with_props(a, b, "KNOWS", [("since", 2020i64)])
            .unwrap();

        let reader = PropertyReader::new(store.snapshot(), PropertyKey::new("age"));
        let ages = reader
            .read_all(&[a, b], |v| Ok::<_, ()>(v.and_then(Value::as_int64)))
            .unwrap();
        assert_eq!(ages, vec![Some(30), None]);

        let reader = PropertyReader::new(store.snapshot(), PropertyKey::new("since"));
        let since = reader
            .read_all(&[e], |v| Ok::<_, ()>(v.cloned()))
            .unwrap();
        assert_eq!(since, vec![Some(Value::Int64(2020))]);
    }
}
