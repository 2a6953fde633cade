//! The mutable graph store.
//!
//! Pipelines never read the store directly. They run against an immutable
//! [`GraphSnapshot`] taken with [`LpgStore::snapshot`], which lets writers
//! keep going while queries execute.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use stepflow_common::types::{EdgeId, EdgeTypeId, EpochId, LabelId, NodeId, PropertyKey, Value};
use stepflow_common::utils::error::{Error, Result};
use stepflow_common::utils::hash::FxHashMap;

use super::label_set::LabelSet;
use super::property::PropertyStorage;
use super::snapshot::{GraphSnapshot, SnapshotParts};

/// Sizing hints for a new store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LpgStoreConfig {
    /// Node slots reserved up front.
    pub node_capacity: usize,
    /// Edge slots reserved up front.
    pub edge_capacity: usize,
}

impl Default for LpgStoreConfig {
    fn default() -> Self {
        Self {
            node_capacity: 1024,
            edge_capacity: 4096,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct NodeRecord {
    pub(crate) labels: LabelSet,
    pub(crate) deleted: bool,
}

/// An edge as stored: endpoints and type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeRecord {
    /// Source node.
    pub src: NodeId,
    /// Target node.
    pub dst: NodeId,
    /// Edge type.
    pub edge_type: EdgeTypeId,
    pub(crate) deleted: bool,
}

/// Interned label or edge type names.
#[derive(Debug, Default)]
struct NameTable {
    ids: FxHashMap<Arc<str>, u32>,
    names: Vec<Arc<str>>,
}

impl NameTable {
    fn intern(&mut self, name: &str) -> u32 {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }
        let id = self.names.len() as u32;
        let name: Arc<str> = Arc::from(name);
        self.ids.insert(Arc::clone(&name), id);
        self.names.push(name);
        id
    }
}

/// Records and names, guarded by one lock so snapshots are consistent.
#[derive(Debug, Default)]
struct Topology {
    nodes: Vec<NodeRecord>,
    edges: Vec<EdgeRecord>,
    labels: NameTable,
    edge_types: NameTable,
    live_nodes: usize,
    live_edges: usize,
}

impl Topology {
    fn is_live(&self, id: NodeId) -> bool {
        self.nodes.get(id.index()).is_some_and(|n| !n.deleted)
    }
}

/// An in-memory labeled property graph.
///
/// Ids are dense and handed out in ascending order, so a snapshot can lay
/// records out by id and scans visit them in id order. Deleted ids are
/// never reused.
#[derive(Debug)]
pub struct LpgStore {
    config: LpgStoreConfig,
    topology: RwLock<Topology>,
    node_properties: PropertyStorage<NodeId>,
    edge_properties: PropertyStorage<EdgeId>,
    epoch: AtomicU64,
}

impl LpgStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(LpgStoreConfig::default())
    }

    /// Creates an empty store sized by `config`.
    #[must_use]
    pub fn with_config(config: LpgStoreConfig) -> Self {
        let topology = Topology {
            nodes: Vec::with_capacity(config.node_capacity),
            edges: Vec::with_capacity(config.edge_capacity),
            ..Topology::default()
        };
        Self {
            config,
            topology: RwLock::new(topology),
            node_properties: PropertyStorage::new(),
            edge_properties: PropertyStorage::new(),
            epoch: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn config(&self) -> &LpgStoreConfig {
        &self.config
    }

    /// Returns the epoch of the latest snapshot, 0 before the first one.
    #[must_use]
    pub fn current_epoch(&self) -> EpochId {
        EpochId::new(self.epoch.load(Ordering::Acquire))
    }

    /// Adds a node carrying `labels`.
    pub fn create_node(&self, labels: &[&str]) -> NodeId {
        let mut topology = self.topology.write();
        let label_set: LabelSet = labels
            .iter()
            .map(|name| LabelId::new(topology.labels.intern(name)))
            .collect();
        let id = NodeId::new(topology.nodes.len() as u64);
        topology.nodes.push(NodeRecord {
            labels: label_set,
            deleted: false,
        });
        topology.live_nodes += 1;
        id
    }

    /// Adds a node carrying `labels` and `properties`.
    pub fn create_node_with_props(
        &self,
        labels: &[&str],
        properties: impl IntoIterator<Item = (impl Into<PropertyKey>, impl Into<Value>)>,
    ) -> NodeId {
        let id = self.create_node(labels);
        for (key, value) in properties {
            self.node_properties.set(id, key.into(), value.into());
        }
        id
    }

    /// Sets a property on a live node.
    pub fn set_node_property(
        &self,
        id: NodeId,
        key: impl Into<PropertyKey>,
        value: impl Into<Value>,
    ) -> Result<()> {
        if !self.is_live_node(id) {
            return Err(Error::NotFound(format!("node {id}")));
        }
        self.node_properties.set(id, key.into(), value.into());
        Ok(())
    }

    /// Reads a node property from the live graph.
    #[must_use]
    pub fn node_property(&self, id: NodeId, key: &PropertyKey) -> Option<Value> {
        self.node_properties.get(id, key)
    }

    /// Deletes a node together with every edge touching it.
    ///
    /// Returns false if the node does not exist or is already deleted.
    pub fn delete_node(&self, id: NodeId) -> bool {
        let mut topology = self.topology.write();
        if !topology.is_live(id) {
            return false;
        }
        topology.nodes[id.index()].deleted = true;
        topology.live_nodes -= 1;

        let mut incident = Vec::new();
        for (i, edge) in topology.edges.iter_mut().enumerate() {
            if !edge.deleted && (edge.src == id || edge.dst == id) {
                edge.deleted = true;
                incident.push(EdgeId::new(i as u64));
            }
        }
        topology.live_edges -= incident.len();
        drop(topology);

        self.node_properties.clear_entity(id);
        for edge in incident {
            self.edge_properties.clear_entity(edge);
        }
        true
    }

    #[must_use]
    pub fn is_live_node(&self, id: NodeId) -> bool {
        self.topology.read().is_live(id)
    }

    /// Returns the number of live nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.topology.read().live_nodes
    }

    /// Adds an edge of type `edge_type` from `src` to `dst`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if either endpoint is not a live node.
    pub fn create_edge(&self, src: NodeId, dst: NodeId, edge_type: &str) -> Result<EdgeId> {
        let mut topology = self.topology.write();
        if let Some(missing) = [src, dst].into_iter().find(|&n| !topology.is_live(n)) {
            return Err(Error::NotFound(format!("node {missing}")));
        }
        let edge_type = EdgeTypeId::new(topology.edge_types.intern(edge_type));
        let id = EdgeId::new(topology.edges.len() as u64);
        topology.edges.push(EdgeRecord {
            src,
            dst,
            edge_type,
            deleted: false,
        });
        topology.live_edges += 1;
        Ok(id)
    }

    /// Adds an edge with properties.
    pub fn create_edge_with_props(
        &self,
        src: NodeId,
        dst: NodeId,
        edge_type: &str,
        properties: impl IntoIterator<Item = (impl Into<PropertyKey>, impl Into<Value>)>,
    ) -> Result<EdgeId> {
        let id = self.create_edge(src, dst, edge_type)?;
        for (key, value) in properties {
            self.edge_properties.set(id, key.into(), value.into());
        }
        Ok(id)
    }

    /// Deletes an edge. Returns false if it was not live.
    pub fn delete_edge(&self, id: EdgeId) -> bool {
        let mut topology = self.topology.write();
        let Some(record) = topology.edges.get_mut(id.index()).filter(|e| !e.deleted) else {
            return false;
        };
        record.deleted = true;
        topology.live_edges -= 1;
        drop(topology);

        self.edge_properties.clear_entity(id);
        true
    }

    /// Returns the number of live edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.topology.read().live_edges
    }

    /// Captures an immutable snapshot of the current graph.
    ///
    /// Every call opens a new epoch. Later writes to the store are not
    /// visible through the returned snapshot.
    pub fn snapshot(&self) -> Arc<GraphSnapshot> {
        let topology = self.topology.read();
        let epoch = EpochId::new(self.epoch.fetch_add(1, Ordering::AcqRel) + 1);

        let snapshot = GraphSnapshot::build(SnapshotParts {
            epoch,
            nodes: &topology.nodes,
            edges: &topology.edges,
            label_names: &topology.labels.names,
            edge_type_names: &topology.edge_types.names,
            node_properties: self.node_properties.freeze(),
            edge_properties: self.edge_properties.freeze(),
        });
        drop(topology);

        tracing::debug!(
            epoch = epoch.as_raw(),
            nodes = snapshot.node_count(),
            edges = snapshot.edge_count(),
            "graph snapshot captured"
        );

        Arc::new(snapshot)
    }
}

impl Default for LpgStore {
    fn default() -> Self {
        Self::new()
    }
}
