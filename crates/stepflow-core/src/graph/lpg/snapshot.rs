//! Immutable graph snapshots.
//!
//! A snapshot is the read-only view every pipeline runs against. It is
//! built once from the store, shared behind an `Arc`, and never mutated,
//! so any number of executors can read it concurrently without locking.

use super::label_set::{LabelSet, LabelSetIndex};
use super::property::FrozenProperties;
use super::store::{EdgeRecord, NodeRecord};
use stepflow_common::types::{
    EdgeId, EdgeTypeId, EpochId, LabelId, LabelSetId, NodeId, PropertyKey, Value,
};
use stepflow_common::utils::hash::FxHashMap;
use std::sync::Arc;

/// Everything the store hands over to build a snapshot.
pub(crate) struct SnapshotParts<'a> {
    pub(crate) epoch: EpochId,
    pub(crate) nodes: &'a [NodeRecord],
    pub(crate) edges: &'a [EdgeRecord],
    pub(crate) label_names: &'a [Arc<str>],
    pub(crate) edge_type_names: &'a [Arc<str>],
    pub(crate) node_properties: FrozenProperties<NodeId>,
    pub(crate) edge_properties: FrozenProperties<EdgeId>,
}

/// A read-only, versioned view of the graph.
#[derive(Debug)]
pub struct GraphSnapshot {
    epoch: EpochId,
    /// Label set of each node, `None` for deleted nodes.
    node_label_sets: Vec<Option<LabelSetId>>,
    label_sets: LabelSetIndex,
    label_names: Vec<Arc<str>>,
    label_ids: FxHashMap<Arc<str>, LabelId>,
    /// Edge records by id, `None` for deleted edges.
    edges: Vec<Option<EdgeRecord>>,
    edge_type_names: Vec<Arc<str>>,
    /// Outgoing adjacency in CSR layout: the edges of node `n` are
    /// `out_edges[out_offsets[n]..out_offsets[n + 1]]`, ascending by id.
    out_offsets: Vec<usize>,
    out_edges: Vec<EdgeId>,
    node_properties: FrozenProperties<NodeId>,
    edge_properties: FrozenProperties<EdgeId>,
    live_nodes: usize,
    live_edges: usize,
}

impl GraphSnapshot {
    pub(crate) fn build(parts: SnapshotParts<'_>) -> Self {
        let mut label_sets = LabelSetIndex::default();
        let node_label_sets: Vec<Option<LabelSetId>> = parts
            .nodes
            .iter()
            .map(|record| (!record.deleted).then(|| label_sets.intern(&record.labels)))
            .collect();

        let edges: Vec<Option<EdgeRecord>> = parts
            .edges
            .iter()
            .map(|record| (!record.deleted).then_some(*record))
            .collect();

        let mut degrees = vec![0usize; parts.nodes.len() + 1];
        for record in edges.iter().flatten() {
            degrees[record.src.index() + 1] += 1;
        }
        for i in 1..degrees.len() {
            degrees[i] += degrees[i - 1];
        }
        let out_offsets = degrees;

        let mut cursor = out_offsets.clone();
        let mut out_edges = vec![EdgeId::INVALID; out_offsets.last().copied().unwrap_or(0)];
        for (i, record) in edges.iter().enumerate() {
            if let Some(record) = record {
                let slot = &mut cursor[record.src.index()];
                out_edges[*slot] = EdgeId::new(i as u64);
                *slot += 1;
            }
        }

        let label_ids = parts
            .label_names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), LabelId::new(i as u32)))
            .collect();

        Self {
            epoch: parts.epoch,
            live_nodes: node_label_sets.iter().flatten().count(),
            live_edges: out_edges.len(),
            node_label_sets,
            label_sets,
            label_names: parts.label_names.to_vec(),
            label_ids,
            edges,
            edge_type_names: parts.edge_type_names.to_vec(),
            out_offsets,
            out_edges,
            node_properties: parts.node_properties,
            edge_properties: parts.edge_properties,
        }
    }

    /// Returns the epoch this snapshot was taken at.
    #[must_use]
    pub fn epoch(&self) -> EpochId {
        self.epoch
    }

    // === Nodes ===

    /// Returns the number of live nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.live_nodes
    }

    /// Returns one past the largest node id, live or deleted.
    #[must_use]
    pub fn node_id_bound(&self) -> usize {
        self.node_label_sets.len()
    }

    /// Returns true if the node exists in this snapshot.
    #[must_use]
    pub fn is_live_node(&self, id: NodeId) -> bool {
        self.node_label_set(id).is_some()
    }

    /// Returns the label set of a live node.
    #[must_use]
    pub fn node_label_set(&self, id: NodeId) -> Option<LabelSetId> {
        self.node_label_sets.get(id.index()).copied().flatten()
    }

    /// Returns the labels of an interned label set.
    #[must_use]
    pub fn label_set(&self, id: LabelSetId) -> Option<&LabelSet> {
        self.label_sets.get(id)
    }

    /// Returns true if the label set `id` contains every label of `required`.
    #[must_use]
    pub fn label_set_contains(&self, id: LabelSetId, required: &LabelSet) -> bool {
        self.label_sets
            .get(id)
            .is_some_and(|set| set.is_superset_of(required))
    }

    /// Returns the id of a label name.
    #[must_use]
    pub fn label_id(&self, name: &str) -> Option<LabelId> {
        self.label_ids.get(name).copied()
    }

    /// Returns the name of a label.
    #[must_use]
    pub fn label_name(&self, id: LabelId) -> Option<&str> {
        self.label_names.get(id.as_raw() as usize).map(AsRef::as_ref)
    }

    /// Resolves label names into a label set.
    ///
    /// Returns `None` if any name is unknown to this snapshot.
    #[must_use]
    pub fn resolve_labels<S: AsRef<str>>(&self, names: &[S]) -> Option<LabelSet> {
        names
            .iter()
            .map(|name| self.label_id(name.as_ref()))
            .collect()
    }

    /// Returns a node property.
    #[must_use]
    pub fn node_property(&self, id: NodeId, key: &PropertyKey) -> Option<&Value> {
        self.node_properties.get(id, key)
    }

    // === Edges ===

    /// Returns the number of live edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.live_edges
    }

    /// Returns one past the largest edge id, live or deleted.
    #[must_use]
    pub fn edge_id_bound(&self) -> usize {
        self.edges.len()
    }

    /// Returns a live edge.
    #[must_use]
    pub fn edge(&self, id: EdgeId) -> Option<&EdgeRecord> {
        self.edges.get(id.index()).and_then(Option::as_ref)
    }

    /// Returns the outgoing edges of a node, ascending by id.
    #[must_use]
    pub fn out_edges(&self, node: NodeId) -> &[EdgeId] {
        let n = node.index();
        match n.checked_add(1).and_then(|end| self.out_offsets.get(n..=end)) {
            Some(&[from, to]) => &self.out_edges[from..to],
            _ => &[],
        }
    }

    /// Returns the name of an edge type.
    #[must_use]
    pub fn edge_type_name(&self, id: EdgeTypeId) -> Option<&str> {
        self.edge_type_names.get(id.as_raw() as usize).map(AsRef::as_ref)
    }

    /// Returns an edge property.
    #[must_use]
    pub fn edge_property(&self, id: EdgeId, key: &PropertyKey) -> Option<&Value> {
        self.edge_properties.get(id, key)
    }
}
