//! Node scan cursor.

use std::sync::Arc;

use stepflow_common::types::NodeId;

use super::ChunkWriter;
use crate::execution::Column;
use crate::graph::lpg::{GraphSnapshot, LabelSet};

/// Writes live node ids in ascending order, optionally restricted to nodes
/// carrying every label of a set.
pub struct ScanNodesChunkWriter {
    snapshot: Arc<GraphSnapshot>,
    labels: Option<LabelSet>,
    /// Next node slot to look at.
    position: usize,
    /// Set when the requested labels do not exist in the snapshot.
    empty: bool,
    output: Column<NodeId>,
}

impl ScanNodesChunkWriter {
    /// Creates a cursor over every live node.
    #[must_use]
    pub fn new(snapshot: Arc<GraphSnapshot>, output: Column<NodeId>) -> Self {
        let mut writer = Self {
            snapshot,
            labels: None,
            position: 0,
            empty: false,
            output,
        };
        writer.reset();
        writer
    }

    /// Creates a cursor over live nodes carrying all of `labels`.
    ///
    /// A label unknown to the snapshot matches no node.
    #[must_use]
    pub fn with_labels<S: AsRef<str>>(
        snapshot: Arc<GraphSnapshot>,
        labels: &[S],
        output: Column<NodeId>,
    ) -> Self {
        let resolved = snapshot.resolve_labels(labels);
        let mut writer = Self {
            empty: resolved.is_none(),
            labels: resolved,
            snapshot,
            position: 0,
            output,
        };
        writer.reset();
        writer
    }

    fn matches(&self, slot: usize) -> bool {
        let Some(set) = self.snapshot.node_label_set(NodeId::new(slot as u64)) else {
            return false;
        };
        match &self.labels {
            Some(required) => self.snapshot.label_set_contains(set, required),
            None => true,
        }
    }

    fn skip_non_matching(&mut self) {
        let bound = self.snapshot.node_id_bound();
        while self.position < bound && !self.matches(self.position) {
            self.position += 1;
        }
    }
}

impl ChunkWriter for ScanNodesChunkWriter {
    fn reset(&mut self) {
        self.position = if self.empty {
            self.snapshot.node_id_bound()
        } else {
            0
        };
        self.skip_non_matching();
    }

    fn is_valid(&self) -> bool {
        self.position < self.snapshot.node_id_bound()
    }

    fn fill(&mut self, max_rows: usize) -> usize {
        let mut out = self.output.write();
        out.clear();
        let bound = self.snapshot.node_id_bound();
        while out.len() < max_rows && self.position < bound {
            if self.matches(self.position) {
                out.push(NodeId::new(self.position as u64));
            }
            self.position += 1;
        }
        let written = out.len();
        drop(out);
        self.skip_non_matching();
        written
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::lpg::LpgStore;

    #[test]
    fn test_chunks_in_order() {
        let store = LpgStore::new();
        for _ in 0..10 {
            store.create_node(&["Person"]);
        }
        let out = Column::new();
        let mut writer = ScanNodesChunkWriter::new(store.snapshot(), out.clone());

        let mut chunks = Vec::new();
        while writer.is_valid() {
            writer.fill(4);
            chunks.push(out.to_vec().iter().map(|n| n.as_raw()).collect::<Vec<_>>());
        }
        assert_eq!(chunks, vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7], vec![8, 9]]);
    }

    #[test]
    fn test_exact_multiple_ends_without_empty_chunk() {
        let store = LpgStore::new();
        for _ in 0..8 {
            store.create_node(&[]);
        }
        let out = Column::new();
        let mut writer = ScanNodesChunkWriter::new(store.snapshot(), out);

        assert_eq!(writer.fill(4), 4);
        assert!(writer.is_valid());
        assert_eq!(writer.fill(4), 4);
        assert!(!writer.is_valid());
    }

    #[test]
    fn test_skips_deleted_and_filters_labels() {
        let store = LpgStore::new();
        let a = store.create_node(&["Person", "Employee"]);
        let b = store.create_node(&["Person"]);
        let c = store.create_node(&["Person", "Employee"]);
        store.create_node(&["Animal"]);
        store.delete_node(a);

        let out = Column::new();
        let snapshot = store.snapshot();
        let mut writer =
            ScanNodesChunkWriter::with_labels(Arc::clone(&snapshot), &["Person"], out.clone());
        writer.fill(10);
        assert_eq!(out.to_vec(), vec![b, c]);

        let mut writer =
            ScanNodesChunkWriter::with_labels(snapshot, &["Employee", "Person"], out.clone());
        writer.fill(10);
        assert_eq!(out.to_vec(), vec![c]);
    }

    #[test]
    fn test_unknown_label_matches_nothing() {
        let store = LpgStore::new();
        store.create_node(&["Person"]);

        let out = Column::new();
        let writer = ScanNodesChunkWriter::with_labels(store.snapshot(), &["Robot"], out);
        assert!(!writer.is_valid());
    }

    #[test]
    fn test_reset_rewinds() {
        let store = LpgStore::new();
        store.create_node(&[]);
        store.create_node(&[]);

        let out = Column::new();
        let mut writer = ScanNodesChunkWriter::new(store.snapshot(), out.clone());
        writer.fill(5);
        assert!(!writer.is_valid());

        writer.reset();
        assert!(writer.is_valid());
        assert_eq!(writer.fill(1), 1);
        assert_eq!(out.to_vec(), vec![NodeId::new(0)]);
    }
}
