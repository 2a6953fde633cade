//! Edge scan cursor.

use std::sync::Arc;

use stepflow_common::types::{EdgeId, NodeId};

use super::ChunkWriter;
use crate::execution::Column;
use crate::graph::lpg::GraphSnapshot;

/// Columns written by an edge scan.
#[derive(Debug, Clone, Default)]
pub struct EdgeScanOutput {
    /// Edge ids.
    pub edges: Column<EdgeId>,
    /// Source node of each edge.
    pub sources: Option<Column<NodeId>>,
    /// Target node of each edge.
    pub targets: Option<Column<NodeId>>,
}

impl EdgeScanOutput {
    /// Writes only edge ids into `edges`.
    #[must_use]
    pub fn new(edges: &Column<EdgeId>) -> Self {
        Self {
            edges: edges.clone(),
            sources: None,
            targets: None,
        }
    }

    /// Also writes the source nodes.
    #[must_use]
    pub fn with_sources(mut self, sources: &Column<NodeId>) -> Self {
        self.sources = Some(sources.clone());
        self
    }

    /// Also writes the target nodes.
    #[must_use]
    pub fn with_targets(mut self, targets: &Column<NodeId>) -> Self {
        self.targets = Some(targets.clone());
        self
    }
}

/// Writes every live edge in ascending id order.
pub struct ScanEdgesChunkWriter {
    snapshot: Arc<GraphSnapshot>,
    position: usize,
    output: EdgeScanOutput,
}

impl ScanEdgesChunkWriter {
    /// Creates a cursor over every live edge of `snapshot`.
    #[must_use]
    pub fn new(snapshot: Arc<GraphSnapshot>, output: EdgeScanOutput) -> Self {
        let mut writer = Self {
            snapshot,
            position: 0,
            output,
        };
        writer.reset();
        writer
    }

    fn skip_deleted(&mut self) {
        let bound = self.snapshot.edge_id_bound();
        while self.position < bound
            && self.snapshot.edge(EdgeId::new(self.position as u64)).is_none()
        {
            self.position += 1;
        }
    }
}

impl ChunkWriter for ScanEdgesChunkWriter {
    fn reset(&mut self) {
        self.position = 0;
        self.skip_deleted();
    }

    fn is_valid(&self) -> bool {
        self.position < self.snapshot.edge_id_bound()
    }

    fn fill(&mut self, max_rows: usize) -> usize {
        let mut edges = Vec::with_capacity(max_rows.min(self.snapshot.edge_count()));
        let mut sources = Vec::new();
        let mut targets = Vec::new();

        let bound = self.snapshot.edge_id_bound();
        while edges.len() < max_rows && self.position < bound {
            let id = EdgeId::new(self.position as u64);
            if let Some(record) = self.snapshot.edge(id) {
                edges.push(id);
                if self.output.sources.is_some() {
                    sources.push(record.src);
                }
                if self.output.targets.is_some() {
                    targets.push(record.dst);
                }
            }
            self.position += 1;
        }
        self.skip_deleted();

        let written = edges.len();
        self.output.edges.replace(edges);
        if let Some(col) = &self.output.sources {
            col.replace(sources);
        }
        if let Some(col) = &self.output.targets {
            col.replace(targets);
        }
        written
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::lpg::LpgStore;

    #[test]
    fn test_scan_edges_with_endpoints() {
        let store = LpgStore::new();
        let a = store.create_node(&[]);
        let b = store.create_node(&[]);
        let c = store.create_node(&[]);
        let e0 = store.create_edge(a, b, "KNOWS").unwrap();
        let e1 = store.create_edge(b, c, "KNOWS").unwrap();
        let e2 = store.create_edge(c, a, "KNOWS").unwrap();
        store.delete_edge(e1);

        let edges = Column::new();
        let sources = Column::new();
        let targets = Column::new();
        let output = EdgeScanOutput::new(&edges)
            .with_sources(&sources)
            .with_targets(&targets);
        let mut writer = ScanEdgesChunkWriter::new(store.snapshot(), output);

        assert_eq!(writer.fill(1), 1);
        assert_eq!(edges.to_vec(), vec![e0]);
        assert!(writer.is_valid());

        assert_eq!(writer.fill(1), 1);
        assert_eq!(edges.to_vec(), vec![e2]);
        assert_eq!(sources.to_vec(), vec![c]);
        assert_eq!(targets.to_vec(), vec![a]);
        assert!(!writer.is_valid());
    }

    #[test]
    fn test_empty_graph() {
        let store = LpgStore::new();
        let edges = Column::new();
        let mut writer = ScanEdgesChunkWriter::new(store.snapshot(), EdgeScanOutput::new(&edges));
        assert!(!writer.is_valid());
        assert_eq!(writer.fill(8), 0);
    }
}
