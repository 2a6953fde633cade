//! Outgoing-edge expansion cursor.

use std::sync::Arc;

use stepflow_common::types::{EdgeId, EdgeTypeId, NodeId};

use super::ChunkWriter;
use crate::execution::{Column, OperatorError};
use crate::graph::lpg::GraphSnapshot;

/// Columns written by an edge expansion. Only `edges` is mandatory.
#[derive(Debug, Clone, Default)]
pub struct EdgeWriteInfo {
    /// Row of the input column each edge was expanded from.
    pub indices: Option<Column<usize>>,
    /// Edge ids.
    pub edges: Column<EdgeId>,
    /// Target node of each edge.
    pub targets: Option<Column<NodeId>>,
    /// Type of each edge.
    pub edge_types: Option<Column<EdgeTypeId>>,
}

impl EdgeWriteInfo {
    /// Writes only edge ids into `edges`.
    #[must_use]
    pub fn new(edges: &Column<EdgeId>) -> Self {
        Self {
            edges: edges.clone(),
            ..Self::default()
        }
    }

    /// Also writes the input row of each edge.
    #[must_use]
    pub fn with_indices(mut self, indices: &Column<usize>) -> Self {
        self.indices = Some(indices.clone());
        self
    }

    /// Also writes the target nodes.
    #[must_use]
    pub fn with_targets(mut self, targets: &Column<NodeId>) -> Self {
        self.targets = Some(targets.clone());
        self
    }

    /// Also writes the edge types.
    #[must_use]
    pub fn with_edge_types(mut self, edge_types: &Column<EdgeTypeId>) -> Self {
        self.edge_types = Some(edge_types.clone());
        self
    }
}

/// Writes the outgoing edges of every node in an input column.
///
/// The input column holds the current upstream chunk. One reset covers
/// one input window; a node with more edges than fit into a chunk is
/// continued in the next chunk.
pub struct GetOutEdgesChunkWriter {
    snapshot: Arc<GraphSnapshot>,
    input: Column<NodeId>,
    /// Current input row.
    row: usize,
    /// Position inside the current row's edge list.
    offset: usize,
    output: EdgeWriteInfo,
}

impl GetOutEdgesChunkWriter {
    /// Creates a cursor expanding `input` into `output`.
    ///
    /// # Errors
    ///
    /// Returns [`OperatorError::ColumnAliasing`] if the target column is the
    /// input column.
    pub fn new(
        snapshot: Arc<GraphSnapshot>,
        input: Column<NodeId>,
        output: EdgeWriteInfo,
    ) -> Result<Self, OperatorError> {
        if output.targets.as_ref().is_some_and(|t| t.ptr_eq(&input)) {
            return Err(OperatorError::ColumnAliasing(
                "edge expansion cannot write targets into its input column".into(),
            ));
        }
        let mut writer = Self {
            snapshot,
            input,
            row: 0,
            offset: 0,
            output,
        };
        writer.reset();
        Ok(writer)
    }

    fn skip_exhausted_rows(&mut self, input: &[NodeId]) {
        while self.row < input.len()
            && self.offset >= self.snapshot.out_edges(input[self.row]).len()
        {
            self.row += 1;
            self.offset = 0;
        }
    }
}

impl ChunkWriter for GetOutEdgesChunkWriter {
    fn reset(&mut self) {
        self.row = 0;
        self.offset = 0;
        let input = self.input.clone();
        self.skip_exhausted_rows(&input.read());
    }

    fn is_valid(&self) -> bool {
        self.row < self.input.len()
    }

    fn fill(&mut self, max_rows: usize) -> usize {
        let mut indices = Vec::new();
        let mut edges = Vec::new();
        let mut targets = Vec::new();
        let mut edge_types = Vec::new();

        let input_col = self.input.clone();
        let input = input_col.read();
        while edges.len() < max_rows && self.row < input.len() {
            let adjacent = self.snapshot.out_edges(input[self.row]);
            let take = adjacent
                .len()
                .saturating_sub(self.offset)
                .min(max_rows - edges.len());
            for &edge in adjacent.iter().skip(self.offset).take(take) {
                edges.push(edge);
                if self.output.indices.is_some() {
                    indices.push(self.row);
                }
                if let Some(record) = self.snapshot.edge(edge) {
                    if self.output.targets.is_some() {
                        targets.push(record.dst);
                    }
                    if self.output.edge_types.is_some() {
                        edge_types.push(record.edge_type);
                    }
                }
            }
            self.offset += take;
            self.skip_exhausted_rows(&input);
        }
        drop(input);

        let written = edges.len();
        self.output.edges.replace(edges);
        if let Some(col) = &self.output.indices {
            col.replace(indices);
        }
        if let Some(col) = &self.output.targets {
            col.replace(targets);
        }
        if let Some(col) = &self.output.edge_types {
            col.replace(edge_types);
        }
        written
    }
}
