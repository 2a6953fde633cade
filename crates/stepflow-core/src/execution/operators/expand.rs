//! Expansion from nodes to their outgoing edges.

use stepflow_common::types::NodeId;

use super::scan::ChunkedCursor;
use crate::execution::context::ExecutionContext;
use crate::execution::error::OperatorError;
use crate::execution::step::PipelineStep;
use crate::execution::Column;
use crate::iterators::{EdgeWriteInfo, GetOutEdgesChunkWriter};

/// Writes the outgoing edges of the nodes in its input column.
///
/// Each activation consumes one upstream chunk. When the edges of that
/// chunk do not fit into one output chunk the step stays unfinished and
/// continues on the next execution.
pub struct GetOutEdgesStep {
    input: Column<NodeId>,
    output: EdgeWriteInfo,
    cursor: ChunkedCursor<GetOutEdgesChunkWriter>,
}

impl GetOutEdgesStep {
    /// Creates an expansion of `input` into `output`.
    #[must_use]
    pub fn new(input: &Column<NodeId>, output: EdgeWriteInfo) -> Self {
        Self {
            input: input.clone(),
            output,
            cursor: ChunkedCursor::new(),
        }
    }
}

impl PipelineStep for GetOutEdgesStep {
    fn prepare(&mut self, ctx: &ExecutionContext) -> Result<(), OperatorError> {
        let writer = GetOutEdgesChunkWriter::new(
            ctx.snapshot().clone(),
            self.input.clone(),
            self.output.clone(),
        )?;
        self.cursor.bind(writer, ctx.chunk_size());
        Ok(())
    }

    fn reset(&mut self) {
        self.cursor.reset();
    }

    fn execute(&mut self) -> Result<(), OperatorError> {
        self.cursor.execute().map(drop)
    }

    fn is_finished(&self) -> bool {
        self.cursor.is_finished()
    }

    fn describe(&self) -> String {
        let mut columns = Vec::new();
        if self.output.indices.is_some() {
            columns.push("index");
        }
        columns.push("edge");
        if self.output.targets.is_some() {
            columns.push("target");
        }
        if self.output.edge_types.is_some() {
            columns.push("type");
        }
        format!("GetOutEdges columns=[{}]", columns.join(", "))
    }
}
