//! Scan steps reading nodes and edges from the snapshot.

use stepflow_common::types::NodeId;

use crate::execution::context::ExecutionContext;
use crate::execution::error::OperatorError;
use crate::execution::step::PipelineStep;
use crate::execution::Column;
use crate::iterators::{ChunkWriter, EdgeScanOutput, ScanEdgesChunkWriter, ScanNodesChunkWriter};

/// Shared driver for steps backed by a [`ChunkWriter`].
pub(crate) struct ChunkedCursor<W> {
    writer: Option<W>,
    chunk_size: usize,
}

impl<W: ChunkWriter> ChunkedCursor<W> {
    pub(crate) fn new() -> Self {
        Self {
            writer: None,
            chunk_size: 0,
        }
    }

    pub(crate) fn bind(&mut self, writer: W, chunk_size: usize) {
        self.writer = Some(writer);
        self.chunk_size = chunk_size;
    }

    pub(crate) fn reset(&mut self) {
        if let Some(writer) = &mut self.writer {
            writer.reset();
        }
    }

    pub(crate) fn execute(&mut self) -> Result<usize, OperatorError> {
        let writer = self.writer.as_mut().ok_or(OperatorError::NotPrepared)?;
        Ok(writer.fill(self.chunk_size))
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.writer.as_ref().is_none_or(|w| !w.is_valid())
    }
}

/// Writes all live node ids, ascending, one chunk per execution.
pub struct ScanNodesStep {
    output: Column<NodeId>,
    cursor: ChunkedCursor<ScanNodesChunkWriter>,
}

impl ScanNodesStep {
    /// Creates a scan writing into `output`.
    #[must_use]
    pub fn new(output: &Column<NodeId>) -> Self {
        Self {
            output: output.clone(),
            cursor: ChunkedCursor::new(),
        }
    }
}

impl PipelineStep for ScanNodesStep {
    fn prepare(&mut self, ctx: &ExecutionContext) -> Result<(), OperatorError> {
        let writer = ScanNodesChunkWriter::new(ctx.snapshot().clone(), self.output.clone());
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
        "ScanNodes".to_string()
    }
}

/// Writes the ids of nodes carrying every label of a set.
///
/// Labels are resolved against the snapshot in `prepare`; an unknown label
/// yields an empty scan.
pub struct ScanNodesByLabelStep {
    labels: Vec<String>,
    output: Column<NodeId>,
    cursor: ChunkedCursor<ScanNodesChunkWriter>,
}

impl ScanNodesByLabelStep {
    /// Creates a label scan writing into `output`.
    #[must_use]
    pub fn new<S: AsRef<str>>(labels: &[S], output: &Column<NodeId>) -> Self {
        Self {
            labels: labels.iter().map(|l| l.as_ref().to_string()).collect(),
            output: output.clone(),
            cursor: ChunkedCursor::new(),
        }
    }

    /// Returns the required labels.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

impl PipelineStep for ScanNodesByLabelStep {
    fn prepare(&mut self, ctx: &ExecutionContext) -> Result<(), OperatorError> {
        let writer = ScanNodesChunkWriter::with_labels(
            ctx.snapshot().clone(),
            self.labels.as_slice(),
            self.output.clone(),
        );
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
        format!("ScanNodesByLabel labels=[{}]", self.labels.join(", "))
    }
}

/// Writes all live edges, ascending by id, one chunk per execution.
pub struct ScanEdgesStep {
    output: EdgeScanOutput,
    cursor: ChunkedCursor<ScanEdgesChunkWriter>,
}

impl ScanEdgesStep {
    /// Creates an edge scan writing into `output`.
    #[must_use]
    pub fn new(output: EdgeScanOutput) -> Self {
        Self {
            output,
            cursor: ChunkedCursor::new(),
        }
    }
}

impl PipelineStep for ScanEdgesStep {
    fn prepare(&mut self, ctx: &ExecutionContext) -> Result<(), OperatorError> {
        if let (Some(sources), Some(targets)) = (&self.output.sources, &self.output.targets) {
            if sources.ptr_eq(targets) {
                return Err(OperatorError::ColumnAliasing(
                    "edge scan sources and targets share a column".into(),
                ));
            }
        }
        let writer = ScanEdgesChunkWriter::new(ctx.snapshot().clone(), self.output.clone());
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
        let mut columns = vec!["edge"];
        if self.output.sources.is_some() {
            columns.push("source");
        }
        if self.output.targets.is_some() {
            columns.push("target");
        }
        format!("ScanEdges columns=[{}]", columns.join(", "))
    }
}
