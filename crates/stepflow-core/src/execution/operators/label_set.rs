//! Label set lookup.

use std::sync::Arc;

use stepflow_common::types::{LabelSetId, NodeId};
use stepflow_common::Error;

use crate::execution::context::ExecutionContext;
use crate::execution::error::OperatorError;
use crate::execution::step::PipelineStep;
use crate::execution::Column;
use crate::graph::lpg::GraphSnapshot;

/// Writes the label set id of every node in its input column.
pub struct GetLabelSetIdStep {
    input: Column<NodeId>,
    output: Column<LabelSetId>,
    snapshot: Option<Arc<GraphSnapshot>>,
}

impl GetLabelSetIdStep {
    /// Creates a lookup from `input` into `output`.
    #[must_use]
    pub fn new(input: &Column<NodeId>, output: &Column<LabelSetId>) -> Self {
        Self {
            input: input.clone(),
            output: output.clone(),
            snapshot: None,
        }
    }
}

impl PipelineStep for GetLabelSetIdStep {
    fn prepare(&mut self, ctx: &ExecutionContext) -> Result<(), OperatorError> {
        self.snapshot = Some(Arc::clone(ctx.snapshot()));
        Ok(())
    }

    fn reset(&mut self) {}

    fn execute(&mut self) -> Result<(), OperatorError> {
        let snapshot = self.snapshot.as_ref().ok_or(OperatorError::NotPrepared)?;
        let sets = self
            .input
            .read()
            .iter()
            .map(|&node| {
                snapshot
                    .node_label_set(node)
                    .ok_or_else(|| Error::NotFound(format!("node {node}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.output.replace(sets);
        Ok(())
    }

    fn is_finished(&self) -> bool {
        true
    }

    fn describe(&self) -> String {
        "GetLabelSetId".to_string()
    }
}
