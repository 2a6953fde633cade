//! Linear pipelines of steps.

use stepflow_common::types::{EdgeId, LabelSetId, NodeId, PropertyKey};

use super::block::OutputBlock;
use super::column::{AnyColumn, Column};
use super::error::{ConfigurationError, OperatorError};
use super::operators::{
    CountStep, CreateGraphStep, DebugDumpStep, FilterStep, GetLabelSetIdStep, GetOutEdgesStep,
    GetPropertyStep, JsonEncoderStep, LambdaOperation, LambdaStep, ListGraphsStep,
    MaterializeStep, Projection, PropertyPrimitive, ScanEdgesStep, ScanNodesByLabelStep,
    ScanNodesStep, TransformStep,
};
use super::step::{PipelineStep, Step, StepKind};
use crate::iterators::{EdgeScanOutput, EdgeWriteInfo};

/// An ordered chain of steps from `Start` to `End`.
///
/// Steps are appended in execution order. Nothing is checked while
/// building; the executor validates the shape before running.
#[derive(Debug, Default)]
pub struct Pipeline {
    steps: Vec<Step>,
}

impl Pipeline {
    /// Creates an empty pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a step and returns it.
    pub fn add(&mut self, step: impl Into<Step>) -> &mut Step {
        let index = self.steps.len();
        self.steps.push(step.into());
        &mut self.steps[index]
    }

    /// Appends the `Start` sentinel.
    pub fn add_start(&mut self) -> &mut Step {
        self.add(Step::Start)
    }

    /// Appends the `End` sentinel.
    pub fn add_end(&mut self) -> &mut Step {
        self.add(Step::End)
    }

    /// Appends a scan of all nodes.
    pub fn add_scan_nodes(&mut self, output: &Column<NodeId>) -> &mut Step {
        self.add(ScanNodesStep::new(output))
    }

    /// Appends a scan of nodes carrying all of `labels`.
    pub fn add_scan_nodes_by_label<S: AsRef<str>>(
        &mut self,
        labels: &[S],
        output: &Column<NodeId>,
    ) -> &mut Step {
        self.add(ScanNodesByLabelStep::new(labels, output))
    }

    /// Appends a scan of all edges.
    pub fn add_scan_edges(&mut self, output: EdgeScanOutput) -> &mut Step {
        self.add(ScanEdgesStep::new(output))
    }

    /// Appends an expansion to outgoing edges.
    pub fn add_get_out_edges(
        &mut self,
        input: &Column<NodeId>,
        output: EdgeWriteInfo,
    ) -> &mut Step {
        self.add(GetOutEdgesStep::new(input, output))
    }

    /// Appends a label set lookup.
    pub fn add_get_label_set_id(
        &mut self,
        input: &Column<NodeId>,
        output: &Column<LabelSetId>,
    ) -> &mut Step {
        self.add(GetLabelSetIdStep::new(input, output))
    }

    /// Appends a filter.
    pub fn add_filter(&mut self, filter: FilterStep) -> &mut Step {
        self.add(filter)
    }

    /// Appends a projection.
    pub fn add_transform(&mut self, projections: Vec<Projection>) -> &mut Step {
        self.add(TransformStep::new(projections))
    }

    /// Appends a row count.
    pub fn add_count(&mut self, input: impl Into<AnyColumn>, output: &Column<u64>) -> &mut Step {
        self.add(CountStep::new(input, output))
    }

    /// Appends a materialization.
    pub fn add_materialize(&mut self, step: MaterializeStep) -> &mut Step {
        self.add(step)
    }

    /// Appends a typed node property fetch.
    pub fn add_get_node_property<T: PropertyPrimitive>(
        &mut self,
        input: &Column<NodeId>,
        key: impl Into<PropertyKey>,
        output: &Column<Option<T>>,
    ) -> &mut Step {
        self.add(T::node_step(GetPropertyStep::new(input, key, output)))
    }

    /// Appends a typed edge property fetch.
    pub fn add_get_edge_property<T: PropertyPrimitive>(
        &mut self,
        input: &Column<EdgeId>,
        key: impl Into<PropertyKey>,
        output: &Column<Option<T>>,
    ) -> &mut Step {
        self.add(T::edge_step(GetPropertyStep::new(input, key, output)))
    }

    /// Appends a callback step.
    pub fn add_lambda<F>(&mut self, callback: F) -> &mut Step
    where
        F: FnMut(LambdaOperation) -> Result<(), OperatorError> + Send + 'static,
    {
        self.add(LambdaStep::new(callback))
    }

    /// Appends a JSON lines encoder.
    pub fn add_json_encoder(
        &mut self,
        block: OutputBlock,
        sink: impl std::io::Write + Send + 'static,
    ) -> &mut Step {
        self.add(JsonEncoderStep::new(block, sink))
    }

    /// Appends a debug dump.
    pub fn add_debug_dump(&mut self, block: OutputBlock) -> &mut Step {
        self.add(DebugDumpStep::new(block))
    }

    /// Appends a graph creation.
    pub fn add_create_graph(&mut self, name: impl Into<String>) -> &mut Step {
        self.add(CreateGraphStep::new(name))
    }

    /// Appends a graph listing.
    pub fn add_list_graphs(&mut self, output: &Column<String>) -> &mut Step {
        self.add(ListGraphsStep::new(output))
    }

    /// Returns the steps in order.
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Returns the steps for in-place rewiring.
    pub fn steps_mut(&mut self) -> &mut [Step] {
        &mut self.steps
    }

    /// Returns the kinds of the steps in order.
    pub fn kinds(&self) -> impl Iterator<Item = StepKind> + '_ {
        self.steps.iter().map(Step::kind)
    }

    /// Returns the number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns true if the pipeline has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Removes every step.
    pub fn clear(&mut self) {
        self.steps.clear();
    }

    /// Checks that the pipeline is `Start`, any operators, then `End`.
    ///
    /// # Errors
    ///
    /// Returns the first shape violation found.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let len = self.steps.len();
        if len < 2 {
            return Err(ConfigurationError::TooShort { len });
        }
        let first = self.steps[0].kind();
        if first != StepKind::Start {
            return Err(ConfigurationError::MissingStart { found: first });
        }
        let last = self.steps[len - 1].kind();
        if last != StepKind::End {
            return Err(ConfigurationError::MissingEnd { found: last });
        }
        for (index, step) in self.steps.iter().enumerate().take(len - 1).skip(1) {
            let kind = step.kind();
            if kind.is_sentinel() {
                return Err(ConfigurationError::MisplacedSentinel { index, kind });
            }
        }
        Ok(())
    }

    /// Returns one description line per step.
    #[must_use]
    pub fn describe(&self) -> Vec<String> {
        self.steps
            .iter()
            .enumerate()
            .map(|(i, step)| format!("{i}: {}", step.describe()))
            .collect()
    }
}

impl FromIterator<Step> for Pipeline {
    fn from_iter<I: IntoIterator<Item = Step>>(iter: I) -> Self {
        Self {
            steps: iter.into_iter().collect(),
        }
    }
}
