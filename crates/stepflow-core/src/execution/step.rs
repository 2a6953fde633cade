//! The step contract and the closed set of step kinds.

use std::fmt;

use stepflow_common::types::{EdgeId, NodeId};

use super::context::ExecutionContext;
use super::error::OperatorError;
use super::operators::{
    CountStep, CreateGraphStep, DebugDumpStep, FilterStep, GetLabelSetIdStep, GetOutEdgesStep,
    GetPropertyStep, JsonEncoderStep, LambdaStep, ListGraphsStep, MaterializeStep,
    ScanEdgesStep, ScanNodesByLabelStep, ScanNodesStep, TransformStep,
};

/// Operations every pipeline step supports.
///
/// The executor calls `prepare` once per run, then drives the step through
/// `reset` (on every activation), `execute` and `is_finished`.
pub trait PipelineStep: Send {
    /// Binds the step to the snapshot and allocates its cursor.
    ///
    /// Moves no data.
    fn prepare(&mut self, ctx: &ExecutionContext) -> Result<(), OperatorError>;

    /// Rewinds to the start of the current input window.
    fn reset(&mut self);

    /// Produces the next chunk, replacing the previous one.
    fn execute(&mut self) -> Result<(), OperatorError>;

    /// Returns true if nothing more can be produced from the current input.
    fn is_finished(&self) -> bool;

    /// One-line description for plan output.
    fn describe(&self) -> String;
}

/// Kind of a pipeline step.
///
/// The discriminant is the index of the kind's entries in the dispatch
/// tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum StepKind {
    /// Upstream sentinel.
    Start,
    /// Downstream sentinel.
    End,
    /// All live nodes.
    ScanNodes,
    /// Nodes carrying a set of labels.
    ScanNodesByLabel,
    /// All live edges.
    ScanEdges,
    /// Outgoing edges of input nodes.
    GetOutEdges,
    /// Label set of input nodes.
    GetLabelSetId,
    /// Row selection by predicate.
    Filter,
    /// Column projection.
    Transform,
    /// Row count aggregate.
    Count,
    /// Result accumulation.
    Materialize,
    /// `INT64` node property.
    GetNodePropertyInt64,
    /// `UINT64` node property.
    GetNodePropertyUInt64,
    /// `DOUBLE` node property.
    GetNodePropertyDouble,
    /// `STRING` node property.
    GetNodePropertyString,
    /// `BOOL` node property.
    GetNodePropertyBool,
    /// `INT64` edge property.
    GetEdgePropertyInt64,
    /// `UINT64` edge property.
    GetEdgePropertyUInt64,
    /// `DOUBLE` edge property.
    GetEdgePropertyDouble,
    /// `STRING` edge property.
    GetEdgePropertyString,
    /// `BOOL` edge property.
    GetEdgePropertyBool,
    /// User callback.
    Lambda,
    /// JSON lines output.
    JsonEncoder,
    /// Row dump through tracing.
    DebugDump,
    /// Graph creation.
    CreateGraph,
    /// Graph listing.
    ListGraphs,
}

impl StepKind {
    /// Every kind, in ordinal order.
    pub const ALL: [StepKind; 26] = [
        StepKind::Start,
        StepKind::End,
        StepKind::ScanNodes,
        StepKind::ScanNodesByLabel,
        StepKind::ScanEdges,
        StepKind::GetOutEdges,
        StepKind::GetLabelSetId,
        StepKind::Filter,
        StepKind::Transform,
        StepKind::Count,
        StepKind::Materialize,
        StepKind::GetNodePropertyInt64,
        StepKind::GetNodePropertyUInt64,
        StepKind::GetNodePropertyDouble,
        StepKind::GetNodePropertyString,
        StepKind::GetNodePropertyBool,
        StepKind::GetEdgePropertyInt64,
        StepKind::GetEdgePropertyUInt64,
        StepKind::GetEdgePropertyDouble,
        StepKind::GetEdgePropertyString,
        StepKind::GetEdgePropertyBool,
        StepKind::Lambda,
        StepKind::JsonEncoder,
        StepKind::DebugDump,
        StepKind::CreateGraph,
        StepKind::ListGraphs,
    ];

    /// Number of kinds.
    pub const COUNT: usize = Self::ALL.len();

    /// Returns the dense index of this kind.
    #[must_use]
    pub const fn ordinal(self) -> usize {
        self as usize
    }

    /// Returns true for `Start` and `End`.
    #[must_use]
    pub const fn is_sentinel(self) -> bool {
        matches!(self, StepKind::Start | StepKind::End)
    }

    /// Returns the name of the kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            StepKind::Start => "Start",
            StepKind::End => "End",
            StepKind::ScanNodes => "ScanNodes",
            StepKind::ScanNodesByLabel => "ScanNodesByLabel",
            StepKind::ScanEdges => "ScanEdges",
            StepKind::GetOutEdges => "GetOutEdges",
            StepKind::GetLabelSetId => "GetLabelSetId",
            StepKind::Filter => "Filter",
            StepKind::Transform => "Transform",
            StepKind::Count => "Count",
            StepKind::Materialize => "Materialize",
            StepKind::GetNodePropertyInt64 => "GetNodePropertyInt64",
            StepKind::GetNodePropertyUInt64 => "GetNodePropertyUInt64",
            StepKind::GetNodePropertyDouble => "GetNodePropertyDouble",
            StepKind::GetNodePropertyString => "GetNodePropertyString",
            StepKind::GetNodePropertyBool => "GetNodePropertyBool",
            StepKind::GetEdgePropertyInt64 => "GetEdgePropertyInt64",
            StepKind::GetEdgePropertyUInt64 => "GetEdgePropertyUInt64",
            StepKind::GetEdgePropertyDouble => "GetEdgePropertyDouble",
            StepKind::GetEdgePropertyString => "GetEdgePropertyString",
            StepKind::GetEdgePropertyBool => "GetEdgePropertyBool",
            StepKind::Lambda => "Lambda",
            StepKind::JsonEncoder => "JsonEncoder",
            StepKind::DebugDump => "DebugDump",
            StepKind::CreateGraph => "CreateGraph",
            StepKind::ListGraphs => "ListGraphs",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A pipeline step: one variant per kind, holding that kind's state.
pub enum Step {
    /// Upstream sentinel.
    Start,
    /// Downstream sentinel.
    End,
    /// See [`ScanNodesStep`].
    ScanNodes(ScanNodesStep),
    /// See [`ScanNodesByLabelStep`].
    ScanNodesByLabel(ScanNodesByLabelStep),
    /// See [`ScanEdgesStep`].
    ScanEdges(ScanEdgesStep),
    /// See [`GetOutEdgesStep`].
    GetOutEdges(GetOutEdgesStep),
    /// See [`GetLabelSetIdStep`].
    GetLabelSetId(GetLabelSetIdStep),
    /// See [`FilterStep`].
    Filter(FilterStep),
    /// See [`TransformStep`].
    Transform(TransformStep),
    /// See [`CountStep`].
    Count(CountStep),
    /// See [`MaterializeStep`].
    Materialize(MaterializeStep),
    /// See [`GetPropertyStep`].
    GetNodePropertyInt64(GetPropertyStep<NodeId, i64>),
    /// See [`GetPropertyStep`].
    GetNodePropertyUInt64(GetPropertyStep<NodeId, u64>),
    /// See [`GetPropertyStep`].
    GetNodePropertyDouble(GetPropertyStep<NodeId, f64>),
    /// See [`GetPropertyStep`].
    GetNodePropertyString(GetPropertyStep<NodeId, std::sync::Arc<str>>),
    /// See [`GetPropertyStep`].
    GetNodePropertyBool(GetPropertyStep<NodeId, bool>),
    /// See [`GetPropertyStep`].
    GetEdgePropertyInt64(GetPropertyStep<EdgeId, i64>),
    /// See [`GetPropertyStep`].
    GetEdgePropertyUInt64(GetPropertyStep<EdgeId, u64>),
    /// See [`GetPropertyStep`].
    GetEdgePropertyDouble(GetPropertyStep<EdgeId, f64>),
    /// See [`GetPropertyStep`].
    GetEdgePropertyString(GetPropertyStep<EdgeId, std::sync::Arc<str>>),
    /// See [`GetPropertyStep`].
    GetEdgePropertyBool(GetPropertyStep<EdgeId, bool>),
    /// See [`LambdaStep`].
    Lambda(LambdaStep),
    /// See [`JsonEncoderStep`].
    JsonEncoder(JsonEncoderStep),
    /// See [`DebugDumpStep`].
    DebugDump(DebugDumpStep),
    /// See [`CreateGraphStep`].
    CreateGraph(CreateGraphStep),
    /// See [`ListGraphsStep`].
    ListGraphs(ListGraphsStep),
}

/// Expands `$body` once per operator variant with `$s` bound to the
/// payload; sentinels take `$sentinel`.
macro_rules! for_each_operator {
    ($step:expr, $s:ident => $body:expr, sentinel => $sentinel:expr) => {
        match $step {
            Step::Start | Step::End => $sentinel,
            Step::ScanNodes($s) => $body,
            Step::ScanNodesByLabel($s) => $body,
            Step::ScanEdges($s) => $body,
            Step::GetOutEdges($s) => $body,
            Step::GetLabelSetId($s) => $body,
            Step::Filter($s) => $body,
            Step::Transform($s) => $body,
            Step::Count($s) => $body,
            Step::Materialize($s) => $body,
            Step::GetNodePropertyInt64($s) => $body,
            Step::GetNodePropertyUInt64($s) => $body,
            Step::GetNodePropertyDouble($s) => $body,
            Step::GetNodePropertyString($s) => $body,
            Step::GetNodePropertyBool($s) => $body,
            Step::GetEdgePropertyInt64($s) => $body,
            Step::GetEdgePropertyUInt64($s) => $body,
            Step::GetEdgePropertyDouble($s) => $body,
            Step::GetEdgePropertyString($s) => $body,
            Step::GetEdgePropertyBool($s) => $body,
            Step::Lambda($s) => $body,
            Step::JsonEncoder($s) => $body,
            Step::DebugDump($s) => $body,
            Step::CreateGraph($s) => $body,
            Step::ListGraphs($s) => $body,
        }
    };
}

impl Step {
    /// Returns the kind of this step.
    #[must_use]
    pub fn kind(&self) -> StepKind {
        match self {
            Step::Start => StepKind::Start,
            Step::End => StepKind::End,
            Step::ScanNodes(_) => StepKind::ScanNodes,
            Step::ScanNodesByLabel(_) => StepKind::ScanNodesByLabel,
            Step::ScanEdges(_) => StepKind::ScanEdges,
            Step::GetOutEdges(_) => StepKind::GetOutEdges,
            Step::GetLabelSetId(_) => StepKind::GetLabelSetId,
            Step::Filter(_) => StepKind::Filter,
            Step::Transform(_) => StepKind::Transform,
            Step::Count(_) => StepKind::Count,
            Step::Materialize(_) => StepKind::Materialize,
            Step::GetNodePropertyInt64(_) => StepKind::GetNodePropertyInt64,
            Step::GetNodePropertyUInt64(_) => StepKind::GetNodePropertyUInt64,
            Step::GetNodePropertyDouble(_) => StepKind::GetNodePropertyDouble,
            Step::GetNodePropertyString(_) => StepKind::GetNodePropertyString,
            Step::GetNodePropertyBool(_) => StepKind::GetNodePropertyBool,
            Step::GetEdgePropertyInt64(_) => StepKind::GetEdgePropertyInt64,
            Step::GetEdgePropertyUInt64(_) => StepKind::GetEdgePropertyUInt64,
            Step::GetEdgePropertyDouble(_) => StepKind::GetEdgePropertyDouble,
            Step::GetEdgePropertyString(_) => StepKind::GetEdgePropertyString,
            Step::GetEdgePropertyBool(_) => StepKind::GetEdgePropertyBool,
            Step::Lambda(_) => StepKind::Lambda,
            Step::JsonEncoder(_) => StepKind::JsonEncoder,
            Step::DebugDump(_) => StepKind::DebugDump,
            Step::CreateGraph(_) => StepKind::CreateGraph,
            Step::ListGraphs(_) => StepKind::ListGraphs,
        }
    }
}

impl PipelineStep for Step {
    fn prepare(&mut self, ctx: &ExecutionContext) -> Result<(), OperatorError> {
        for_each_operator!(self, s => s.prepare(ctx), sentinel => Ok(()))
    }

    fn reset(&mut self) {
        for_each_operator!(self, s => s.reset(), sentinel => ())
    }

    fn execute(&mut self) -> Result<(), OperatorError> {
        for_each_operator!(self, s => s.execute(), sentinel => Ok(()))
    }

    fn is_finished(&self) -> bool {
        for_each_operator!(self, s => s.is_finished(), sentinel => true)
    }

    fn describe(&self) -> String {
        for_each_operator!(self, s => s.describe(), sentinel => self.kind().to_string())
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

macro_rules! step_from {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for Step {
                fn from(step: $ty) -> Self {
                    Step::$variant(step)
                }
            }
        )*
    };
}

step_from!(
    ScanNodes(ScanNodesStep),
    ScanNodesByLabel(ScanNodesByLabelStep),
    ScanEdges(ScanEdgesStep),
    GetOutEdges(GetOutEdgesStep),
    GetLabelSetId(GetLabelSetIdStep),
    Filter(FilterStep),
    Transform(TransformStep),
    Count(CountStep),
    Materialize(MaterializeStep),
    Lambda(LambdaStep),
    JsonEncoder(JsonEncoderStep),
    DebugDump(DebugDumpStep),
    CreateGraph(CreateGraphStep),
    ListGraphs(ListGraphsStep),
);
