//! Errors raised while building and running pipelines.

use std::io;
use thiserror::Error;

use super::dispatch::Phase;
use super::step::StepKind;

/// The pipeline or its configuration is malformed.
///
/// Raised before any step is prepared.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// The pipeline cannot hold both sentinels.
    #[error("pipeline has {len} step(s), at least Start and End are required")]
    TooShort {
        /// Number of steps found.
        len: usize,
    },
    /// The first step is not `Start`.
    #[error("pipeline must begin with Start, found {found}")]
    MissingStart {
        /// Kind of the first step.
        found: StepKind,
    },
    /// The last step is not `End`.
    #[error("pipeline must end with End, found {found}")]
    MissingEnd {
        /// Kind of the last step.
        found: StepKind,
    },
    /// A sentinel appears between the first and last step.
    #[error("{kind} is only allowed at the boundary of a pipeline, found at step {index}")]
    MisplacedSentinel {
        /// Position of the offending step.
        index: usize,
        /// Kind of the offending step.
        kind: StepKind,
    },
    /// Chunks must hold at least one row.
    #[error("chunk size must be at least 1")]
    InvalidChunkSize,
}

/// A dispatch table is incomplete or routes a sentinel wrongly.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchTableError {
    /// No target registered for a kind in a phase.
    #[error("no {phase} target registered for {kind}")]
    MissingTarget {
        /// Step kind without a target.
        kind: StepKind,
        /// Phase of the missing entry.
        phase: Phase,
    },
    /// A sentinel was given a target that leaves the step array.
    #[error("invalid {phase} target registered for sentinel {kind}")]
    InvalidSentinelTarget {
        /// `Start` or `End`.
        kind: StepKind,
        /// Phase of the offending entry.
        phase: Phase,
    },
}

/// Error raised by a step while preparing or executing.
#[derive(Error, Debug)]
pub enum OperatorError {
    /// Type mismatch during execution.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// Expected type name.
        expected: String,
        /// Found type name.
        found: String,
    },
    /// An input column is shorter than the rows being processed.
    #[error("column has {actual} row(s), expected {expected}")]
    ColumnLength {
        /// Rows required.
        expected: usize,
        /// Rows present.
        actual: usize,
    },
    /// A row index points outside its column.
    #[error("row {row} out of bounds for column of length {len}")]
    RowOutOfBounds {
        /// Requested row.
        row: usize,
        /// Column length.
        len: usize,
    },
    /// A step reads and writes the same column where that is not allowed.
    #[error("column aliasing: {0}")]
    ColumnAliasing(String),
    /// Error from the graph layer.
    #[error(transparent)]
    Storage(#[from] stepflow_common::Error),
    /// Graph lifecycle command failed.
    #[error("lifecycle error: {0}")]
    Lifecycle(String),
    /// User callback failed.
    #[error("callback error: {0}")]
    Callback(String),
    /// Invalid regular expression in a predicate.
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
    /// Writing results to a sink failed.
    #[error("output error: {0}")]
    Output(#[from] io::Error),
    /// `execute` was called before `prepare`.
    #[error("step executed before prepare")]
    NotPrepared,
}

/// Error returned by [`Executor::run`](super::Executor::run).
#[derive(Error, Debug)]
pub enum ExecutionError {
    /// The pipeline was rejected before running.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    /// The dispatch tables are incomplete or invalid.
    #[error(transparent)]
    DispatchTable(#[from] DispatchTableError),
    /// A dispatch target moved control outside the step array.
    #[error("control left the pipeline after step {step}")]
    ControlFlow {
        /// Position of the last step dispatched.
        step: usize,
    },
    /// A step failed; the run was aborted.
    #[error("step {step} ({kind}) failed: {source}")]
    Operator {
        /// Position of the failing step.
        step: usize,
        /// Kind of the failing step.
        kind: StepKind,
        /// The step's error.
        #[source]
        source: OperatorError,
    },
    /// The run was cancelled through its token.
    #[error("pipeline run cancelled")]
    Cancelled,
    /// The iteration budget was exhausted.
    #[error("pipeline exceeded its budget of {0} iterations")]
    IterationLimit(u64),
}

impl ExecutionError {
    /// Returns the operator error if a step failed.
    #[must_use]
    pub fn operator_error(&self) -> Option<&OperatorError> {
        match self {
            ExecutionError::Operator { source, .. } => Some(source),
            _ => None,
        }
    }
}
