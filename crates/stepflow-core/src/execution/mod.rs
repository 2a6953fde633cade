//! Chunked pipeline execution.
//!
//! A query runs as a linear [`Pipeline`] of steps between a `Start` and
//! an `End` sentinel. Steps exchange data through shared [`Column`]s and
//! produce at most `chunk_size` rows per execution. The [`Executor`]
//! drives the chain with the Activate/Return protocol described in
//! [`executor`].
//!
//! - [`column`]: shared column handles
//! - [`arena`]: column allocation
//! - [`step`]: the step contract and step kinds
//! - [`operators`]: every step implementation
//! - [`dispatch`]: per-kind dispatch tables
//! - [`executor`]: the run loop

pub mod arena;
pub mod block;
pub mod column;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod executor;
pub mod operators;
pub mod pipeline;
pub mod stats;
pub mod step;

pub use arena::ColumnArena;
pub use block::OutputBlock;
pub use column::{AnyColumn, Column, ColumnValue};
pub use config::{DEFAULT_CHUNK_SIZE, ExecutionConfig};
pub use context::{CancellationToken, ExecutionContext};
pub use dispatch::{ActivateTarget, DispatchTableBuilder, DispatchTables, Phase, ReturnTarget};
pub use error::{ConfigurationError, DispatchTableError, ExecutionError, OperatorError};
pub use executor::Executor;
pub use pipeline::Pipeline;
pub use stats::{RunStats, StepStats};
pub use step::{PipelineStep, Step, StepKind};
