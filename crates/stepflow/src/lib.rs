//! # Stepflow
//!
//! Chunked, pull-based execution of linear graph query pipelines.
//!
//! A pipeline is a list of steps framed by `Start` and `End`. Steps share
//! [`Column`]s: each one reads what the steps before it wrote and writes at
//! most `chunk_size` rows per execution. The [`Executor`] pulls chunks
//! through the chain until every step is exhausted, so memory use is
//! bounded by the chunk size rather than by the result.
//!
//! ## Quick Start
//!
//! ```rust
//! use stepflow::prelude::*;
//!
//! let store = LpgStore::new();
//! for age in [17i64, 34, 52, 8] {
//!     store.create_node_with_props(&["Person"], [("age", Value::Int64(age))]);
//! }
//! let ctx = ExecutionContext::new(store.snapshot()).with_chunk_size(2);
//!
//! let people = Column::new();
//! let ages = Column::new();
//! let adults = Column::new();
//! let total = Column::new();
//!
//! let mut pipeline = Pipeline::new();
//! pipeline.add_start();
//! pipeline.add_scan_nodes_by_label(&["Person"], &people);
//! pipeline.add_get_node_property::<i64>(&people, "age", &ages);
//! pipeline.add_filter(FilterStep::new(
//!     &people,
//!     Predicate::compare(&ages, CompareOp::Ge, 18i64),
//!     &adults,
//! ));
//! pipeline.add_count(&adults, &total);
//! pipeline.add_end();
//!
//! Executor::new().run(&ctx, &mut pipeline)?;
//! assert_eq!(total.to_vec(), vec![2]);
//! # Ok::<(), stepflow::ExecutionError>(())
//! ```

pub use stepflow_core::execution::{
    AnyColumn, CancellationToken, Column, ConfigurationError, DEFAULT_CHUNK_SIZE,
    DispatchTableError, ExecutionConfig, ExecutionContext, ExecutionError, Executor,
    OperatorError, OutputBlock, Pipeline, PipelineStep, RunStats, Step, StepKind,
};
pub use stepflow_core::graph::GraphCatalog;
pub use stepflow_core::graph::lpg::{GraphSnapshot, LpgStore};

// Re-export the building blocks for anyone assembling steps by hand
pub use stepflow_core::{execution, graph, iterators};

// Re-export core types - you'll need these for working with IDs and values
pub use stepflow_common::types::{EdgeId, LogicalType, NodeId, PropertyKey, Value};

/// Everything needed to build and run a pipeline.
pub mod prelude {
    pub use crate::execution::operators::{
        CompareOp, FilterStep, LambdaOperation, MaterializeStep, Predicate, Projection,
        SharedBuffer,
    };
    pub use crate::iterators::{EdgeScanOutput, EdgeWriteInfo};
    pub use crate::{
        Column, ExecutionConfig, ExecutionContext, Executor, GraphCatalog, LpgStore, NodeId,
        OutputBlock, Pipeline, Value,
    };
}
