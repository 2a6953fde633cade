//! # stepflow-core
//!
//! Core layer for Stepflow: graph snapshots, storage cursors, and the
//! chunked pipeline executor.
//!
//! This crate depends only on `stepflow-common`.
//!
//! ## Modules
//!
//! - [`graph`] - Labeled property graph store, snapshots, and the graph catalog
//! - [`iterators`] - Chunk writers that walk a snapshot
//! - [`execution`] - Columns, steps, pipelines, and the executor
//!
//! ## Example
//!
//! ```
//! use stepflow_core::execution::operators::LambdaOperation;
//! use stepflow_core::{Column, ExecutionContext, Executor, LpgStore, Pipeline};
//!
//! let store = LpgStore::new();
//! for _ in 0..10 {
//!     store.create_node(&["Person"]);
//! }
//! let ctx = ExecutionContext::new(store.snapshot()).with_chunk_size(4);
//!
//! let ids = Column::new();
//! let mut pipeline = Pipeline::new();
//! pipeline.add_start();
//! pipeline.add_scan_nodes(&ids);
//! let chunk = ids.clone();
//! pipeline.add_lambda(move |op| {
//!     if op == LambdaOperation::Execute {
//!         assert!(chunk.len() <= 4);
//!     }
//!     Ok(())
//! });
//! pipeline.add_end();
//!
//! let stats = Executor::new().run(&ctx, &mut pipeline).unwrap();
//! assert_eq!(stats.executions(1), 3);
//! ```

pub mod execution;
pub mod graph;
pub mod iterators;

// Re-export commonly used types
pub use execution::{
    Column, ExecutionConfig, ExecutionContext, ExecutionError, Executor, OperatorError, Pipeline,
    RunStats, Step, StepKind,
};
pub use graph::GraphCatalog;
pub use graph::lpg::{GraphSnapshot, LpgStore};
