//! Pipeline steps.
//!
//! Each step reads the columns written by the steps before it and writes
//! its own output columns:
//!
//! - Scan: read nodes and edges from the snapshot
//! - Expand: follow outgoing edges
//! - Filter: keep rows matching a predicate
//! - Transform: copy and gather columns
//! - Count, Materialize: accumulate across chunks
//! - Property: fetch typed node and edge properties
//! - Lambda: hand rows to user code
//! - Output: JSON lines and debug dumps
//! - Lifecycle: create and list graphs

mod count;
mod expand;
mod filter;
mod label_set;
mod lambda;
mod lifecycle;
mod materialize;
mod output;
mod property;
mod scan;
mod transform;

pub use count::CountStep;
pub use expand::GetOutEdgesStep;
pub use filter::{CompareOp, FilterStep, Predicate, compare_values};
pub use label_set::GetLabelSetIdStep;
pub use lambda::{LambdaOperation, LambdaStep};
pub use lifecycle::{CreateGraphStep, ListGraphsStep};
pub use materialize::MaterializeStep;
pub use output::{DebugDumpStep, JsonEncoderStep, SharedBuffer, value_to_json};
pub use property::{GetEdgePropertyStep, GetNodePropertyStep, GetPropertyStep, PropertyPrimitive};
pub use scan::{ScanEdgesStep, ScanNodesByLabelStep, ScanNodesStep};
pub use transform::{Projection, TransformStep};
