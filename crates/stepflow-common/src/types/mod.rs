//! Core type definitions for Stepflow.
//!
//! This module contains all fundamental types used by the execution engine:
//! - Identifier types ([`NodeId`], [`EdgeId`], [`LabelSetId`], [`EpochId`])
//! - Property types ([`Value`], [`PropertyKey`], [`LogicalType`])

mod id;
mod logical_type;
mod value;

pub use id::{EdgeId, EdgeTypeId, EpochId, LabelId, LabelSetId, NodeId};
pub use logical_type::LogicalType;
pub use value::{PropertyKey, Value};
