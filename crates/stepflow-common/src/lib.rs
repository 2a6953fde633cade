//! # stepflow-common
//!
//! Foundation layer for Stepflow: identifiers, values, and errors.
//!
//! This crate provides the fundamental building blocks used by the other
//! Stepflow crates. It has no internal dependencies and should be kept minimal.
//!
//! ## Modules
//!
//! - [`types`] - Core type definitions (NodeId, EdgeId, Value, etc.)
//! - [`utils`] - Utility functions and helpers (hashing, errors)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod types;
pub mod utils;

// Re-export commonly used types at crate root
pub use types::{
    EdgeId, EdgeTypeId, EpochId, LabelId, LabelSetId, LogicalType, NodeId, PropertyKey, Value,
};
pub use utils::error::{Error, Result};
