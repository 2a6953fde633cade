//! Logical types of columns and values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The logical type of a column or value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalType {
    /// The null type.
    Null,
    /// Boolean.
    Bool,
    /// Signed 64-bit integer.
    Int64,
    /// Unsigned 64-bit integer.
    UInt64,
    /// 64-bit float.
    Float64,
    /// UTF-8 string.
    String,
    /// Node reference.
    Node,
    /// Edge reference.
    Edge,
    /// Label set reference.
    LabelSet,
    /// Row index into another column.
    Index,
}

impl LogicalType {
    /// Returns the type name used in error messages and plan descriptions.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            LogicalType::Null => "NULL",
            LogicalType::Bool => "BOOL",
            LogicalType::Int64 => "INT64",
            LogicalType::UInt64 => "UINT64",
            LogicalType::Float64 => "DOUBLE",
            LogicalType::String => "STRING",
            LogicalType::Node => "NODE",
            LogicalType::Edge => "EDGE",
            LogicalType::LabelSet => "LABELSET",
            LogicalType::Index => "INDEX",
        }
    }

    /// Returns true for the property primitive types.
    #[must_use]
    pub const fn is_property_type(self) -> bool {
        matches!(
            self,
            LogicalType::Bool
                | LogicalType::Int64
                | LogicalType::UInt64
                | LogicalType::Float64
                | LogicalType::String
        )
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
