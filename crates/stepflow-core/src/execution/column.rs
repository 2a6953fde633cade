//! Columns shared between pipeline steps.
//!
//! A step never owns the columns it reads or writes. The planner allocates
//! them from a [`ColumnArena`](super::ColumnArena) and hands each step a
//! [`Column`] handle; the handle is cheap to clone and every clone sees the
//! same buffer. Upstream steps overwrite their output columns with each new
//! chunk, downstream steps read them.

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use stepflow_common::types::{EdgeId, EdgeTypeId, LabelSetId, LogicalType, NodeId, Value};
use std::fmt;
use std::sync::Arc;

use super::error::OperatorError;

/// Shared handle to a growable column buffer.
pub struct Column<T> {
    inner: Arc<RwLock<Vec<T>>>,
}

impl<T> Column<T> {
    /// Creates an empty column.
    #[must_use]
    pub fn new() -> Self {
        Self::from_vec(Vec::new())
    }

    /// Creates a column holding `values`.
    #[must_use]
    pub fn from_vec(values: Vec<T>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(values)),
        }
    }

    /// Locks the column for reading.
    pub fn read(&self) -> RwLockReadGuard<'_, Vec<T>> {
        self.inner.read()
    }

    /// Locks the column for writing.
    pub fn write(&self) -> RwLockWriteGuard<'_, Vec<T>> {
        self.inner.write()
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Returns true if the column has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Removes every row.
    pub fn clear(&self) {
        self.inner.write().clear();
    }

    /// Replaces the content of the column.
    pub fn replace(&self, values: Vec<T>) {
        *self.inner.write() = values;
    }

    /// Returns true if both handles point to the same buffer.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: Clone> Column<T> {
    /// Copies the rows out of the column.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.inner.read().clone()
    }
}

impl<T> Clone for Column<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for Column<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Column<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Column({:p}, len={})", Arc::as_ptr(&self.inner), self.len())
    }
}

/// Element types that can live in a column.
pub trait ColumnValue: Clone + Send + Sync + 'static {
    /// Logical type of the column.
    const TYPE: LogicalType;

    /// Wraps a typed handle into an [`AnyColumn`].
    fn wrap(column: Column<Self>) -> AnyColumn;

    /// Returns the row as a dynamic value.
    fn to_value(&self) -> Value;
}

macro_rules! column_value {
    ($ty:ty, $variant:ident, $logical:expr, |$v:ident| $to_value:expr) => {
        impl ColumnValue for $ty {
            const TYPE: LogicalType = $logical;

            fn wrap(column: Column<Self>) -> AnyColumn {
                AnyColumn::$variant(column)
            }

            fn to_value(&self) -> Value {
                let $v = self;
                $to_value
            }
        }
    };
}

column_value!(NodeId, NodeIds, LogicalType::Node, |v| Value::Node(*v));
column_value!(EdgeId, EdgeIds, LogicalType::Edge, |v| Value::Edge(*v));
column_value!(LabelSetId, LabelSetIds, LogicalType::LabelSet, |v| Value::UInt64(
    u64::from(v.as_raw())
));
column_value!(EdgeTypeId, EdgeTypes, LogicalType::UInt64, |v| Value::UInt64(
    u64::from(v.as_raw())
));
column_value!(usize, Indices, LogicalType::Index, |v| Value::UInt64(*v as u64));
column_value!(u64, Counts, LogicalType::UInt64, |v| Value::UInt64(*v));
column_value!(String, Strings, LogicalType::String, |v| Value::String(v.as_str().into()));
column_value!(Option<i64>, Int64, LogicalType::Int64, |v| Value::from(*v));
column_value!(Option<u64>, UInt64, LogicalType::UInt64, |v| Value::from(*v));
column_value!(Option<f64>, Float64, LogicalType::Float64, |v| Value::from(*v));
column_value!(Option<bool>, Bool, LogicalType::Bool, |v| Value::from(*v));
column_value!(Option<Arc<str>>, String, LogicalType::String, |v| Value::from(v.clone()));

/// A column handle of any supported element type.
#[derive(Debug, Clone)]
pub enum AnyColumn {
    /// Node identifiers.
    NodeIds(Column<NodeId>),
    /// Edge identifiers.
    EdgeIds(Column<EdgeId>),
    /// Label set identifiers.
    LabelSetIds(Column<LabelSetId>),
    /// Edge type identifiers.
    EdgeTypes(Column<EdgeTypeId>),
    /// Row indices into another column.
    Indices(Column<usize>),
    /// Counters.
    Counts(Column<u64>),
    /// Plain strings (names, descriptions).
    Strings(Column<String>),
    /// Optional signed integers.
    Int64(Column<Option<i64>>),
    /// Optional unsigned integers.
    UInt64(Column<Option<u64>>),
    /// Optional floats.
    Float64(Column<Option<f64>>),
    /// Optional booleans.
    Bool(Column<Option<bool>>),
    /// Optional strings.
    String(Column<Option<Arc<str>>>),
}

/// Runs `$body` with `$col` bound to the typed column inside `$any`.
macro_rules! with_column {
    ($any:expr, $col:ident => $body:expr) => {
        match $any {
            AnyColumn::NodeIds($col) => $body,
            AnyColumn::EdgeIds($col) => $body,
            AnyColumn::LabelSetIds($col) => $body,
            AnyColumn::EdgeTypes($col) => $body,
            AnyColumn::Indices($col) => $body,
            AnyColumn::Counts($col) => $body,
            AnyColumn::Strings($col) => $body,
            AnyColumn::Int64($col) => $body,
            AnyColumn::UInt64($col) => $body,
            AnyColumn::Float64($col) => $body,
            AnyColumn::Bool($col) => $body,
            AnyColumn::String($col) => $body,
        }
    };
}

/// Runs `$body` with `$src`/`$dst` bound to two columns of the same type,
/// or fails with a type mismatch.
macro_rules! with_column_pair {
    ($lhs:expr, $rhs:expr, $src:ident, $dst:ident => $body:expr) => {
        match ($lhs, $rhs) {
            (AnyColumn::NodeIds($src), AnyColumn::NodeIds($dst)) => $body,
            (AnyColumn::EdgeIds($src), AnyColumn::EdgeIds($dst)) => $body,
            (AnyColumn::LabelSetIds($src), AnyColumn::LabelSetIds($dst)) => $body,
            (AnyColumn::EdgeTypes($src), AnyColumn::EdgeTypes($dst)) => $body,
            (AnyColumn::Indices($src), AnyColumn::Indices($dst)) => $body,
            (AnyColumn::Counts($src), AnyColumn::Counts($dst)) => $body,
            (AnyColumn::Strings($src), AnyColumn::Strings($dst)) => $body,
            (AnyColumn::Int64($src), AnyColumn::Int64($dst)) => $body,
            (AnyColumn::UInt64($src), AnyColumn::UInt64($dst)) => $body,
            (AnyColumn::Float64($src), AnyColumn::Float64($dst)) => $body,
            (AnyColumn::Bool($src), AnyColumn::Bool($dst)) => $body,
            (AnyColumn::String($src), AnyColumn::String($dst)) => $body,
            (lhs, rhs) => Err(OperatorError::TypeMismatch {
                expected: lhs.type_name().to_string(),
                found: rhs.type_name().to_string(),
            }),
        }
    };
}

impl AnyColumn {
    /// Returns the logical type of the column.
    #[must_use]
    pub fn logical_type(&self) -> LogicalType {
        fn of<T: ColumnValue>(_: &Column<T>) -> LogicalType {
            T::TYPE
        }
        with_column!(self, c => of(c))
    }

    /// Returns the name of the column variant.
    ///
    /// Unlike [`logical_type`](Self::logical_type) this tells apart
    /// variants sharing a logical type, such as edge types and counts.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            AnyColumn::NodeIds(_) => "NODE_IDS",
            AnyColumn::EdgeIds(_) => "EDGE_IDS",
            AnyColumn::LabelSetIds(_) => "LABELSET_IDS",
            AnyColumn::EdgeTypes(_) => "EDGE_TYPES",
            AnyColumn::Indices(_) => "INDICES",
            AnyColumn::Counts(_) => "COUNTS",
            AnyColumn::Strings(_) => "STRINGS",
            AnyColumn::Int64(_) => "INT64",
            AnyColumn::UInt64(_) => "UINT64",
            AnyColumn::Float64(_) => "DOUBLE",
            AnyColumn::Bool(_) => "BOOL",
            AnyColumn::String(_) => "STRING",
        }
    }

    /// Fails unless `other` holds the same column variant.
    ///
    /// # Errors
    ///
    /// Returns [`OperatorError::TypeMismatch`] naming both variants.
    pub fn ensure_same_type(&self, other: &AnyColumn) -> Result<(), OperatorError> {
        with_column_pair!(self, other, _lhs, _rhs => Ok(()))
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        with_column!(self, c => c.len())
    }

    /// Returns true if the column has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every row.
    pub fn clear(&self) {
        with_column!(self, c => c.clear());
    }

    /// Returns one row as a dynamic value.
    #[must_use]
    pub fn value(&self, row: usize) -> Option<Value> {
        with_column!(self, c => c.read().get(row).map(ColumnValue::to_value))
    }

    /// Returns every row as dynamic values.
    #[must_use]
    pub fn values(&self) -> Vec<Value> {
        with_column!(self, c => c.read().iter().map(ColumnValue::to_value).collect())
    }

    /// Returns true if both handles point to the same buffer.
    #[must_use]
    pub fn ptr_eq(&self, other: &AnyColumn) -> bool {
        with_column_pair!(self, other, a, b => Ok::<bool, OperatorError>(a.ptr_eq(b)))
            .unwrap_or(false)
    }

    /// Replaces `dst` with a copy of this column.
    pub fn copy_into(&self, dst: &AnyColumn) -> Result<(), OperatorError> {
        with_column_pair!(self, dst, src, dst => {
            let rows = src.to_vec();
            dst.replace(rows);
            Ok(())
        })
    }

    /// Appends every row of this column to `dst`.
    pub fn append_into(&self, dst: &AnyColumn) -> Result<(), OperatorError> {
        with_column_pair!(self, dst, src, dst => {
            let rows = src.to_vec();
            dst.write().extend(rows);
            Ok(())
        })
    }

    /// Replaces `dst` with the rows of this column selected by `indices`.
    pub fn gather_into(&self, indices: &[usize], dst: &AnyColumn) -> Result<(), OperatorError> {
        with_column_pair!(self, dst, src, dst => {
            let rows = {
                let src = src.read();
                let mut rows = Vec::with_capacity(indices.len());
                for &i in indices {
                    let row = src.get(i).ok_or(OperatorError::RowOutOfBounds {
                        row: i,
                        len: src.len(),
                    })?;
                    rows.push(row.clone());
                }
                rows
            };
            dst.replace(rows);
            Ok(())
        })
    }
}

impl<T: ColumnValue> From<Column<T>> for AnyColumn {
    fn from(column: Column<T>) -> Self {
        T::wrap(column)
    }
}

impl<T: ColumnValue> From<&Column<T>> for AnyColumn {
    fn from(column: &Column<T>) -> Self {
        T::wrap(column.clone())
    }
}
