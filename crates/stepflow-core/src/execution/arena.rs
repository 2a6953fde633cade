//! Column allocation for a pipeline.

use super::column::{AnyColumn, Column, ColumnValue};

/// Owns the columns of one pipeline.
///
/// The planner allocates every column a pipeline touches from an arena
/// and keeps the arena alive for as long as results are read. Steps only
/// hold handles, so clearing the arena between runs resets every column
/// at once.
#[derive(Debug, Default)]
pub struct ColumnArena {
    columns: Vec<AnyColumn>,
}

impl ColumnArena {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates an empty column.
    pub fn alloc<T: ColumnValue>(&mut self) -> Column<T> {
        let column = Column::new();
        self.columns.push(T::wrap(column.clone()));
        column
    }

    /// Returns the number of allocated columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if nothing has been allocated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Empties every column without releasing the handles.
    pub fn clear_all(&self) {
        for column in &self.columns {
            column.clear();
        }
    }

    /// Iterates over every allocated column.
    pub fn iter(&self) -> impl Iterator<Item = &AnyColumn> {
        self.columns.iter()
    }
}
