//! Named column sets consumed by output steps.

use stepflow_common::types::Value;

use super::column::AnyColumn;
use super::error::OperatorError;

/// An ordered set of named columns read row by row.
#[derive(Debug, Clone, Default)]
pub struct OutputBlock {
    columns: Vec<(String, AnyColumn)>,
}

impl OutputBlock {
    /// Creates an empty block.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a named column.
    #[must_use]
    pub fn with_column(mut self, name: impl Into<String>, column: impl Into<AnyColumn>) -> Self {
        self.add_column(name, column);
        self
    }

    /// Appends a named column.
    pub fn add_column(&mut self, name: impl Into<String>, column: impl Into<AnyColumn>) {
        self.columns.push((name.into(), column.into()));
    }

    /// Returns the column names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Returns the number of rows in the current chunk.
    ///
    /// # Errors
    ///
    /// Returns [`OperatorError::ColumnLength`] if the columns disagree.
    pub fn row_count(&self) -> Result<usize, OperatorError> {
        let Some((_, first)) = self.columns.first() else {
            return Ok(0);
        };
        let expected = first.len();
        for (_, column) in &self.columns[1..] {
            let actual = column.len();
            if actual != expected {
                return Err(OperatorError::ColumnLength { expected, actual });
            }
        }
        Ok(expected)
    }

    /// Copies the current chunk out as rows of named values.
    ///
    /// # Errors
    ///
    /// Returns [`OperatorError::ColumnLength`] if the columns disagree.
    pub fn rows(&self) -> Result<Vec<Vec<(&str, Value)>>, OperatorError> {
        let count = self.row_count()?;
        let columns: Vec<Vec<Value>> = self.columns.iter().map(|(_, c)| c.values()).collect();
        Ok((0..count)
            .map(|row| {
                self.columns
                    .iter()
                    .zip(&columns)
                    .map(|((name, _), values)| (name.as_str(), values[row].clone()))
                    .collect()
            })
            .collect())
    }
}
