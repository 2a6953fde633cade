//! Result accumulation.

use crate::execution::column::AnyColumn;
use crate::execution::context::ExecutionContext;
use crate::execution::error::OperatorError;
use crate::execution::step::PipelineStep;

/// Appends every chunk of its source columns to result columns.
///
/// Upstream steps overwrite their outputs chunk by chunk. Materializing
/// copies each chunk into result columns that hold the complete result
/// when the run ends. Result columns are cleared in `prepare`.
pub struct MaterializeStep {
    columns: Vec<(AnyColumn, AnyColumn)>,
}

impl MaterializeStep {
    /// Creates an empty materialization.
    #[must_use]
    pub fn new() -> Self {
        Self {
            columns: Vec::new(),
        }
    }

    /// Accumulates `source` into `result`.
    #[must_use]
    pub fn column(mut self, source: impl Into<AnyColumn>, result: impl Into<AnyColumn>) -> Self {
        self.columns.push((source.into(), result.into()));
        self
    }
}

impl Default for MaterializeStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for MaterializeStep {
    fn prepare(&mut self, _ctx: &ExecutionContext) -> Result<(), OperatorError> {
        for (source, result) in &self.columns {
            source.ensure_same_type(result)?;
            if source.ptr_eq(result) {
                return Err(OperatorError::ColumnAliasing(
                    "materialize source and result share a column".into(),
                ));
            }
        }
        for (_, result) in &self.columns {
            result.clear();
        }
        Ok(())
    }

    fn reset(&mut self) {}

    fn execute(&mut self) -> Result<(), OperatorError> {
        for (source, result) in &self.columns {
            source.append_into(result)?;
        }
        Ok(())
    }

    fn is_finished(&self) -> bool {
        true
    }

    fn describe(&self) -> String {
        let types: Vec<String> = self
            .columns
            .iter()
            .map(|(source, _)| source.logical_type().to_string())
            .collect();
        format!("Materialize [{}]", types.join(", "))
    }
}
