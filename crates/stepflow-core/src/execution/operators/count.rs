//! Row count aggregate.

use crate::execution::column::AnyColumn;
use crate::execution::context::ExecutionContext;
use crate::execution::error::OperatorError;
use crate::execution::step::PipelineStep;
use crate::execution::Column;

/// Counts the rows of its input column over the whole run.
///
/// The total lives in row 0 of the output column. It is zeroed in
/// `prepare` and is not touched by `reset`, so it accumulates across
/// chunks.
pub struct CountStep {
    input: AnyColumn,
    output: Column<u64>,
}

impl CountStep {
    /// Creates a count of `input` written to `output`.
    pub fn new(input: impl Into<AnyColumn>, output: &Column<u64>) -> Self {
        Self {
            input: input.into(),
            output: output.clone(),
        }
    }
}

impl PipelineStep for CountStep {
    fn prepare(&mut self, _ctx: &ExecutionContext) -> Result<(), OperatorError> {
        if let AnyColumn::Counts(input) = &self.input {
            if input.ptr_eq(&self.output) {
                return Err(OperatorError::ColumnAliasing(
                    "count cannot write into its input column".into(),
                ));
            }
        }
        self.output.replace(vec![0]);
        Ok(())
    }

    fn reset(&mut self) {}

    fn execute(&mut self) -> Result<(), OperatorError> {
        let rows = self.input.len() as u64;
        let mut out = self.output.write();
        match out.first_mut() {
            Some(total) => *total += rows,
            None => out.push(rows),
        }
        Ok(())
    }

    fn is_finished(&self) -> bool {
        true
    }

    fn describe(&self) -> String {
        format!("Count {}", self.input.logical_type())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::lpg::LpgStore;
    use stepflow_common::types::NodeId;

    #[test]
    fn test_count_accumulates() {
        let ctx = ExecutionContext::new(LpgStore::new().snapshot());
        let input = Column::from_vec(vec![NodeId::new(0), NodeId::new(1)]);
        let total = Column::from_vec(vec![99]);
        let mut count = CountStep::new(&input, &total);

        count.prepare(&ctx).unwrap();
        assert_eq!(total.to_vec(), vec![0]);

        count.reset();
        count.execute().unwrap();
        input.replace(vec![NodeId::new(2)]);
        count.reset();
        count.execute().unwrap();
        assert_eq!(total.to_vec(), vec![3]);
    }

    #[test]
    fn test_count_rejects_self_input() {
        let ctx = ExecutionContext::new(LpgStore::new().snapshot());
        let total: Column<u64> = Column::new();
        let mut count = CountStep::new(&total, &total);
        assert!(matches!(
            count.prepare(&ctx),
            Err(OperatorError::ColumnAliasing(_))
        ));
    }
}
