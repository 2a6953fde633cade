//! Column projection.

use crate::execution::column::AnyColumn;
use crate::execution::context::ExecutionContext;
use crate::execution::error::OperatorError;
use crate::execution::step::PipelineStep;
use crate::execution::Column;

/// One output column of a [`TransformStep`].
#[derive(Debug, Clone)]
pub enum Projection {
    /// Copies `source` into `destination`.
    Copy {
        /// Column read.
        source: AnyColumn,
        /// Column written.
        destination: AnyColumn,
    },
    /// Writes `source[indices[i]]` into row `i` of `destination`.
    Gather {
        /// Column read.
        source: AnyColumn,
        /// Row positions in `source`.
        indices: Column<usize>,
        /// Column written.
        destination: AnyColumn,
    },
}

impl Projection {
    /// Plain copy.
    pub fn copy(source: impl Into<AnyColumn>, destination: impl Into<AnyColumn>) -> Self {
        Projection::Copy {
            source: source.into(),
            destination: destination.into(),
        }
    }

    /// Copy through an index column.
    pub fn gather(
        source: impl Into<AnyColumn>,
        indices: &Column<usize>,
        destination: impl Into<AnyColumn>,
    ) -> Self {
        Projection::Gather {
            source: source.into(),
            indices: indices.clone(),
            destination: destination.into(),
        }
    }

    fn columns(&self) -> (&AnyColumn, &AnyColumn) {
        match self {
            Projection::Copy {
                source,
                destination,
            }
            | Projection::Gather {
                source,
                destination,
                ..
            } => (source, destination),
        }
    }

    fn apply(&self) -> Result<(), OperatorError> {
        match self {
            Projection::Copy {
                source,
                destination,
            } => source.copy_into(destination),
            Projection::Gather {
                source,
                indices,
                destination,
            } => {
                let indices = indices.to_vec();
                source.gather_into(&indices, destination)
            }
        }
    }
}

/// Writes derived columns for the current chunk.
///
/// Projections are applied in order, so a later projection may read the
/// output of an earlier one.
pub struct TransformStep {
    projections: Vec<Projection>,
}

impl TransformStep {
    /// Creates a transform applying `projections`.
    #[must_use]
    pub fn new(projections: Vec<Projection>) -> Self {
        Self { projections }
    }

    /// Returns the projections.
    #[must_use]
    pub fn projections(&self) -> &[Projection] {
        &self.projections
    }
}

impl PipelineStep for TransformStep {
    fn prepare(&mut self, _ctx: &ExecutionContext) -> Result<(), OperatorError> {
        for projection in &self.projections {
            let (source, destination) = projection.columns();
            source.ensure_same_type(destination)?;
        }
        Ok(())
    }

    fn reset(&mut self) {}

    fn execute(&mut self) -> Result<(), OperatorError> {
        for projection in &self.projections {
            projection.apply()?;
        }
        Ok(())
    }

    fn is_finished(&self) -> bool {
        true
    }

    fn describe(&self) -> String {
        let items: Vec<String> = self
            .projections
            .iter()
            .map(|p| match p {
                Projection::Copy { source, .. } => format!("copy {}", source.logical_type()),
                Projection::Gather { source, .. } => format!("gather {}", source.logical_type()),
            })
            .collect();
        format!("Transform [{}]", items.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::lpg::LpgStore;
    use stepflow_common::types::{EdgeId, NodeId};

    #[test]
    fn test_copy_and_gather() {
        let ctx = ExecutionContext::new(LpgStore::new().snapshot());
        let nodes = Column::from_vec(vec![NodeId::new(7), NodeId::new(8), NodeId::new(9)]);
        let indices = Column::from_vec(vec![2, 2, 0]);
        let copied: Column<NodeId> = Column::new();
        let gathered: Column<NodeId> = Column::new();

        let mut step = TransformStep::new(vec![
            Projection::copy(&nodes, &copied),
            Projection::gather(&nodes, &indices, &gathered),
        ]);
        step.prepare(&ctx).unwrap();
        step.execute().unwrap();

        assert_eq!(copied.to_vec(), nodes.to_vec());
        assert_eq!(
            gathered.to_vec(),
            vec![NodeId::new(9), NodeId::new(9), NodeId::new(7)]
        );
        assert_eq!(step.describe(), "Transform [copy NODE, gather NODE]");
    }

    #[test]
    fn test_type_checked_in_prepare() {
        let ctx = ExecutionContext::new(LpgStore::new().snapshot());
        let nodes: Column<NodeId> = Column::new();
        let edges: Column<EdgeId> = Column::new();
        let mut step = TransformStep::new(vec![Projection::copy(&nodes, &edges)]);
        assert!(matches!(
            step.prepare(&ctx),
            Err(OperatorError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_gather_out_of_bounds() {
        let ctx = ExecutionContext::new(LpgStore::new().snapshot());
        let values: Column<u64> = Column::from_vec(vec![1]);
        let indices = Column::from_vec(vec![3]);
        let mut step = TransformStep::new(vec![Projection::gather(&values, &indices, &values)]);
        step.prepare(&ctx).unwrap();
        assert!(matches!(
            step.execute(),
            Err(OperatorError::RowOutOfBounds { row: 3, len: 1 })
        ));
    }
}
