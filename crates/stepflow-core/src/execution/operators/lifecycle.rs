//! Graph lifecycle commands.

use std::sync::Arc;

use crate::execution::context::ExecutionContext;
use crate::execution::error::OperatorError;
use crate::execution::step::PipelineStep;
use crate::execution::Column;
use crate::graph::GraphCatalog;

fn catalog_of(ctx: &ExecutionContext) -> Result<Arc<GraphCatalog>, OperatorError> {
    ctx.catalog()
        .cloned()
        .ok_or_else(|| OperatorError::Lifecycle("no graph catalog in execution context".into()))
}

/// Creates a named graph.
pub struct CreateGraphStep {
    name: String,
    catalog: Option<Arc<GraphCatalog>>,
}

impl CreateGraphStep {
    /// Creates a step that creates graph `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            catalog: None,
        }
    }
}

impl PipelineStep for CreateGraphStep {
    fn prepare(&mut self, ctx: &ExecutionContext) -> Result<(), OperatorError> {
        self.catalog = Some(catalog_of(ctx)?);
        Ok(())
    }

    fn reset(&mut self) {}

    fn execute(&mut self) -> Result<(), OperatorError> {
        let catalog = self.catalog.as_ref().ok_or(OperatorError::NotPrepared)?;
        catalog.create_graph(&self.name)?;
        Ok(())
    }

    fn is_finished(&self) -> bool {
        true
    }

    fn describe(&self) -> String {
        format!("CreateGraph {}", self.name)
    }
}

/// Writes the names of all graphs into a string column.
pub struct ListGraphsStep {
    output: Column<String>,
    catalog: Option<Arc<GraphCatalog>>,
}

impl ListGraphsStep {
    /// Creates a listing written to `output`.
    #[must_use]
    pub fn new(output: &Column<String>) -> Self {
        Self {
            output: output.clone(),
            catalog: None,
        }
    }
}

impl PipelineStep for ListGraphsStep {
    fn prepare(&mut self, ctx: &ExecutionContext) -> Result<(), OperatorError> {
        self.catalog = Some(catalog_of(ctx)?);
        Ok(())
    }

    fn reset(&mut self) {}

    fn execute(&mut self) -> Result<(), OperatorError> {
        let catalog = self.catalog.as_ref().ok_or(OperatorError::NotPrepared)?;
        self.output.replace(catalog.graph_names());
        Ok(())
    }

    fn is_finished(&self) -> bool {
        true
    }

    fn describe(&self) -> String {
        "ListGraphs".to_string()
    }
}
