//! Typed property fetch for nodes and edges.

use std::marker::PhantomData;
use std::sync::Arc;

use stepflow_common::types::{EdgeId, LogicalType, NodeId, PropertyKey, Value};

use crate::execution::context::ExecutionContext;
use crate::execution::error::OperatorError;
use crate::execution::step::{PipelineStep, Step};
use crate::execution::Column;
use crate::iterators::{PropertyReader, SnapshotEntity};

/// Property value types a fetch step can produce.
pub trait PropertyPrimitive: Clone + Send + Sync + 'static {
    /// Logical type of the property.
    const TYPE: LogicalType;

    /// Extracts the primitive, or `None` if `value` has another type.
    fn from_value(value: &Value) -> Option<Self>;

    /// Wraps a node property fetch into its step variant.
    fn node_step(step: GetPropertyStep<NodeId, Self>) -> Step;

    /// Wraps an edge property fetch into its step variant.
    fn edge_step(step: GetPropertyStep<EdgeId, Self>) -> Step;
}

macro_rules! property_primitive {
    ($ty:ty, $logical:expr, $node:ident, $edge:ident, |$v:ident| $extract:expr) => {
        impl PropertyPrimitive for $ty {
            const TYPE: LogicalType = $logical;

            fn from_value($v: &Value) -> Option<Self> {
                $extract
            }

            fn node_step(step: GetPropertyStep<NodeId, Self>) -> Step {
                Step::$node(step)
            }

            fn edge_step(step: GetPropertyStep<EdgeId, Self>) -> Step {
                Step::$edge(step)
            }
        }
    };
}

property_primitive!(
    i64,
    LogicalType::Int64,
    GetNodePropertyInt64,
    GetEdgePropertyInt64,
    |v| v.as_int64()
);
property_primitive!(
    u64,
    LogicalType::UInt64,
    GetNodePropertyUInt64,
    GetEdgePropertyUInt64,
    |v| v.as_uint64()
);
property_primitive!(
    f64,
    LogicalType::Float64,
    GetNodePropertyDouble,
    GetEdgePropertyDouble,
    |v| v.as_float64()
);
property_primitive!(
    bool,
    LogicalType::Bool,
    GetNodePropertyBool,
    GetEdgePropertyBool,
    |v| v.as_bool()
);
property_primitive!(
    Arc<str>,
    LogicalType::String,
    GetNodePropertyString,
    GetEdgePropertyString,
    |v| match v {
        Value::String(s) => Some(Arc::clone(s)),
        _ => None,
    }
);

/// Fetches one property of every entity in its input column.
///
/// Entities without the property yield `None`. A stored value of another
/// type is an error.
pub struct GetPropertyStep<Id, T> {
    input: Column<Id>,
    key: PropertyKey,
    output: Column<Option<T>>,
    reader: Option<PropertyReader>,
    _entity: PhantomData<fn() -> Id>,
}

/// Node property fetch.
pub type GetNodePropertyStep<T> = GetPropertyStep<NodeId, T>;

/// Edge property fetch.
pub type GetEdgePropertyStep<T> = GetPropertyStep<EdgeId, T>;

impl<Id: SnapshotEntity, T: PropertyPrimitive> GetPropertyStep<Id, T> {
    /// Creates a fetch of `key` for the entities in `input`.
    pub fn new(
        input: &Column<Id>,
        key: impl Into<PropertyKey>,
        output: &Column<Option<T>>,
    ) -> Self {
        Self {
            input: input.clone(),
            key: key.into(),
            output: output.clone(),
            reader: None,
            _entity: PhantomData,
        }
    }

    /// Returns the property key.
    #[must_use]
    pub fn key(&self) -> &PropertyKey {
        &self.key
    }
}

impl<Id: SnapshotEntity, T: PropertyPrimitive> PipelineStep for GetPropertyStep<Id, T> {
    fn prepare(&mut self, ctx: &ExecutionContext) -> Result<(), OperatorError> {
        self.reader = Some(PropertyReader::new(
            Arc::clone(ctx.snapshot()),
            self.key.clone(),
        ));
        Ok(())
    }

    fn reset(&mut self) {}

    fn execute(&mut self) -> Result<(), OperatorError> {
        let reader = self.reader.as_ref().ok_or(OperatorError::NotPrepared)?;
        let input = self.input.read();
        let values = reader.read_all(input.as_slice(), |value| match value {
            None | Some(Value::Null) => Ok(None),
            Some(value) => T::from_value(value).map(Some).ok_or_else(|| {
                OperatorError::TypeMismatch {
                    expected: T::TYPE.to_string(),
                    found: value.logical_type().to_string(),
                }
            }),
        })?;
        drop(input);
        self.output.replace(values);
        Ok(())
    }

    fn is_finished(&self) -> bool {
        true
    }

    fn describe(&self) -> String {
        format!("Get{}Property {}: {}", Id::NAME, self.key, T::TYPE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::StepKind;
    use crate::graph::lpg::LpgStore;

    #[test]
    fn test_node_properties() {
        let store = LpgStore::new();
        let alice = store.create_node_with_props(&["Person"], [("age", Value::from(30i64))]);
        let bob = store.create_node(&["Person"]);
        let ctx = ExecutionContext::new(store.snapshot());

        let input = Column::from_vec(vec![alice, bob]);
        let ages = Column::new();
        let mut step = GetNodePropertyStep::<i64>::new(&input, "age", &ages);
        step.prepare(&ctx).unwrap();
        step.execute().unwrap();

        assert_eq!(ages.to_vec(), vec![Some(30), None]);
        assert_eq!(step.describe(), "GetNodeProperty age: INT64");
    }

    #[test]
    fn test_edge_string_property() {
        let store = LpgStore::new();
        let a = store.create_node(&[]);
        let b = store.create_node(&[]);
        let e = store
            .create_edge_with_props(a, b, "KNOWS", [("via", "work")])
            .unwrap();
        let ctx = ExecutionContext::new(store.snapshot());

        let input = Column::from_vec(vec![e]);
        let via = Column::new();
        let mut step = GetEdgePropertyStep::<Arc<str>>::new(&input, "via", &via);
        step.prepare(&ctx).unwrap();
        step.execute().unwrap();

        assert_eq!(via.to_vec(), vec![Some(Arc::<str>::from("work"))]);
    }

    #[test]
    fn test_type_mismatch() {
        let store = LpgStore::new();
        let n = store.create_node_with_props(&[], [("age", "thirty")]);
        let ctx = ExecutionContext::new(store.snapshot());

        let mut step = GetNodePropertyStep::<i64>::new(
            &Column::from_vec(vec![n]),
            "age",
            &Column::new(),
        );
        step.prepare(&ctx).unwrap();
        let err = step.execute().unwrap_err();
        assert!(matches!(
            err,
            OperatorError::TypeMismatch { ref expected, ref found }
                if expected == "INT64" && found == "STRING"
        ));
    }

    #[test]
    fn test_step_variant() {
        let score = GetNodePropertyStep::new(&Column::new(), "score", &Column::new());
        assert_eq!(f64::node_step(score).kind(), StepKind::GetNodePropertyDouble);

        let active = GetEdgePropertyStep::new(&Column::new(), "active", &Column::new());
        assert_eq!(bool::edge_step(active).kind(), StepKind::GetEdgePropertyBool);
    }
}
