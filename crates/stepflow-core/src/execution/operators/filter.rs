//! Row selection by predicate.

use std::sync::Arc;

use regex::Regex;
use stepflow_common::types::{LabelSetId, Value};

use crate::execution::column::AnyColumn;
use crate::execution::context::ExecutionContext;
use crate::execution::error::OperatorError;
use crate::execution::step::PipelineStep;
use crate::execution::Column;
use crate::graph::lpg::GraphSnapshot;

/// A comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// Equal.
    Eq,
    /// Not equal.
    Ne,
    /// Less than.
    Lt,
    /// Less than or equal.
    Le,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Ge,
}

impl CompareOp {
    fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "<>",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }

    fn apply<T: PartialOrd>(self, a: &T, b: &T) -> bool {
        match self {
            CompareOp::Eq => a == b,
            CompareOp::Ne => a != b,
            CompareOp::Lt => a < b,
            CompareOp::Le => a <= b,
            CompareOp::Gt => a > b,
            CompareOp::Ge => a >= b,
        }
    }
}

/// Compares two values. Nulls and values of different types never match.
#[must_use]
pub fn compare_values(left: &Value, op: CompareOp, right: &Value) -> bool {
    match (left, right) {
        (Value::Int64(a), Value::Int64(b)) => op.apply(a, b),
        (Value::UInt64(a), Value::UInt64(b)) => op.apply(a, b),
        (Value::Float64(a), Value::Float64(b)) => match op {
            CompareOp::Eq => (a - b).abs() < f64::EPSILON,
            CompareOp::Ne => (a - b).abs() >= f64::EPSILON,
            _ => op.apply(a, b),
        },
        (Value::String(a), Value::String(b)) => op.apply(a, b),
        (Value::Bool(a), Value::Bool(b)) => match op {
            CompareOp::Eq | CompareOp::Ne => op.apply(a, b),
            // Ordering on booleans doesn't make sense
            _ => false,
        },
        (Value::Node(a), Value::Node(b)) => op.apply(a, b),
        (Value::Edge(a), Value::Edge(b)) => op.apply(a, b),
        _ => false,
    }
}

/// A predicate evaluated once per input row.
#[derive(Debug, Clone)]
pub enum Predicate {
    /// Compares a column against a constant.
    Compare {
        /// Column to read.
        column: AnyColumn,
        /// Comparison operator.
        op: CompareOp,
        /// Value to compare against.
        value: Value,
    },
    /// Compares two columns row by row.
    CompareColumns {
        /// Left operand.
        left: AnyColumn,
        /// Comparison operator.
        op: CompareOp,
        /// Right operand.
        right: AnyColumn,
    },
    /// Matches string rows against a regular expression.
    Matches {
        /// Column to read.
        column: AnyColumn,
        /// Compiled pattern.
        regex: Regex,
    },
    /// Keeps rows whose label set contains every given label.
    HasLabels {
        /// Label set ids to test.
        column: Column<LabelSetId>,
        /// Required label names.
        labels: Vec<String>,
    },
    /// Both predicates hold.
    And(Box<Predicate>, Box<Predicate>),
    /// Either predicate holds.
    Or(Box<Predicate>, Box<Predicate>),
    /// The predicate does not hold.
    Not(Box<Predicate>),
}

impl Predicate {
    /// `column <op> value`.
    pub fn compare(column: impl Into<AnyColumn>, op: CompareOp, value: impl Into<Value>) -> Self {
        Predicate::Compare {
            column: column.into(),
            op,
            value: value.into(),
        }
    }

    /// `left <op> right`, row by row.
    pub fn compare_columns(
        left: impl Into<AnyColumn>,
        op: CompareOp,
        right: impl Into<AnyColumn>,
    ) -> Self {
        Predicate::CompareColumns {
            left: left.into(),
            op,
            right: right.into(),
        }
    }

    /// Regular expression match on a string column.
    ///
    /// # Errors
    ///
    /// Returns [`OperatorError::Pattern`] if `pattern` does not compile.
    pub fn matches(column: impl Into<AnyColumn>, pattern: &str) -> Result<Self, OperatorError> {
        Ok(Predicate::Matches {
            column: column.into(),
            regex: Regex::new(pattern)?,
        })
    }

    /// Label set membership.
    pub fn has_labels<S: AsRef<str>>(column: &Column<LabelSetId>, labels: &[S]) -> Self {
        Predicate::HasLabels {
            column: column.clone(),
            labels: labels.iter().map(|l| l.as_ref().to_string()).collect(),
        }
    }

    /// Conjunction.
    #[must_use]
    pub fn and(self, other: Predicate) -> Self {
        Predicate::And(Box::new(self), Box::new(other))
    }

    /// Disjunction.
    #[must_use]
    pub fn or(self, other: Predicate) -> Self {
        Predicate::Or(Box::new(self), Box::new(other))
    }

    /// Negation.
    #[must_use]
    pub fn negate(self) -> Self {
        Predicate::Not(Box::new(self))
    }

    /// Evaluates the predicate for the first `rows` rows.
    ///
    /// # Errors
    ///
    /// Returns [`OperatorError::ColumnLength`] if a referenced column holds
    /// fewer than `rows` rows.
    pub fn evaluate(
        &self,
        rows: usize,
        snapshot: &GraphSnapshot,
    ) -> Result<Vec<bool>, OperatorError> {
        match self {
            Predicate::Compare { column, op, value } => Ok(values(column, rows)?
                .iter()
                .map(|v| compare_values(v, *op, value))
                .collect()),
            Predicate::CompareColumns { left, op, right } => {
                let left = values(left, rows)?;
                let right = values(right, rows)?;
                Ok(left
                    .iter()
                    .zip(&right)
                    .map(|(l, r)| compare_values(l, *op, r))
                    .collect())
            }
            Predicate::Matches { column, regex } => Ok(values(column, rows)?
                .iter()
                .map(|v| v.as_str().is_some_and(|s| regex.is_match(s)))
                .collect()),
            Predicate::HasLabels { column, labels } => {
                let sets = column.read();
                check_len(sets.len(), rows)?;
                let Some(required) = snapshot.resolve_labels(labels.as_slice()) else {
                    return Ok(vec![false; rows]);
                };
                Ok(sets[..rows]
                    .iter()
                    .map(|&set| snapshot.label_set_contains(set, &required))
                    .collect())
            }
            Predicate::And(a, b) => {
                let mut mask = a.evaluate(rows, snapshot)?;
                for (m, keep) in mask.iter_mut().zip(b.evaluate(rows, snapshot)?) {
                    *m = *m && keep;
                }
                Ok(mask)
            }
            Predicate::Or(a, b) => {
                let mut mask = a.evaluate(rows, snapshot)?;
                for (m, keep) in mask.iter_mut().zip(b.evaluate(rows, snapshot)?) {
                    *m = *m || keep;
                }
                Ok(mask)
            }
            Predicate::Not(inner) => Ok(inner
                .evaluate(rows, snapshot)?
                .into_iter()
                .map(|m| !m)
                .collect()),
        }
    }

    fn describe(&self) -> String {
        match self {
            Predicate::Compare { column, op, value } => {
                format!("{} {} {value}", column.logical_type(), op.symbol())
            }
            Predicate::CompareColumns { left, op, right } => format!(
                "{} {} {}",
                left.logical_type(),
                op.symbol(),
                right.logical_type()
            ),
            Predicate::Matches { regex, .. } => format!("STRING =~ /{}/", regex.as_str()),
            Predicate::HasLabels { labels, .. } => format!(":{}", labels.join(":")),
            Predicate::And(a, b) => format!("({} AND {})", a.describe(), b.describe()),
            Predicate::Or(a, b) => format!("({} OR {})", a.describe(), b.describe()),
            Predicate::Not(inner) => format!("NOT {}", inner.describe()),
        }
    }
}

fn check_len(actual: usize, expected: usize) -> Result<(), OperatorError> {
    if actual < expected {
        return Err(OperatorError::ColumnLength { expected, actual });
    }
    Ok(())
}

fn values(column: &AnyColumn, rows: usize) -> Result<Vec<Value>, OperatorError> {
    let mut values = column.values();
    check_len(values.len(), rows)?;
    values.truncate(rows);
    Ok(values)
}

/// Keeps the rows of the current chunk that satisfy a predicate.
///
/// The positions of surviving rows are written to an index column. Each
/// `(source, destination)` pair registered with [`FilterStep::compact`]
/// receives the surviving rows of its source in their original order; a
/// pair may name the same column twice to filter it in place.
pub struct FilterStep {
    input: AnyColumn,
    predicate: Predicate,
    indices: Column<usize>,
    compact: Vec<(AnyColumn, AnyColumn)>,
    snapshot: Option<Arc<GraphSnapshot>>,
}

impl FilterStep {
    /// Creates a filter over the rows of `input`.
    pub fn new(
        input: impl Into<AnyColumn>,
        predicate: Predicate,
        indices: &Column<usize>,
    ) -> Self {
        Self {
            input: input.into(),
            predicate,
            indices: indices.clone(),
            compact: Vec::new(),
            snapshot: None,
        }
    }

    /// Also writes the surviving rows of `source` into `destination`.
    #[must_use]
    pub fn compact(
        mut self,
        source: impl Into<AnyColumn>,
        destination: impl Into<AnyColumn>,
    ) -> Self {
        self.compact.push((source.into(), destination.into()));
        self
    }
}

impl PipelineStep for FilterStep {
    fn prepare(&mut self, ctx: &ExecutionContext) -> Result<(), OperatorError> {
        for (source, destination) in &self.compact {
            source.ensure_same_type(destination)?;
        }
        self.snapshot = Some(Arc::clone(ctx.snapshot()));
        Ok(())
    }

    fn reset(&mut self) {}

    fn execute(&mut self) -> Result<(), OperatorError> {
        let snapshot = self.snapshot.as_ref().ok_or(OperatorError::NotPrepared)?;
        let rows = self.input.len();
        let mask = self.predicate.evaluate(rows, snapshot)?;
        let selected: Vec<usize> = mask
            .iter()
            .enumerate()
            .filter_map(|(i, &keep)| keep.then_some(i))
            .collect();

        for (source, destination) in &self.compact {
            source.gather_into(&selected, destination)?;
        }
        self.indices.replace(selected);
        Ok(())
    }

    fn is_finished(&self) -> bool {
        true
    }

    fn describe(&self) -> String {
        format!("Filter {}", self.predicate.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::lpg::LpgStore;
    use stepflow_common::types::{EdgeTypeId, NodeId};

    fn ctx() -> ExecutionContext {
        ExecutionContext::new(LpgStore::new().snapshot())
    }

    #[test]
    fn test_compare_values() {
        assert!(compare_values(&Value::Int64(3), CompareOp::Lt, &Value::Int64(5)));
        assert!(compare_values(&Value::Float64(0.5), CompareOp::Eq, &Value::Float64(0.5)));
        assert!(compare_values(&Value::from("b"), CompareOp::Gt, &Value::from("a")));
        assert!(!compare_values(&Value::Bool(true), CompareOp::Gt, &Value::Bool(false)));
        assert!(!compare_values(&Value::Int64(1), CompareOp::Eq, &Value::UInt64(1)));
        assert!(!compare_values(&Value::Null, CompareOp::Ne, &Value::Int64(1)));
    }

    #[test]
    fn test_filter_in_place() {
        let ids = Column::from_vec((0..6).map(NodeId::new).collect());
        let ages: Column<Option<i64>> =
            Column::from_vec(vec![Some(10), Some(40), None, Some(25), Some(50), Some(18)]);
        let indices = Column::new();

        let predicate = Predicate::compare(&ages, CompareOp::Ge, 18i64);
        let mut filter = FilterStep::new(&ids, predicate, &indices)
            .compact(&ids, &ids)
            .compact(&ages, &ages);
        filter.prepare(&ctx()).unwrap();
        filter.execute().unwrap();

        assert_eq!(indices.to_vec(), vec![1, 3, 4, 5]);
        assert_eq!(
            ids.to_vec(),
            vec![NodeId::new(1), NodeId::new(3), NodeId::new(4), NodeId::new(5)]
        );
        assert_eq!(ages.to_vec(), vec![Some(40), Some(25), Some(50), Some(18)]);
        assert!(filter.is_finished());
    }

    #[test]
    fn test_boolean_combinators() {
        let n: Column<u64> = Column::from_vec((0..10).collect());
        let indices = Column::new();
        let predicate = Predicate::compare(&n, CompareOp::Ge, 3u64)
            .and(Predicate::compare(&n, CompareOp::Lt, 7u64))
            .or(Predicate::compare(&n, CompareOp::Eq, 9u64))
            .and(Predicate::compare(&n, CompareOp::Eq, 5u64).negate());

        let mut filter = FilterStep::new(&n, predicate, &indices);
        filter.prepare(&ctx()).unwrap();
        filter.execute().unwrap();
        assert_eq!(indices.to_vec(), vec![3, 4, 6, 9]);
    }

    #[test]
    fn test_regex_and_columns() {
        let names: Column<Option<Arc<str>>> = Column::from_vec(vec![
            Some("Alice".into()),
            Some("Bob".into()),
            None,
            Some("Alfred".into()),
        ]);
        let indices = Column::new();
        let predicate = Predicate::matches(&names, "^Al").unwrap();
        let mut filter = FilterStep::new(&names, predicate, &indices);
        filter.prepare(&ctx()).unwrap();
        filter.execute().unwrap();
        assert_eq!(indices.to_vec(), vec![0, 3]);

        assert!(matches!(
            Predicate::matches(&names, "(unclosed"),
            Err(OperatorError::Pattern(_))
        ));
    }

    #[test]
    fn test_compare_columns() {
        let a: Column<u64> = Column::from_vec(vec![1, 5, 3]);
        let b: Column<u64> = Column::from_vec(vec![2, 4, 3]);
        let indices = Column::new();
        let mut filter =
            FilterStep::new(&a, Predicate::compare_columns(&a, CompareOp::Le, &b), &indices);
        filter.prepare(&ctx()).unwrap();
        filter.execute().unwrap();
        assert_eq!(indices.to_vec(), vec![0, 2]);
    }

    #[test]
    fn test_has_labels() {
        let store = LpgStore::new();
        let nodes = [
            store.create_node(&["Person", "Admin"]),
            store.create_node(&["Person"]),
            store.create_node(&["Admin", "Robot"]),
        ];
        let snapshot = store.snapshot();
        let sets = Column::from_vec(
            nodes
                .iter()
                .map(|&n| snapshot.node_label_set(n).unwrap())
                .collect(),
        );
        let ctx = ExecutionContext::new(snapshot);

        let indices = Column::new();
        let mut filter =
            FilterStep::new(&sets, Predicate::has_labels(&sets, &["Admin"]), &indices);
        filter.prepare(&ctx).unwrap();
        filter.execute().unwrap();
        assert_eq!(indices.to_vec(), vec![0, 2]);

        let mut filter =
            FilterStep::new(&sets, Predicate::has_labels(&sets, &["Ghost"]), &indices);
        filter.prepare(&ctx).unwrap();
        filter.execute().unwrap();
        assert!(indices.is_empty());
    }

    #[test]
    fn test_short_predicate_column() {
        let input: Column<u64> = Column::from_vec(vec![1, 2, 3]);
        let short: Column<u64> = Column::from_vec(vec![1]);
        let mut filter = FilterStep::new(
            &input,
            Predicate::compare(&short, CompareOp::Eq, 1u64),
            &Column::new(),
        );
        filter.prepare(&ctx()).unwrap();
        assert!(matches!(
            filter.execute(),
            Err(OperatorError::ColumnLength { expected: 3, actual: 1 })
        ));
    }

    #[test]
    fn test_compact_type_mismatch() {
        let input: Column<u64> = Column::new();
        let mut filter = FilterStep::new(
            &input,
            Predicate::compare(&input, CompareOp::Eq, 1u64),
            &Column::new(),
        )
        .compact(&input, Column::<NodeId>::new());
        assert!(matches!(
            filter.prepare(&ctx()),
            Err(OperatorError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_compact_rejects_other_column_of_same_logical_type() {
        let input: Column<u64> = Column::new();
        let types: Column<EdgeTypeId> = Column::new();
        let mut filter = FilterStep::new(
            &input,
            Predicate::compare(&input, CompareOp::Eq, 1u64),
            &Column::new(),
        )
        .compact(&input, &types);
        assert!(matches!(
            filter.prepare(&ctx()),
            Err(OperatorError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_describe() {
        let n: Column<u64> = Column::new();
        let filter = FilterStep::new(
            &n,
            Predicate::compare(&n, CompareOp::Gt, 3u64).negate(),
            &Column::new(),
        );
        assert_eq!(filter.describe(), "Filter NOT UINT64 > 3");
    }
}
