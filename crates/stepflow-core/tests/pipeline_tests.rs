//! End-to-end pipeline runs against an in-memory store.

mod common;

use std::sync::Arc;

use common::{add_chunk_sink, init_tracing, item_store, raw_ids};
use parking_lot::Mutex;
use stepflow_common::types::{EdgeId, LabelSetId, NodeId};
use stepflow_core::execution::operators::{
    CompareOp, FilterStep, LambdaOperation, MaterializeStep, Predicate, Projection, SharedBuffer,
};
use stepflow_core::execution::{CancellationToken, ColumnArena, ConfigurationError, OutputBlock};
use stepflow_core::iterators::{EdgeScanOutput, EdgeWriteInfo};
use stepflow_core::{
    Column, ExecutionContext, ExecutionError, Executor, GraphCatalog, LpgStore, Pipeline,
    StepKind,
};

#[test]
fn test_chunk_size_four_over_ten_nodes() {
    init_tracing();
    let store = item_store(10);
    let ctx = ExecutionContext::new(store.snapshot()).with_chunk_size(4);

    let ids = Column::new();
    let mut pipeline = Pipeline::new();
    pipeline.add_start();
    pipeline.add_scan_nodes(&ids);
    let chunks = add_chunk_sink(&mut pipeline, &ids);
    pipeline.add_end();

    let stats = Executor::new().run(&ctx, &mut pipeline).unwrap();
    assert_eq!(stats.executions(1), 3);

    let chunks = chunks.lock();
    let sizes: Vec<usize> = chunks.iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![4, 4, 2]);
    assert_eq!(raw_ids(&chunks), (0..10).collect::<Vec<_>>());
}

#[test]
fn test_scan_filter_keeps_matching_rows_in_order() {
    init_tracing();
    let store = item_store(10);
    let ctx = ExecutionContext::new(store.snapshot()).with_chunk_size(4);

    let ids = Column::new();
    let ranks: Column<Option<i64>> = Column::new();
    let indices = Column::new();

    let mut pipeline = Pipeline::new();
    pipeline.add_start();
    pipeline.add_scan_nodes(&ids);
    pipeline.add_get_node_property(&ids, "rank", &ranks);
    let predicate = Predicate::compare(&ranks, CompareOp::Ge, 3i64)
        .and(Predicate::compare(&ranks, CompareOp::Lt, 7i64));
    pipeline.add_filter(
        FilterStep::new(&ids, predicate, &indices)
            .compact(&ids, &ids)
            .compact(&ranks, &ranks),
    );
    let chunks = add_chunk_sink(&mut pipeline, &ids);
    pipeline.add_end();

    Executor::new().run(&ctx, &mut pipeline).unwrap();

    let chunks = chunks.lock();
    // The last scan chunk has no survivors but still flows downstream.
    assert_eq!(chunks.len(), 3);
    assert_eq!(raw_ids(&chunks), vec![3, 4, 5, 6]);
}

#[test]
fn test_lambda_sink_sees_every_row_once() {
    let store = item_store(37);
    let ctx = ExecutionContext::new(store.snapshot()).with_chunk_size(5);

    let ids = Column::new();
    let mut pipeline = Pipeline::new();
    pipeline.add_start();
    pipeline.add_scan_nodes(&ids);
    let chunks = add_chunk_sink(&mut pipeline, &ids);
    pipeline.add_end();

    Executor::new().run(&ctx, &mut pipeline).unwrap();
    assert_eq!(raw_ids(&chunks.lock()), (0..37).collect::<Vec<_>>());
}

#[test]
fn test_invalid_shapes_prepare_nothing() {
    let ctx = ExecutionContext::new(LpgStore::new().snapshot());

    let mut start_only = Pipeline::new();
    start_only.add_start();
    assert!(matches!(
        Executor::new().run(&ctx, &mut start_only),
        Err(ExecutionError::Configuration(ConfigurationError::TooShort { len: 1 }))
    ));

    let prepared = Arc::new(Mutex::new(0));
    let build = |first_is_start: bool| {
        let counter = Arc::clone(&prepared);
        let mut pipeline = Pipeline::new();
        if first_is_start {
            pipeline.add_start();
        } else {
            pipeline.add_end();
        }
        pipeline.add_lambda(move |_| {
            *counter.lock() += 1;
            Ok(())
        });
        if first_is_start {
            pipeline.add_start();
        } else {
            pipeline.add_end();
        }
        pipeline
    };

    let mut bad_first = build(false);
    assert!(matches!(
        Executor::new().run(&ctx, &mut bad_first),
        Err(ExecutionError::Configuration(ConfigurationError::MissingStart {
            found: StepKind::End
        }))
    ));

    let mut bad_last = build(true);
    assert!(matches!(
        Executor::new().run(&ctx, &mut bad_last),
        Err(ExecutionError::Configuration(ConfigurationError::MissingEnd {
            found: StepKind::Start
        }))
    ));

    assert_eq!(*prepared.lock(), 0);
}

#[test]
fn test_materialize_matches_direct_scan() {
    let store = LpgStore::new();
    let mut expected = Vec::new();
    for i in 0..25 {
        let labels: &[&str] = if i % 3 == 0 { &["Item", "Hot"] } else { &["Item"] };
        let id = store.create_node(labels);
        if i % 3 == 0 {
            expected.push(id);
        }
    }
    let ctx = ExecutionContext::new(store.snapshot()).with_chunk_size(3);

    let ids = Column::new();
    let all: Column<NodeId> = Column::new();
    let mut pipeline = Pipeline::new();
    pipeline.add_start();
    pipeline.add_scan_nodes_by_label(&["Hot"], &ids);
    pipeline.add_materialize(MaterializeStep::new().column(&ids, &all));
    pipeline.add_end();

    Executor::new().run(&ctx, &mut pipeline).unwrap();
    assert_eq!(all.to_vec(), expected);

    // A second run starts from empty result columns.
    Executor::new().run(&ctx, &mut pipeline).unwrap();
    assert_eq!(all.len(), expected.len());
}

#[test]
fn test_json_encoder_writes_one_line_per_row() {
    let store = LpgStore::new();
    for name in ["Ada", "Grace", "Edsger", "Barbara", "Tony"] {
        store.create_node_with_props(&["Person"], [("name", name)]);
    }
    let ctx = ExecutionContext::new(store.snapshot()).with_chunk_size(2);

    let ids = Column::new();
    let names = Column::new();
    let buffer = SharedBuffer::new();

    let mut pipeline = Pipeline::new();
    pipeline.add_start();
    pipeline.add_scan_nodes(&ids);
    pipeline.add_get_node_property::<Arc<str>>(&ids, "name", &names);
    pipeline.add_json_encoder(
        OutputBlock::new()
            .with_column("id", &ids)
            .with_column("name", &names),
        buffer.clone(),
    );
    pipeline.add_end();

    let stats = Executor::new().run(&ctx, &mut pipeline).unwrap();
    assert_eq!(stats.executions(3), 3);

    let text = buffer.to_string_lossy();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], r#"{"id":0,"name":"Ada"}"#);
    assert_eq!(lines[4], r#"{"id":4,"name":"Tony"}"#);
}

#[test]
fn test_expand_spans_input_windows() {
    let store = LpgStore::new();
    let nodes: Vec<NodeId> = (0..4).map(|_| store.create_node(&["Stop"])).collect();
    for (i, &src) in nodes.iter().enumerate() {
        let dst = nodes[(i + 1) % nodes.len()];
        for _ in 0..3 {
            store.create_edge(src, dst, "ROUTE").unwrap();
        }
    }
    let ctx = ExecutionContext::new(store.snapshot()).with_chunk_size(2);

    let ids = Column::new();
    let edges = Column::new();
    let targets = Column::new();
    let all_edges: Column<EdgeId> = Column::new();
    let all_targets: Column<NodeId> = Column::new();

    let mut pipeline = Pipeline::new();
    pipeline.add_start();
    pipeline.add_scan_nodes(&ids);
    pipeline.add_get_out_edges(&ids, EdgeWriteInfo::new(&edges).with_targets(&targets));
    pipeline.add_materialize(
        MaterializeStep::new()
            .column(&edges, &all_edges)
            .column(&targets, &all_targets),
    );
    pipeline.add_end();

    let stats = Executor::new().run(&ctx, &mut pipeline).unwrap();
    // Two input windows of two nodes, six edges each, two edges per chunk.
    assert_eq!(stats.executions(1), 2);
    assert_eq!(stats.resets(2), 2);
    assert_eq!(stats.executions(2), 6);

    assert_eq!(all_edges.len(), 12);
    let expected_targets: Vec<NodeId> = [1, 2, 3, 0]
        .iter()
        .flat_map(|&i| std::iter::repeat_n(nodes[i], 3))
        .collect();
    assert_eq!(all_targets.to_vec(), expected_targets);
}

#[test]
fn test_expand_invalid_node_yields_nothing() {
    let store = LpgStore::new();
    let a = store.create_node(&["Stop"]);
    store.create_edge(a, a, "LOOP").unwrap();
    let ctx = ExecutionContext::new(store.snapshot());

    let ids = Column::from_vec(vec![NodeId::INVALID]);
    let edges: Column<EdgeId> = Column::new();
    let mut pipeline = Pipeline::new();
    pipeline.add_start();
    pipeline.add_get_out_edges(&ids, EdgeWriteInfo::new(&edges));
    pipeline.add_end();

    let stats = Executor::new().run(&ctx, &mut pipeline).unwrap();
    assert_eq!(stats.executions(1), 1);
    assert!(edges.is_empty());
}

#[test]
fn test_count_accumulates_across_chunks() {
    let store = item_store(10);
    let ctx = ExecutionContext::new(store.snapshot()).with_chunk_size(3);

    let ids = Column::new();
    let total = Column::new();
    let mut pipeline = Pipeline::new();
    pipeline.add_start();
    pipeline.add_scan_nodes(&ids);
    pipeline.add_count(&ids, &total);
    pipeline.add_end();

    let stats = Executor::new().run(&ctx, &mut pipeline).unwrap();
    assert_eq!(stats.executions(2), 4);
    assert_eq!(total.to_vec(), vec![10]);
}

#[test]
fn test_cancellation_stops_the_run() {
    let store = item_store(100);
    let token = CancellationToken::new();
    let ctx = ExecutionContext::new(store.snapshot())
        .with_chunk_size(10)
        .with_cancellation(token.clone());

    let calls = Arc::new(Mutex::new(0));
    let counter = Arc::clone(&calls);
    let mut pipeline = Pipeline::new();
    pipeline.add_start();
    pipeline.add_scan_nodes(&Column::new());
    pipeline.add_lambda(move |op| {
        if op == LambdaOperation::Execute {
            let mut calls = counter.lock();
            *calls += 1;
            if *calls == 2 {
                token.cancel();
            }
        }
        Ok(())
    });
    pipeline.add_end();

    assert!(matches!(
        Executor::new().run(&ctx, &mut pipeline),
        Err(ExecutionError::Cancelled)
    ));
    assert_eq!(*calls.lock(), 2);
}

#[test]
fn test_graph_lifecycle() {
    let catalog = Arc::new(GraphCatalog::new());
    let ctx = ExecutionContext::new(LpgStore::new().snapshot()).with_catalog(Arc::clone(&catalog));

    let names = Column::new();
    let mut pipeline = Pipeline::new();
    pipeline.add_start();
    pipeline.add_create_graph("roads");
    pipeline.add_create_graph("rails");
    pipeline.add_list_graphs(&names);
    pipeline.add_end();

    Executor::new().run(&ctx, &mut pipeline).unwrap();
    assert_eq!(names.to_vec(), vec!["roads".to_string(), "rails".to_string()]);
    assert_eq!(catalog.len(), 2);

    // Creating the same graphs again fails on the first step.
    let err = Executor::new().run(&ctx, &mut pipeline).unwrap_err();
    assert!(matches!(
        err,
        ExecutionError::Operator {
            step: 1,
            kind: StepKind::CreateGraph,
            ..
        }
    ));
}

#[test]
fn test_arena_columns_through_label_filter() {
    let store = LpgStore::new();
    let labels: [&[&str]; 4] = [
        &["Person"],
        &["Person", "Admin"],
        &["Admin"],
        &["Admin", "Person"],
    ];
    for (i, labels) in labels.iter().enumerate() {
        store.create_node_with_props(labels, [("name", format!("n{i}"))]);
    }
    let ctx = ExecutionContext::new(store.snapshot()).with_chunk_size(3);

    let mut arena = ColumnArena::new();
    let ids = arena.alloc::<NodeId>();
    let label_sets = arena.alloc::<LabelSetId>();
    let indices = arena.alloc::<usize>();
    let names = arena.alloc::<Option<Arc<str>>>();
    let admins = arena.alloc::<Option<Arc<str>>>();
    let result = arena.alloc::<Option<Arc<str>>>();

    let mut pipeline = Pipeline::new();
    pipeline.add_start();
    pipeline.add_scan_nodes(&ids);
    pipeline.add_get_node_property(&ids, "name", &names);
    pipeline.add_get_label_set_id(&ids, &label_sets);
    pipeline.add_filter(FilterStep::new(
        &ids,
        Predicate::has_labels(&label_sets, &["Person", "Admin"]),
        &indices,
    ));
    pipeline.add_transform(vec![Projection::gather(&names, &indices, &admins)]);
    pipeline.add_materialize(MaterializeStep::new().column(&admins, &result));
    pipeline.add_end();

    Executor::new().run(&ctx, &mut pipeline).unwrap();
    let expected: Vec<Option<Arc<str>>> = vec![Some("n1".into()), Some("n3".into())];
    assert_eq!(result.to_vec(), expected);

    assert_eq!(arena.len(), 6);
    arena.clear_all();
    assert!(arena.iter().all(|column| column.is_empty()));
}

#[test]
fn test_edge_scan_with_column_predicates() {
    let store = LpgStore::new();
    let n: Vec<NodeId> = (0..3).map(|_| store.create_node(&[])).collect();
    let weighted: [(usize, usize, f64); 4] =
        [(0, 1, 1.5), (1, 0, 0.5), (1, 2, 2.0), (2, 2, 3.0)];
    let mut edge_ids = Vec::new();
    for (src, dst, weight) in weighted {
        let id = store
            .create_edge_with_props(n[src], n[dst], "ROUTE", [("weight", weight)])
            .unwrap();
        edge_ids.push(id);
    }
    let ctx = ExecutionContext::new(store.snapshot()).with_chunk_size(2);

    let edges = Column::new();
    let sources = Column::new();
    let targets = Column::new();
    let weights: Column<Option<f64>> = Column::new();
    let indices = Column::new();
    let kept: Column<EdgeId> = Column::new();

    let mut pipeline = Pipeline::new();
    pipeline.add_start();
    pipeline.add_scan_edges(
        EdgeScanOutput::new(&edges)
            .with_sources(&sources)
            .with_targets(&targets),
    );
    pipeline.add_get_edge_property(&edges, "weight", &weights);
    let forward_and_heavy = Predicate::compare_columns(&sources, CompareOp::Lt, &targets)
        .and(Predicate::compare(&weights, CompareOp::Gt, 1.0f64));
    pipeline.add_filter(
        FilterStep::new(&edges, forward_and_heavy, &indices).compact(&edges, &edges),
    );
    pipeline.add_materialize(MaterializeStep::new().column(&edges, &kept));
    pipeline.add_end();

    let stats = Executor::new().run(&ctx, &mut pipeline).unwrap();
    assert_eq!(stats.executions(1), 2);
    assert_eq!(kept.to_vec(), vec![edge_ids[0], edge_ids[2]]);
}

#[test]
fn test_regex_filter_feeds_json_and_debug_dump() {
    init_tracing();
    let store = LpgStore::new();
    for name in ["Alma", "Boris", "Anke", "Chen"] {
        store.create_node_with_props(&["Person"], [("name", name)]);
    }
    let ctx = ExecutionContext::new(store.snapshot()).with_chunk_size(4);

    let ids = Column::new();
    let names: Column<Option<Arc<str>>> = Column::new();
    let indices = Column::new();
    let buffer = SharedBuffer::new();
    let block = OutputBlock::new().with_column("name", &names);

    let mut pipeline = Pipeline::new();
    pipeline.add_start();
    pipeline.add_scan_nodes(&ids);
    pipeline.add_get_node_property(&ids, "name", &names);
    pipeline.add_filter(
        FilterStep::new(&names, Predicate::matches(&names, "^A").unwrap(), &indices)
            .compact(&names, &names),
    );
    pipeline.add_debug_dump(block.clone());
    pipeline.add_json_encoder(block, buffer.clone());
    pipeline.add_end();

    Executor::new().run(&ctx, &mut pipeline).unwrap();
    assert_eq!(
        buffer.to_string_lossy(),
        "{\"name\":\"Alma\"}\n{\"name\":\"Anke\"}\n"
    );
}
