//! Shared helpers for the integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use parking_lot::Mutex;
use stepflow_common::types::{NodeId, Value};
use stepflow_core::execution::operators::LambdaOperation;
use stepflow_core::{Column, LpgStore, Pipeline};

/// Installs a fmt subscriber when `STEPFLOW_LOG` is set.
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_tracing() {
    if std::env::var_os("STEPFLOW_LOG").is_some() {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::TRACE)
            .try_init();
    }
}

/// Creates a store with `n` nodes labeled `Item` and an integer `rank`
/// property equal to the node's position.
pub fn item_store(n: usize) -> LpgStore {
    let store = LpgStore::new();
    for i in 0..n {
        store.create_node_with_props(&["Item"], [("rank", Value::Int64(i as i64))]);
    }
    store
}

/// Appends a lambda that records every chunk of `column`.
pub fn add_chunk_sink<T>(pipeline: &mut Pipeline, column: &Column<T>) -> Arc<Mutex<Vec<Vec<T>>>>
where
    T: Clone + Send + Sync + 'static,
{
    let chunks = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&chunks);
    let column = column.clone();
    pipeline.add_lambda(move |op| {
        if op == LambdaOperation::Execute {
            sink.lock().push(column.to_vec());
        }
        Ok(())
    });
    chunks
}

/// Flattens recorded chunks of node ids into raw ids.
pub fn raw_ids(chunks: &[Vec<NodeId>]) -> Vec<u64> {
    chunks.iter().flatten().map(|id| id.as_raw()).collect()
}
