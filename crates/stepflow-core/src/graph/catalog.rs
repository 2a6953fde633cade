//! Named graphs.
//!
//! The catalog is what graph lifecycle steps (create, list) operate on.
//! Graph names are kept in creation order.

use crate::graph::lpg::LpgStore;
use indexmap::IndexMap;
use parking_lot::RwLock;
use stepflow_common::utils::error::{Error, Result};
use std::fmt;
use std::sync::Arc;

/// Registry of named graph stores.
#[derive(Default)]
pub struct GraphCatalog {
    graphs: RwLock<IndexMap<String, Arc<LpgStore>>>,
}

impl GraphCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty graph named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyExists`] if the name is taken.
    pub fn create_graph(&self, name: &str) -> Result<Arc<LpgStore>> {
        let mut graphs = self.graphs.write();
        if graphs.contains_key(name) {
            return Err(Error::AlreadyExists(format!("graph '{name}'")));
        }
        let store = Arc::new(LpgStore::new());
        graphs.insert(name.to_string(), Arc::clone(&store));
        tracing::info!(graph = name, "graph created");
        Ok(store)
    }

    /// Registers an existing store under `name`.
    pub fn register(&self, name: &str, store: Arc<LpgStore>) -> Result<()> {
        let mut graphs = self.graphs.write();
        if graphs.contains_key(name) {
            return Err(Error::AlreadyExists(format!("graph '{name}'")));
        }
        graphs.insert(name.to_string(), store);
        Ok(())
    }

    /// Returns the store named `name`.
    pub fn graph(&self, name: &str) -> Result<Arc<LpgStore>> {
        self.graphs
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("graph '{name}'")))
    }

    /// Returns all graph names in creation order.
    #[must_use]
    pub fn graph_names(&self) -> Vec<String> {
        self.graphs.read().keys().cloned().collect()
    }

    /// Returns the number of graphs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.graphs.read().len()
    }

    /// Returns true if no graph is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graphs.read().is_empty()
    }
}

impl fmt::Debug for GraphCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphCatalog")
            .field("graphs", &self.graph_names())
            .finish()
    }
}
