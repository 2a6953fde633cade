//! Per-run execution context.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::graph::GraphCatalog;
use crate::graph::lpg::GraphSnapshot;

use super::config::ExecutionConfig;

/// Flag shared between a running pipeline and whoever may cancel it.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Every clone observes it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Returns true once cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Everything a step may look at during a run.
///
/// The context is read-only for the duration of a run, so one context can
/// back several concurrent runs.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    snapshot: Arc<GraphSnapshot>,
    config: ExecutionConfig,
    catalog: Option<Arc<GraphCatalog>>,
    cancellation: Option<CancellationToken>,
}

impl ExecutionContext {
    /// Creates a context over `snapshot` with the default configuration.
    #[must_use]
    pub fn new(snapshot: Arc<GraphSnapshot>) -> Self {
        Self {
            snapshot,
            config: ExecutionConfig::default(),
            catalog: None,
            cancellation: None,
        }
    }

    /// Sets the configuration.
    #[must_use]
    pub fn with_config(mut self, config: ExecutionConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the chunk size.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.config.chunk_size = chunk_size;
        self
    }

    /// Attaches a graph catalog for lifecycle steps.
    #[must_use]
    pub fn with_catalog(mut self, catalog: Arc<GraphCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Attaches a cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Returns the graph snapshot.
    #[must_use]
    pub fn snapshot(&self) -> &Arc<GraphSnapshot> {
        &self.snapshot
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    /// Returns the chunk size.
    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.config.chunk_size
    }

    /// Returns the graph catalog, if any.
    #[must_use]
    pub fn catalog(&self) -> Option<&Arc<GraphCatalog>> {
        self.catalog.as_ref()
    }

    /// Returns true if the run has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }
}
