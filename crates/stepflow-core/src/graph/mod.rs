//! Graph storage used by the execution engine.
//!
//! The engine only reads [`GraphSnapshot`](lpg::GraphSnapshot)s. The store and
//! the catalog exist so pipelines have something real to scan and so graph
//! lifecycle steps have somewhere to register graphs.

pub mod catalog;
pub mod lpg;

pub use catalog::GraphCatalog;
