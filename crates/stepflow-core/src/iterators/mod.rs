//! Storage cursors used by the scan and expand steps.
//!
//! A chunk writer walks some part of a [`GraphSnapshot`](crate::graph::lpg::GraphSnapshot)
//! and writes at most `max_rows` rows per call into the columns it was
//! bound to. Writers are created once when their step is prepared and
//! rewound with [`ChunkWriter::reset`] on every activation.

mod get_edges;
mod properties;
mod scan_edges;
mod scan_nodes;

pub use get_edges::{EdgeWriteInfo, GetOutEdgesChunkWriter};
pub use properties::{PropertyReader, SnapshotEntity};
pub use scan_edges::{EdgeScanOutput, ScanEdgesChunkWriter};
pub use scan_nodes::ScanNodesChunkWriter;

/// A resumable cursor writing rows in bounded chunks.
pub trait ChunkWriter: Send {
    /// Rewinds to the first row of the current input.
    fn reset(&mut self);

    /// Returns true while rows remain to be written.
    fn is_valid(&self) -> bool;

    /// Replaces the output columns with the next `max_rows` rows at most.
    ///
    /// Returns the number of rows written.
    fn fill(&mut self, max_rows: usize) -> usize;
}
