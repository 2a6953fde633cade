//! Labeled property graph storage.
//!
//! - [`LpgStore`] - the mutable store
//! - [`GraphSnapshot`] - immutable, versioned view read by pipelines
//! - [`LabelSet`] - sorted label sets and their interning table
//! - [`PropertyStorage`] - copy-on-write property columns

mod label_set;
mod property;
mod snapshot;
mod store;

pub use label_set::{LabelSet, LabelSetIndex};
pub use property::{EntityId, FrozenProperties, PropertyColumn, PropertyStorage};
pub use snapshot::GraphSnapshot;
pub use store::{EdgeRecord, LpgStore, LpgStoreConfig};
