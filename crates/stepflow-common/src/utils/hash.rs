//! Fast hash maps.
//!
//! Keys in the engine are small integers and interned strings, so a fast
//! non-cryptographic hasher is used everywhere.

use std::hash::BuildHasherDefault;

/// Build hasher used by every map in Stepflow.
pub type FxBuildHasher = BuildHasherDefault<ahash::AHasher>;

/// A `hashbrown` map with the fast hasher.
pub type FxHashMap<K, V> = hashbrown::HashMap<K, V, FxBuildHasher>;
