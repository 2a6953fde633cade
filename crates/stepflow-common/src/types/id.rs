//! Identifier newtypes.
//!
//! Every identifier wraps a plain integer. The maximum value of the
//! underlying integer is reserved as the invalid sentinel.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $inner:ty, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name($inner);

        impl $name {
            /// The invalid identifier.
            pub const INVALID: Self = Self(<$inner>::MAX);

            /// Creates a new identifier from its raw value.
            #[must_use]
            pub const fn new(raw: $inner) -> Self {
                Self(raw)
            }

            /// Returns the raw value.
            #[must_use]
            pub const fn as_raw(self) -> $inner {
                self.0
            }

            /// Returns true unless this is [`Self::INVALID`].
            #[must_use]
            pub const fn is_valid(self) -> bool {
                self.0 != <$inner>::MAX
            }
        }

        impl From<$inner> for $name {
            fn from(raw: $inner) -> Self {
                Self(raw)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

define_id!(
    /// Identifier of a node.
    NodeId, u64, "n"
);
define_id!(
    /// Identifier of an edge.
    EdgeId, u64, "e"
);
define_id!(
    /// Identifier of a label.
    LabelId, u32, "l"
);
define_id!(
    /// Identifier of an interned set of labels.
    ///
    /// Nodes sharing exactly the same labels share the same label set.
    LabelSetId, u32, "ls"
);
define_id!(
    /// Identifier of an edge type.
    EdgeTypeId, u32, "t"
);
define_id!(
    /// Identifier of a snapshot epoch.
    EpochId, u64, "epoch"
);

impl NodeId {
    /// Returns the identifier as a dense index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl EdgeId {
    /// Returns the identifier as a dense index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}
