//! Label sets and their interning table.

use smallvec::SmallVec;
use stepflow_common::types::{LabelId, LabelSetId};
use stepflow_common::utils::hash::FxHashMap;

/// A sorted, duplicate-free set of labels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct LabelSet {
    labels: SmallVec<[LabelId; 4]>,
}

impl LabelSet {
    /// Creates an empty label set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a label, keeping the set sorted.
    pub fn insert(&mut self, label: LabelId) {
        if let Err(pos) = self.labels.binary_search(&label) {
            self.labels.insert(pos, label);
        }
    }

    /// Returns true if the set contains `label`.
    #[must_use]
    pub fn contains(&self, label: LabelId) -> bool {
        self.labels.binary_search(&label).is_ok()
    }

    /// Returns true if every label of `other` is in this set.
    #[must_use]
    pub fn is_superset_of(&self, other: &LabelSet) -> bool {
        other.labels.iter().all(|l| self.contains(*l))
    }

    /// Iterates over the labels in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = LabelId> + '_ {
        self.labels.iter().copied()
    }

    /// Returns the number of labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns true if the set has no labels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl FromIterator<LabelId> for LabelSet {
    fn from_iter<I: IntoIterator<Item = LabelId>>(iter: I) -> Self {
        let mut set = LabelSet::new();
        for label in iter {
            set.insert(label);
        }
        set
    }
}

/// Interning table giving every distinct label set a dense id.
#[derive(Debug, Clone, Default)]
pub struct LabelSetIndex {
    sets: Vec<LabelSet>,
    ids: FxHashMap<LabelSet, LabelSetId>,
}

impl LabelSetIndex {
    /// Returns the id of `set`, interning it on first sight.
    pub fn intern(&mut self, set: &LabelSet) -> LabelSetId {
        if let Some(&id) = self.ids.get(set) {
            return id;
        }
        let id = LabelSetId::new(self.sets.len() as u32);
        self.sets.push(set.clone());
        self.ids.insert(set.clone(), id);
        id
    }

    /// Returns the label set with the given id.
    #[must_use]
    pub fn get(&self, id: LabelSetId) -> Option<&LabelSet> {
        self.sets.get(id.as_raw() as usize)
    }

    /// Returns the id of an already interned set.
    #[must_use]
    pub fn lookup(&self, set: &LabelSet) -> Option<LabelSetId> {
        self.ids.get(set).copied()
    }

    /// Returns the number of distinct label sets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Returns true if nothing has been interned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}
