//! Ordered sets of operation identifiers.
//!
//! [`IdSet`] backs both the set of operations a replica has applied and the
//! presence set every tree node carries. The ordered representation keeps
//! serialized snapshots stable across replicas.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::operation::OpId;

/// A set of operation identifiers with a "missing dependencies" query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdSet {
    ids: BTreeSet<OpId>,
}

impl IdSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an ID. Returns false if it was already present.
    pub fn add(&mut self, id: OpId) -> bool {
        self.ids.insert(id)
    }

    /// Removes an ID. Returns false if it was not present.
    pub fn remove(&mut self, id: &OpId) -> bool {
        self.ids.remove(id)
    }

    pub fn exists(&self, id: &OpId) -> bool {
        self.ids.contains(id)
    }

    /// Returns every candidate not in the set, in candidate order.
    ///
    /// An empty result means every candidate dependency is satisfied.
    pub fn diff<'a>(&self, candidates: impl IntoIterator<Item = &'a OpId>) -> Vec<OpId> {
        candidates
            .into_iter()
            .filter(|id| !self.exists(id))
            .copied()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Iterates the IDs in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = &OpId> {
        self.ids.iter()
    }
}

impl FromIterator<OpId> for IdSet {
    fn from_iter<T: IntoIterator<Item = OpId>>(iter: T) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

impl Extend<OpId> for IdSet {
    fn extend<T: IntoIterator<Item = OpId>>(&mut self, iter: T) {
        self.ids.extend(iter);
    }
}

impl<'a> IntoIterator for &'a IdSet {
    type Item = &'a OpId;
    type IntoIter = std::collections::btree_set::Iter<'a, OpId>;

    fn into_iter(self) -> Self::IntoIter {
        self.ids.iter()
    }
}
