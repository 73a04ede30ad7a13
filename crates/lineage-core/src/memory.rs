//! In-memory forest implementing every guard collaborator.
//!
//! `ParentMap` stores `node → parent` exactly as given. It does not validate
//! inserts, which is what lets tests and benches build deliberately corrupt
//! fixtures; writes that must stay acyclic go through
//! [`set_parent`](crate::guard::set_parent).

use std::collections::BTreeMap;

use crate::guard::{ChildLookup, ParentLookup, ParentWriter};

/// Node → parent map with deterministic (sorted) iteration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParentMap {
    parents: BTreeMap<String, Option<String>>,
}

impl ParentMap {
    /// Create an empty forest.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite `node_id` with the given parent.
    pub fn insert(&mut self, node_id: &str, parent_id: Option<&str>) {
        self.parents
            .insert(node_id.to_string(), parent_id.map(str::to_string));
    }

    /// Remove `node_id`, returning its parent link if it was present.
    pub fn remove(&mut self, node_id: &str) -> Option<Option<String>> {
        self.parents.remove(node_id)
    }

    #[must_use]
    pub fn contains(&self, node_id: &str) -> bool {
        self.parents.contains_key(node_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Iterate `(node, parent)` pairs in node-ID order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.parents
            .iter()
            .map(|(node, parent)| (node.as_str(), parent.as_deref()))
    }
}

impl FromIterator<(String, Option<String>)> for ParentMap {
    fn from_iter<T: IntoIterator<Item = (String, Option<String>)>>(iter: T) -> Self {
        Self {
            parents: iter.into_iter().collect(),
        }
    }
}

impl ParentLookup for ParentMap {
    fn parent_of(&self, node_id: &str) -> anyhow::Result<Option<String>> {
        Ok(self.parents.get(node_id).cloned().flatten())
    }
}

impl ChildLookup for ParentMap {
    /// Linear scan; fine for fixtures, not for large collections.
    fn children_of(&self, node_id: &str) -> anyhow::Result<Vec<String>> {
        Ok(self
            .parents
            .iter()
            .filter(|(_, parent)| parent.as_deref() == Some(node_id))
            .map(|(node, _)| node.clone())
            .collect())
    }
}

impl ParentWriter for ParentMap {
    fn apply_parent(&mut self, node_id: &str, parent_id: Option<&str>) -> anyhow::Result<()> {
        self.insert(node_id, parent_id);
        Ok(())
    }
}
