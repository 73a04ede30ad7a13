//! Read-path traversals: ancestor chains and descendant subtrees.
//!
//! Both traversals are lazy iterators that call their collaborator once per
//! step, only when the next element is requested. Both keep a visited set,
//! so neither ever yields the same node twice even over corrupted data.
//!
//! - [`Ancestors`] walks parent links upward. It fails with
//!   [`HierarchyError::CorruptHierarchy`] when it revisits a node or takes
//!   more than `max_depth` steps without reaching a root.
//! - [`Descendants`] walks child links breadth-first and silently skips
//!   nodes it has already yielded.
//!
//! After yielding an error, both iterators are fused and return `None`.

#![allow(clippy::module_name_repetitions, clippy::missing_const_for_fn)]

use anyhow::Context as _;
use std::collections::{HashSet, VecDeque};
use tracing::{debug, warn};

use super::lookup::{ChildLookup, ParentLookup};
use crate::error::{CorruptionKind, HierarchyError};

/// Step bound used by [`ancestors`] when the caller does not supply one.
///
/// Callers that know the size of the collection should pass it instead.
pub const DEFAULT_MAX_DEPTH: usize = 10_000;

// ---------------------------------------------------------------------------
// Ancestors
// ---------------------------------------------------------------------------

/// Lazy iterator over the ancestors of a node, immediate parent first.
///
/// Created by [`ancestors`].
#[derive(Debug)]
pub struct Ancestors<'a, L: ?Sized> {
    lookup: &'a L,
    start: String,
    cursor: String,
    visited: HashSet<String>,
    max_depth: usize,
    steps: usize,
    finished: bool,
}

/// Enumerate the ancestors of `node_id` from immediate parent up to the
/// root, in parent-then-grandparent order.
///
/// The sequence is empty if `node_id` is a root (or unknown to `lookup`).
/// At most `max_depth` ancestors are produced; `None` uses
/// [`DEFAULT_MAX_DEPTH`].
///
/// ```
/// use lineage_core::guard::ancestors;
/// use lineage_core::memory::ParentMap;
///
/// let mut map = ParentMap::new();
/// map.insert("C", None);
/// map.insert("B", Some("C"));
/// map.insert("A", Some("B"));
///
/// let chain: Vec<String> = ancestors("A", &map, None)
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(chain, vec!["B", "C"]);
/// ```
pub fn ancestors<'a, L>(node_id: &str, lookup: &'a L, max_depth: Option<usize>) -> Ancestors<'a, L>
where
    L: ParentLookup + ?Sized,
{
    let mut visited = HashSet::new();
    visited.insert(node_id.to_string());
    Ancestors {
        lookup,
        start: node_id.to_string(),
        cursor: node_id.to_string(),
        visited,
        max_depth: max_depth.unwrap_or(DEFAULT_MAX_DEPTH),
        steps: 0,
        finished: false,
    }
}

impl<L> Ancestors<'_, L>
where
    L: ParentLookup + ?Sized,
{
    /// Number of ancestors produced so far.
    #[must_use]
    pub const fn steps(&self) -> usize {
        self.steps
    }

    fn corrupt(&mut self, reason: CorruptionKind) -> HierarchyError {
        self.finished = true;
        warn!(
            node_id = %self.start,
            at = %self.cursor,
            steps = self.steps,
            %reason,
            "ancestor walk aborted"
        );
        HierarchyError::CorruptHierarchy {
            node_id: self.start.clone(),
            visited: self.steps,
            reason,
        }
    }
}

impl<L> Iterator for Ancestors<'_, L>
where
    L: ParentLookup + ?Sized,
{
    type Item = Result<String, HierarchyError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let parent = match self
            .lookup
            .parent_of(&self.cursor)
            .with_context(|| format!("lookup parent of '{}'", self.cursor))
        {
            Ok(parent) => parent,
            Err(e) => {
                self.finished = true;
                return Some(Err(e.into()));
            }
        };

        let Some(parent) = parent else {
            self.finished = true;
            debug!(node_id = %self.start, depth = self.steps, "reached root");
            return None;
        };

        if self.steps >= self.max_depth {
            let max_depth = self.max_depth;
            return Some(Err(self.corrupt(CorruptionKind::DepthExceeded { max_depth })));
        }
        if !self.visited.insert(parent.clone()) {
            self.cursor = parent;
            return Some(Err(self.corrupt(CorruptionKind::Revisited)));
        }

        self.steps += 1;
        self.cursor.clone_from(&parent);
        Some(Ok(parent))
    }
}

impl<L> std::iter::FusedIterator for Ancestors<'_, L> where L: ParentLookup + ?Sized {}

// ---------------------------------------------------------------------------
// Descendants
// ---------------------------------------------------------------------------

/// Lazy breadth-first iterator over the descendants of a node.
///
/// Created by [`descendants`].
#[derive(Debug)]
pub struct Descendants<'a, C: ?Sized> {
    lookup: &'a C,
    /// Nodes whose children have not been fetched yet.
    frontier: VecDeque<String>,
    /// Discovered nodes waiting to be yielded.
    ready: VecDeque<String>,
    visited: HashSet<String>,
    finished: bool,
}

/// Enumerate every node whose ancestor chain includes `node_id`, breadth
/// first, excluding `node_id` itself.
///
/// Children are yielded in the order `lookup` returns them. A node reachable
/// along more than one path (inconsistent store) is yielded once.
pub fn descendants<'a, C>(node_id: &str, lookup: &'a C) -> Descendants<'a, C>
where
    C: ChildLookup + ?Sized,
{
    let mut visited = HashSet::new();
    visited.insert(node_id.to_string());
    Descendants {
        lookup,
        frontier: VecDeque::from([node_id.to_string()]),
        ready: VecDeque::new(),
        visited,
        finished: false,
    }
}

impl<C> Iterator for Descendants<'_, C>
where
    C: ChildLookup + ?Sized,
{
    type Item = Result<String, HierarchyError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        while self.ready.is_empty() {
            let Some(current) = self.frontier.pop_front() else {
                self.finished = true;
                return None;
            };

            let children = match self
                .lookup
                .children_of(&current)
                .with_context(|| format!("lookup children of '{current}'"))
            {
                Ok(children) => children,
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e.into()));
                }
            };

            for child in children {
                if self.visited.insert(child.clone()) {
                    self.ready.push_back(child);
                } else {
                    debug!(parent = %current, child = %child, "skipping already visited node");
                }
            }
        }

        let next = self.ready.pop_front()?;
        self.frontier.push_back(next.clone());
        Some(Ok(next))
    }
}

impl<C> std::iter::FusedIterator for Descendants<'_, C> where C: ChildLookup + ?Sized {}
