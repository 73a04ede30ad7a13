//! Whole-collection integrity scan.
//!
//! The guard keeps new writes acyclic, but rows written before the guard
//! existed (or behind its back) may already be broken. This scan walks every
//! node once and reports:
//!
//! - **cycles**: each loop of parent links, once, rotated to start at its
//!   smallest node ID;
//! - **corrupt nodes**: every node whose ancestor chain never reaches a
//!   root (members of a cycle and everything hanging below one);
//! - **dangling parents**: parent IDs that name no node in the collection.
//!
//! Because each node has at most one parent the parent relation is a
//! functional graph. Each node is resolved once and its state memoized, so
//! the whole scan is O(N).

use serde::Serialize;
use std::collections::HashMap;
use tracing::warn;

use crate::memory::ParentMap;

/// Result of [`verify_collection`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VerifyReport {
    pub nodes_checked: usize,
    pub roots: usize,
    /// Longest chain of parent links among healthy nodes. Links to a parent
    /// outside the collection are not counted.
    pub max_depth: usize,
    pub cycles: Vec<Vec<String>>,
    pub corrupt_nodes: Vec<String>,
    pub dangling: Vec<DanglingParent>,
}

/// A node whose parent ID does not exist in the collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingParent {
    pub node_id: String,
    pub parent_id: String,
}

impl VerifyReport {
    /// `true` when no cycle, corrupt chain, or dangling parent was found.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.cycles.is_empty() && self.corrupt_nodes.is_empty() && self.dangling.is_empty()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum NodeState {
    /// On the walk in progress, at this index of the path.
    OnPath(usize),
    /// Chain reaches a root (or leaves the collection) after this many links.
    Healthy(usize),
    /// Chain ends in a cycle.
    Corrupt,
}

/// Scan an in-memory snapshot of one collection.
#[must_use]
pub fn verify_collection(map: &ParentMap) -> VerifyReport {
    let parents: HashMap<&str, Option<&str>> = map.iter().collect();
    let mut state: HashMap<&str, NodeState> = HashMap::with_capacity(parents.len());
    let mut report = VerifyReport {
        nodes_checked: map.len(),
        ..VerifyReport::default()
    };

    for (node_id, parent_id) in map.iter() {
        match parent_id {
            None => report.roots += 1,
            Some(parent) if !parents.contains_key(parent) => {
                report.dangling.push(DanglingParent {
                    node_id: node_id.to_string(),
                    parent_id: parent.to_string(),
                });
            }
            Some(_) => {}
        }

        if state.contains_key(node_id) {
            continue;
        }

        // Follow parent links until the chain ends or meets a node that is
        // already resolved or already on this path. `tail` is the depth of the
        // last node pushed, or `None` when the chain is corrupt.
        let mut path: Vec<&str> = Vec::new();
        let mut current = node_id;
        let tail = loop {
            match state.get(current).copied() {
                Some(NodeState::Healthy(depth)) => break Some(depth + 1),
                Some(NodeState::Corrupt) => break None,
                Some(NodeState::OnPath(from)) => {
                    report.cycles.push(normalize_cycle(&path[from..]));
                    break None;
                }
                None => {
                    state.insert(current, NodeState::OnPath(path.len()));
                    path.push(current);
                    match parents.get(current).copied().flatten() {
                        Some(parent) if parents.contains_key(parent) => current = parent,
                        _ => break Some(0),
                    }
                }
            }
        };

        match tail {
            Some(mut depth) => {
                for &node in path.iter().rev() {
                    state.insert(node, NodeState::Healthy(depth));
                    report.max_depth = report.max_depth.max(depth);
                    depth += 1;
                }
            }
            None => {
                for &node in &path {
                    state.insert(node, NodeState::Corrupt);
                }
            }
        }
    }

    report.corrupt_nodes = map
        .iter()
        .filter(|(id, _)| state.get(id) == Some(&NodeState::Corrupt))
        .map(|(id, _)| id.to_string())
        .collect();
    report.cycles.sort();

    if !report.is_clean() {
        warn!(
            cycles = report.cycles.len(),
            corrupt = report.corrupt_nodes.len(),
            dangling = report.dangling.len(),
            "collection failed integrity scan"
        );
    }

    report
}

fn normalize_cycle(members: &[&str]) -> Vec<String> {
    let min_index = members
        .iter()
        .enumerate()
        .min_by_key(|(_, id)| **id)
        .map_or(0, |(i, _)| i);
    members[min_index..]
        .iter()
        .chain(&members[..min_index])
        .map(|id| (*id).to_string())
        .collect()
}
