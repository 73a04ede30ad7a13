//! Write-path cycle check and the guarded parent update.
//!
//! # Overview
//!
//! A node may only be re-parented under a candidate whose ancestor chain
//! does not contain the node itself. Because every node has at most one
//! parent, the check is a single upward walk from the candidate: O(depth)
//! point lookups, never a scan of the collection.
//!
//! The walk keeps a visited set. If it comes back to a node it has already
//! seen, the stored data already contains a cycle upstream of the
//! candidate; the check stops and answers "unsafe" instead of looping.

#![allow(clippy::module_name_repetitions)]

use anyhow::Context as _;
use std::collections::HashSet;
use tracing::{debug, warn};

use super::lookup::{ParentLookup, ParentWriter};
use crate::error::HierarchyError;

/// Decide whether setting the parent of `node_id` to `candidate_parent`
/// would introduce a cycle.
///
/// - `candidate_parent == None` (detach) is always safe: returns `false`
///   without any lookup.
/// - `candidate_parent == node_id` is always a cycle: returns `true`
///   without any lookup.
/// - Otherwise walks from the candidate toward the root. Meeting `node_id`
///   returns `true`; reaching a root returns `false`; revisiting a node
///   returns `true`.
///
/// Existence of either node is not checked here. A candidate unknown to
/// `lookup` behaves like a root.
///
/// # Errors
///
/// Returns [`HierarchyError::Lookup`] if the collaborator fails.
pub fn would_create_cycle<L>(
    node_id: &str,
    candidate_parent: Option<&str>,
    lookup: &L,
) -> Result<bool, HierarchyError>
where
    L: ParentLookup + ?Sized,
{
    let Some(candidate) = candidate_parent else {
        return Ok(false);
    };
    if candidate == node_id {
        debug!(node_id, "self-parent rejected");
        return Ok(true);
    }

    let mut visited: HashSet<String> = HashSet::new();
    let mut current = candidate.to_string();

    loop {
        if current == node_id {
            debug!(node_id, candidate, via = %current, "candidate is a descendant");
            return Ok(true);
        }
        if !visited.insert(current.clone()) {
            warn!(
                node_id,
                candidate,
                revisited = %current,
                steps = visited.len(),
                "pre-existing cycle above candidate parent; treating as unsafe"
            );
            return Ok(true);
        }

        let parent = lookup
            .parent_of(&current)
            .with_context(|| format!("lookup parent of '{current}'"))?;

        match parent {
            Some(next) => current = next,
            None => {
                debug!(node_id, candidate, depth = visited.len(), "reached root");
                return Ok(false);
            }
        }
    }
}

/// Re-parent `node_id` under `candidate_parent` if and only if doing so
/// keeps the hierarchy acyclic.
///
/// On success `writer.apply_parent` has been called exactly once. On
/// [`HierarchyError::Cycle`] the writer is never called.
///
/// The check and the write are two separate collaborator calls. Callers
/// that re-parent concurrently must hold a lock or transaction around this
/// call (the SQLite store does).
///
/// # Errors
///
/// Returns [`HierarchyError::Cycle`] if the move would create a cycle, or
/// [`HierarchyError::Lookup`] if a collaborator fails.
pub fn set_parent<L, W>(
    node_id: &str,
    candidate_parent: Option<&str>,
    lookup: &L,
    writer: &mut W,
) -> Result<(), HierarchyError>
where
    L: ParentLookup + ?Sized,
    W: ParentWriter + ?Sized,
{
    if let Some(candidate) = candidate_parent {
        if would_create_cycle(node_id, Some(candidate), lookup)? {
            return Err(HierarchyError::Cycle {
                node_id: node_id.to_string(),
                candidate_parent: candidate.to_string(),
            });
        }
    }

    writer
        .apply_parent(node_id, candidate_parent)
        .with_context(|| format!("apply parent of '{node_id}'"))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::ParentMap;
    use std::cell::Cell;

    /// A → B → C, C is the root.
    fn chain_abc() -> ParentMap {
        let mut map = ParentMap::new();
        map.insert("C", None);
        map.insert("B", Some("C"));
        map.insert("A", Some("B"));
        map
    }

    #[test]
    fn reparent_to_existing_grandparent_is_safe() {
        let map = chain_abc();
        assert!(!would_create_cycle("A", Some("C"), &map).unwrap());
    }

    #[test]
    fn reparent_root_under_descendant_is_cycle() {
        let map = chain_abc();
        assert!(would_create_cycle("C", Some("A"), &map).unwrap());
    }

    #[test]
    fn reparent_under_direct_child_is_cycle() {
        let map = chain_abc();
        assert!(would_create_cycle("B", Some("A"), &map).unwrap());
    }

    #[test]
    fn self_parent_is_cycle_without_lookup() {
        let calls = Cell::new(0);
        let lookup = |_: &str| -> anyhow::Result<Option<String>> {
            calls.set(calls.get() + 1);
            Ok(None)
        };
        assert!(would_create_cycle("B", Some("B"), &lookup).unwrap());
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn detach_is_safe_without_lookup() {
        let lookup = |_: &str| -> anyhow::Result<Option<String>> {
            anyhow::bail!("lookup must not be called")
        };
        assert!(!would_create_cycle("A", None, &lookup).unwrap());
    }

    #[test]
    fn current_parent_is_always_safe() {
        let map = chain_abc();
        assert!(!would_create_cycle("A", Some("B"), &map).unwrap());
        assert!(!would_create_cycle("B", Some("C"), &map).unwrap());
    }

    #[test]
    fn unrelated_tree_is_safe() {
        let mut map = chain_abc();
        map.insert("X", None);
        map.insert("Y", Some("X"));
        assert!(!would_create_cycle("C", Some("Y"), &map).unwrap());
    }

    #[test]
    fn unknown_candidate_behaves_like_root() {
        let map = chain_abc();
        assert!(!would_create_cycle("A", Some("ghost"), &map).unwrap());
    }

    #[test]
    fn corrupted_cycle_above_candidate_terminates_as_unsafe() {
        // P ↔ Q loop, unrelated to N.
        let mut map = ParentMap::new();
        map.insert("P", Some("Q"));
        map.insert("Q", Some("P"));
        map.insert("N", None);
        assert!(would_create_cycle("N", Some("P"), &map).unwrap());
    }

    #[test]
    fn walk_performs_one_lookup_per_level() {
        let map = chain_abc();
        let calls = Cell::new(0);
        let lookup = |id: &str| -> anyhow::Result<Option<String>> {
            calls.set(calls.get() + 1);
            map.parent_of(id)
        };
        // Candidate A: A → B → C → root. Three lookups.
        assert!(!would_create_cycle("Z", Some("A"), &lookup).unwrap());
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn lookup_failure_propagates() {
        let lookup = |_: &str| -> anyhow::Result<Option<String>> {
            anyhow::bail!("connection reset")
        };
        let err = would_create_cycle("A", Some("B"), &lookup).unwrap_err();
        assert!(matches!(err, HierarchyError::Lookup(_)));
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn set_parent_applies_exactly_once() {
        let map = chain_abc();
        let mut writes: Vec<(String, Option<String>)> = Vec::new();
        let mut writer = |id: &str, parent: Option<&str>| -> anyhow::Result<()> {
            writes.push((id.to_string(), parent.map(str::to_string)));
            Ok(())
        };
        set_parent("A", Some("C"), &map, &mut writer).unwrap();
        assert_eq!(writes, vec![("A".to_string(), Some("C".to_string()))]);
    }

    #[test]
    fn set_parent_rejects_cycle_without_writing() {
        let map = chain_abc();
        let mut writes = 0;
        let mut writer = |_: &str, _: Option<&str>| -> anyhow::Result<()> {
            writes += 1;
            Ok(())
        };
        let err = set_parent("C", Some("A"), &map, &mut writer).unwrap_err();
        assert!(matches!(
            err,
            HierarchyError::Cycle { ref node_id, ref candidate_parent }
                if node_id == "C" && candidate_parent == "A"
        ));
        assert_eq!(writes, 0);
    }

    #[test]
    fn set_parent_self_is_rejected() {
        let mut map = chain_abc();
        let before = map.clone();
        let lookup = map.clone();
        let err = set_parent("B", Some("B"), &lookup, &mut map).unwrap_err();
        assert!(matches!(err, HierarchyError::Cycle { .. }));
        assert_eq!(map, before);
    }

    #[test]
    fn set_parent_detach_writes_none() {
        let lookup = chain_abc();
        let mut map = chain_abc();
        set_parent("A", None, &lookup, &mut map).unwrap();
        assert_eq!(map.parent_of("A").unwrap(), None);
    }

    #[test]
    fn set_parent_surfaces_writer_failure() {
        let map = chain_abc();
        let mut writer = |_: &str, _: Option<&str>| -> anyhow::Result<()> {
            anyhow::bail!("readonly database")
        };
        let err = set_parent("A", Some("C"), &map, &mut writer).unwrap_err();
        assert!(matches!(err, HierarchyError::Lookup(_)));
        assert!(err.to_string().contains("apply parent of 'A'"));
    }
}
