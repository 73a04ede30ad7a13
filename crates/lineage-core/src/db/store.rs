//! `SqliteHierarchy`: the guard's collaborators backed by one collection.
//!
//! The raw trait impls (`ParentLookup`, `ChildLookup`, `ParentWriter`) are
//! thin single-statement wrappers over [`query`]. The inherent methods are
//! the companion CRUD layer: they check existence, run the guard, and wrap
//! check + write in one `BEGIN IMMEDIATE` transaction so two writers cannot
//! interleave re-parents of the same subtree.
//!
//! Methods that open a transaction must not be called while the connection
//! is already inside one.

#![allow(clippy::module_name_repetitions)]

use anyhow::Context as _;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use tracing::{debug, info};

use super::query;
use crate::error::HierarchyError;
use crate::guard::{self, ChildLookup, ParentLookup, ParentWriter};
use crate::memory::ParentMap;

/// One hierarchy namespace inside the store.
#[derive(Debug, Clone)]
pub struct SqliteHierarchy<'c> {
    conn: &'c Connection,
    collection: String,
    max_depth: Option<usize>,
}

impl<'c> SqliteHierarchy<'c> {
    pub fn new(conn: &'c Connection, collection: impl Into<String>) -> Self {
        Self {
            conn,
            collection: collection.into(),
            max_depth: None,
        }
    }

    /// Cap ancestor walks at `max_depth` instead of the collection size.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Same collection, bound to another connection (usually a transaction).
    fn scoped<'t>(&self, conn: &'t Connection) -> SqliteHierarchy<'t> {
        SqliteHierarchy {
            conn,
            collection: self.collection.clone(),
            max_depth: self.max_depth,
        }
    }

    fn begin(&self) -> Result<Transaction<'c>, HierarchyError> {
        Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)
            .context("begin immediate transaction")
            .map_err(HierarchyError::from)
    }

    fn require_node(&self, node_id: &str) -> Result<(), HierarchyError> {
        if query::node_exists(self.conn, &self.collection, node_id)? {
            Ok(())
        } else {
            Err(HierarchyError::NodeNotFound(node_id.to_string()))
        }
    }

    /// Number of nodes in the collection.
    ///
    /// # Errors
    ///
    /// Returns [`HierarchyError::Lookup`] on database failure.
    pub fn node_count(&self) -> Result<usize, HierarchyError> {
        let count = query::count_nodes(self.conn, &self.collection)?;
        Ok(usize::try_from(count).unwrap_or(usize::MAX))
    }

    fn depth_bound(&self) -> Result<usize, HierarchyError> {
        match self.max_depth {
            Some(bound) => Ok(bound),
            None => Ok(self.node_count()?.max(1)),
        }
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Create a node, optionally under an existing parent.
    ///
    /// # Errors
    ///
    /// Returns [`HierarchyError::NodeAlreadyExists`] if the ID is taken,
    /// [`HierarchyError::NodeNotFound`] if the parent does not exist, or
    /// [`HierarchyError::Lookup`] on database failure.
    pub fn add_node(
        &self,
        node_id: &str,
        parent_id: Option<&str>,
        label: Option<&str>,
    ) -> Result<(), HierarchyError> {
        let tx = self.begin()?;
        if query::node_exists(&tx, &self.collection, node_id)? {
            return Err(HierarchyError::NodeAlreadyExists(node_id.to_string()));
        }
        if let Some(parent) = parent_id {
            self.scoped(&tx).require_node(parent)?;
        }
        query::insert_node(&tx, &self.collection, node_id, parent_id, label, now_us())?;
        tx.commit().context("commit add_node")?;

        info!(collection = %self.collection, node_id, parent_id, "node added");
        Ok(())
    }

    /// Re-parent `node_id` under `parent_id` (`None` detaches) through the
    /// guard, atomically.
    ///
    /// # Errors
    ///
    /// Returns [`HierarchyError::NodeNotFound`] if either node is missing,
    /// [`HierarchyError::Cycle`] if the move would close a cycle, or
    /// [`HierarchyError::Lookup`] on database failure. Nothing is written
    /// on error.
    pub fn reparent(&self, node_id: &str, parent_id: Option<&str>) -> Result<(), HierarchyError> {
        let tx = self.begin()?;
        {
            let lookup = self.scoped(&tx);
            lookup.require_node(node_id)?;
            if let Some(parent) = parent_id {
                lookup.require_node(parent)?;
            }
            let mut writer = lookup.clone();
            guard::set_parent(node_id, parent_id, &lookup, &mut writer)?;
        }
        tx.commit().context("commit reparent")?;

        info!(collection = %self.collection, node_id, parent_id, "node re-parented");
        Ok(())
    }

    /// Remove a node that has no children.
    ///
    /// # Errors
    ///
    /// Returns [`HierarchyError::NodeNotFound`] if the node is missing,
    /// [`HierarchyError::HasChildren`] if it still has children, or
    /// [`HierarchyError::Lookup`] on database failure.
    pub fn remove_node(&self, node_id: &str) -> Result<(), HierarchyError> {
        let tx = self.begin()?;
        self.scoped(&tx).require_node(node_id)?;

        let children = query::count_children(&tx, &self.collection, node_id)?;
        if children > 0 {
            return Err(HierarchyError::HasChildren {
                node_id: node_id.to_string(),
                children: usize::try_from(children).unwrap_or(usize::MAX),
            });
        }

        query::delete_node(&tx, &self.collection, node_id)?;
        tx.commit().context("commit remove_node")?;

        info!(collection = %self.collection, node_id, "node removed");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Dry run of the guard's cycle check for an existing node.
    ///
    /// # Errors
    ///
    /// Returns [`HierarchyError::NodeNotFound`] if either node is missing, or
    /// [`HierarchyError::Lookup`] on database failure.
    pub fn would_create_cycle(
        &self,
        node_id: &str,
        parent_id: Option<&str>,
    ) -> Result<bool, HierarchyError> {
        self.require_node(node_id)?;
        if let Some(parent) = parent_id {
            self.require_node(parent)?;
        }
        guard::would_create_cycle(node_id, parent_id, self)
    }

    /// Ancestor chain of an existing node, immediate parent first.
    ///
    /// The walk is bounded by the collection size (or the configured
    /// `max_depth`).
    ///
    /// # Errors
    ///
    /// Returns [`HierarchyError::NodeNotFound`] if the node is missing,
    /// [`HierarchyError::CorruptHierarchy`] if the stored chain never reaches
    /// a root, or [`HierarchyError::Lookup`] on database failure.
    pub fn ancestors(&self, node_id: &str) -> Result<Vec<String>, HierarchyError> {
        self.require_node(node_id)?;
        let bound = self.depth_bound()?;
        let chain = guard::ancestors(node_id, self, Some(bound)).collect::<Result<Vec<_>, _>>()?;
        debug!(node_id, depth = chain.len(), "ancestors resolved");
        Ok(chain)
    }

    /// Breadth-first descendants of an existing node.
    ///
    /// # Errors
    ///
    /// Returns [`HierarchyError::NodeNotFound`] if the node is missing, or
    /// [`HierarchyError::Lookup`] on database failure.
    pub fn descendants(&self, node_id: &str) -> Result<Vec<String>, HierarchyError> {
        self.require_node(node_id)?;
        guard::descendants(node_id, self).collect()
    }

    /// Stored row for `node_id`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`HierarchyError::Lookup`] on database failure.
    pub fn get(&self, node_id: &str) -> Result<Option<query::NodeRow>, HierarchyError> {
        Ok(query::get_node(self.conn, &self.collection, node_id)?)
    }

    /// Load the whole collection into an in-memory forest.
    ///
    /// # Errors
    ///
    /// Returns [`HierarchyError::Lookup`] on database failure.
    pub fn snapshot(&self) -> Result<ParentMap, HierarchyError> {
        let rows = query::list_nodes(self.conn, &self.collection)?;
        Ok(rows
            .into_iter()
            .map(|row| (row.node_id, row.parent_id))
            .collect())
    }
}

impl ParentLookup for SqliteHierarchy<'_> {
    fn parent_of(&self, node_id: &str) -> anyhow::Result<Option<String>> {
        query::get_parent_id(self.conn, &self.collection, node_id)
    }
}

impl ChildLookup for SqliteHierarchy<'_> {
    fn children_of(&self, node_id: &str) -> anyhow::Result<Vec<String>> {
        query::get_children(self.conn, &self.collection, node_id)
    }
}

impl ParentWriter for SqliteHierarchy<'_> {
    fn apply_parent(&mut self, node_id: &str, parent_id: Option<&str>) -> anyhow::Result<()> {
        let changed =
            query::update_parent(self.conn, &self.collection, node_id, parent_id, now_us())?;
        if changed != 1 {
            anyhow::bail!("expected to update 1 row for '{node_id}', updated {changed}");
        }
        Ok(())
    }
}

fn now_us() -> i64 {
    chrono::Utc::now().timestamp_micros()
}
