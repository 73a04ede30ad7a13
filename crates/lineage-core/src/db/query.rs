//! SQLite query helpers for the `nodes` table.
//!
//! Every function takes a shared `&Connection` (a `Transaction` derefs to
//! one) plus the collection name, and returns `anyhow::Result<T>` with typed
//! rows. None of these helpers enforce hierarchy invariants; that is the job
//! of [`SqliteHierarchy`](super::SqliteHierarchy).

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// A stored node row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeRow {
    pub collection: String,
    pub node_id: String,
    pub label: Option<String>,
    pub parent_id: Option<String>,
    pub created_at_us: i64,
    pub updated_at_us: i64,
}

/// Node count per collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionCount {
    pub collection: String,
    pub nodes: u64,
}

const NODE_COLUMNS: &str =
    "collection, node_id, label, parent_id, created_at_us, updated_at_us";

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// Fetch a single node by exact ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_node(conn: &Connection, collection: &str, node_id: &str) -> Result<Option<NodeRow>> {
    let sql = format!("SELECT {NODE_COLUMNS} FROM nodes WHERE collection = ?1 AND node_id = ?2");
    conn.query_row(&sql, params![collection, node_id], row_to_node)
        .optional()
        .with_context(|| format!("get_node '{node_id}' in '{collection}'"))
}

/// Returns `true` if the node exists in the collection.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn node_exists(conn: &Connection, collection: &str, node_id: &str) -> Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM nodes WHERE collection = ?1 AND node_id = ?2)",
        params![collection, node_id],
        |row| row.get(0),
    )
    .with_context(|| format!("node_exists '{node_id}' in '{collection}'"))
}

/// Point lookup of a node's parent column.
///
/// Returns `None` both for roots and for nodes that do not exist.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_parent_id(conn: &Connection, collection: &str, node_id: &str) -> Result<Option<String>> {
    let parent: Option<Option<String>> = conn
        .query_row(
            "SELECT parent_id FROM nodes WHERE collection = ?1 AND node_id = ?2",
            params![collection, node_id],
            |row| row.get(0),
        )
        .optional()
        .with_context(|| format!("get_parent_id '{node_id}' in '{collection}'"))?;
    Ok(parent.flatten())
}

/// IDs of the direct children of `parent_id`, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_children(conn: &Connection, collection: &str, parent_id: &str) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare(
            "SELECT node_id FROM nodes \
             WHERE collection = ?1 AND parent_id = ?2 \
             ORDER BY created_at_us ASC, node_id ASC",
        )
        .context("prepare get_children")?;
    let rows = stmt
        .query_map(params![collection, parent_id], |row| row.get::<_, String>(0))
        .context("execute get_children")?;

    let mut children = Vec::new();
    for row in rows {
        children.push(row.context("read child row")?);
    }
    Ok(children)
}

/// Number of direct children of `parent_id`.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn count_children(conn: &Connection, collection: &str, parent_id: &str) -> Result<u64> {
    conn.query_row(
        "SELECT COUNT(*) FROM nodes WHERE collection = ?1 AND parent_id = ?2",
        params![collection, parent_id],
        |row| row.get(0),
    )
    .with_context(|| format!("count_children of '{parent_id}' in '{collection}'"))
}

/// Number of nodes in the collection.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn count_nodes(conn: &Connection, collection: &str) -> Result<u64> {
    conn.query_row(
        "SELECT COUNT(*) FROM nodes WHERE collection = ?1",
        params![collection],
        |row| row.get(0),
    )
    .with_context(|| format!("count_nodes in '{collection}'"))
}

/// Every node in the collection, ordered by ID.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_nodes(conn: &Connection, collection: &str) -> Result<Vec<NodeRow>> {
    let sql = format!("SELECT {NODE_COLUMNS} FROM nodes WHERE collection = ?1 ORDER BY node_id");
    let mut stmt = conn.prepare(&sql).context("prepare list_nodes")?;
    let rows = stmt
        .query_map(params![collection], row_to_node)
        .context("execute list_nodes")?;

    let mut nodes = Vec::new();
    for row in rows {
        nodes.push(row.context("read node row")?);
    }
    Ok(nodes)
}

/// All collections with their node counts, ordered by name.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_collections(conn: &Connection) -> Result<Vec<CollectionCount>> {
    let mut stmt = conn
        .prepare("SELECT collection, COUNT(*) FROM nodes GROUP BY collection ORDER BY collection")
        .context("prepare list_collections")?;
    let rows = stmt
        .query_map([], |row| {
            Ok(CollectionCount {
                collection: row.get(0)?,
                nodes: row.get(1)?,
            })
        })
        .context("execute list_collections")?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("read collection row")?);
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// Insert a node row. Fails on a duplicate `(collection, node_id)`.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_node(
    conn: &Connection,
    collection: &str,
    node_id: &str,
    parent_id: Option<&str>,
    label: Option<&str>,
    now_us: i64,
) -> Result<()> {
    conn.execute(
        "INSERT INTO nodes (collection, node_id, label, parent_id, created_at_us, updated_at_us) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
        params![collection, node_id, label, parent_id, now_us],
    )
    .with_context(|| format!("insert_node '{node_id}' in '{collection}'"))?;
    Ok(())
}

/// Single-row update of `parent_id`. Returns the number of rows changed.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn update_parent(
    conn: &Connection,
    collection: &str,
    node_id: &str,
    parent_id: Option<&str>,
    now_us: i64,
) -> Result<usize> {
    conn.execute(
        "UPDATE nodes SET parent_id = ?3, updated_at_us = ?4 \
         WHERE collection = ?1 AND node_id = ?2",
        params![collection, node_id, parent_id, now_us],
    )
    .with_context(|| format!("update_parent '{node_id}' in '{collection}'"))
}

/// Delete a node row. Returns the number of rows removed.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn delete_node(conn: &Connection, collection: &str, node_id: &str) -> Result<usize> {
    conn.execute(
        "DELETE FROM nodes WHERE collection = ?1 AND node_id = ?2",
        params![collection, node_id],
    )
    .with_context(|| format!("delete_node '{node_id}' in '{collection}'"))
}

fn row_to_node(row: &rusqlite::Row<'_>) -> rusqlite::Result<NodeRow> {
    Ok(NodeRow {
        collection: row.get(0)?,
        node_id: row.get(1)?,
        label: row.get(2)?,
        parent_id: row.get(3)?,
        created_at_us: row.get(4)?,
        updated_at_us: row.get(5)?,
    })
}
