//! Canonical SQLite schema for hierarchy collections.
//!
//! - `nodes` holds one row per node, keyed by `(collection, node_id)`. The
//!   parent link lives on the child as a nullable `parent_id` scoped to the
//!   same collection, so collections are never cross-linked.
//! - `idx_nodes_parent` backs the direct-children lookup.
//! - `store_meta` mirrors the schema version for tooling that cannot read
//!   `PRAGMA user_version`.

/// Migration v1: node table, parent index, and store metadata.
pub const MIGRATION_V1_SQL: &str = r"
CREATE TABLE IF NOT EXISTS nodes (
    collection TEXT NOT NULL CHECK (length(trim(collection)) > 0),
    node_id TEXT NOT NULL CHECK (length(trim(node_id)) > 0),
    parent_id TEXT,
    created_at_us INTEGER NOT NULL,
    updated_at_us INTEGER NOT NULL,
    PRIMARY KEY (collection, node_id),
    CHECK (parent_id IS NULL OR parent_id <> node_id)
);

CREATE INDEX IF NOT EXISTS idx_nodes_parent
    ON nodes(collection, parent_id);

CREATE TABLE IF NOT EXISTS store_meta (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    schema_version INTEGER NOT NULL
);

INSERT OR IGNORE INTO store_meta (id, schema_version) VALUES (1, 0);
";

/// Migration v2: optional display label and an update-time index for
/// recently-moved listings.
pub const MIGRATION_V2_SQL: &str = r"
ALTER TABLE nodes ADD COLUMN label TEXT;

CREATE INDEX IF NOT EXISTS idx_nodes_updated
    ON nodes(collection, updated_at_us DESC);
";

/// Indexes that must exist after all migrations have run.
pub const REQUIRED_INDEXES: &[&str] = &["idx_nodes_parent", "idx_nodes_updated"];
