//! lineage-core library.
//!
//! Cycle-safe single-parent hierarchies: the storage-agnostic
//! [`guard`], an in-memory forest ([`memory`]), a SQLite-backed store
//! ([`db`]), and a whole-collection integrity scan ([`verify`]).
//!
//! # Conventions
//!
//! - **Errors**: Guard and store operations return
//!   [`error::HierarchyError`]; plumbing uses `anyhow::Result`.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod config;
pub mod db;
pub mod error;
pub mod guard;
pub mod memory;
pub mod verify;
