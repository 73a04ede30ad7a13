//! Hierarchy guard: cycle-safe re-parenting for single-parent hierarchies.
//!
//! Every node has at most one parent, stored on the child. The guard keeps
//! that relation acyclic and answers ancestor/descendant queries without
//! ever touching storage itself: it is parameterized over the collaborator
//! traits in [`lookup`] and holds no state between calls.
//!
//! ## Submodules
//!
//! - [`lookup`]: `ParentLookup`, `ChildLookup`, `ParentWriter`.
//! - [`cycle`]: `would_create_cycle` and the guarded `set_parent`.
//! - [`traverse`]: bounded, lazy `ancestors` and `descendants`.
//!
//! ## Caller responsibilities
//!
//! - Check that the node and the candidate parent exist before calling.
//! - Serialize `set_parent` against concurrent writers to the same subtree.
//! - Refuse to remove nodes that still have children.

pub mod cycle;
pub mod lookup;
pub mod traverse;

pub use cycle::{set_parent, would_create_cycle};
pub use lookup::{ChildLookup, ParentLookup, ParentWriter};
pub use traverse::{Ancestors, DEFAULT_MAX_DEPTH, Descendants, ancestors, descendants};
