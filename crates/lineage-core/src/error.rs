use std::fmt;

/// Machine-readable error codes for caller-side status mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NotInitialized,
    ConfigParseError,
    NodeNotFound,
    NodeAlreadyExists,
    CycleDetected,
    InvalidNodeId,
    HasChildren,
    CorruptHierarchy,
    StoreUnavailable,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotInitialized => "E1001",
            Self::ConfigParseError => "E1002",
            Self::NodeNotFound => "E2001",
            Self::NodeAlreadyExists => "E2002",
            Self::CycleDetected => "E2003",
            Self::InvalidNodeId => "E2005",
            Self::HasChildren => "E2006",
            Self::CorruptHierarchy => "E3003",
            Self::StoreUnavailable => "E5001",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NotInitialized => "Project not initialized",
            Self::ConfigParseError => "Config file parse error",
            Self::NodeNotFound => "Node not found",
            Self::NodeAlreadyExists => "Node already exists",
            Self::CycleDetected => "Circular reference would be created",
            Self::InvalidNodeId => "Invalid node ID",
            Self::HasChildren => "Node still has children",
            Self::CorruptHierarchy => "Corrupt hierarchy data",
            Self::StoreUnavailable => "Hierarchy store unavailable",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::NotInitialized => Some("Run `lineage init` to initialize this directory."),
            Self::ConfigParseError => Some("Fix syntax in .lineage/config.toml and retry."),
            Self::NodeNotFound => None,
            Self::NodeAlreadyExists => Some("Pick a different ID or move the existing node."),
            Self::CycleDetected => {
                Some("Choose a parent that is not the node itself or one of its descendants.")
            }
            Self::InvalidNodeId => Some("Use a non-empty ID without whitespace."),
            Self::HasChildren => Some("Move or remove the children first."),
            Self::CorruptHierarchy => {
                Some("Run `lineage verify` and repair the reported parent links.")
            }
            Self::StoreUnavailable => Some("Check the database path and file permissions."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors raised by hierarchy operations.
///
/// `Cycle` is attributable to the caller's input and should be surfaced as
/// a rejected request. `CorruptHierarchy` means stored data was already
/// broken before the call and should be treated as an internal error.
#[derive(Debug, thiserror::Error)]
pub enum HierarchyError {
    /// Assigning `candidate_parent` to `node_id` would close a cycle
    /// (including the self-parent case).
    #[error("setting parent of '{node_id}' to '{candidate_parent}' would create a circular reference")]
    Cycle {
        node_id: String,
        candidate_parent: String,
    },

    /// A traversal revisited a node or exceeded its step bound without
    /// reaching a root.
    #[error("corrupt hierarchy at '{node_id}' after {visited} steps: {reason}")]
    CorruptHierarchy {
        node_id: String,
        visited: usize,
        reason: CorruptionKind,
    },

    /// The requested node does not exist in the collection.
    #[error("node not found: '{0}'")]
    NodeNotFound(String),

    /// A node with this ID already exists in the collection.
    #[error("node already exists: '{0}'")]
    NodeAlreadyExists(String),

    /// Removal refused because the node still has direct children.
    #[error("node '{node_id}' still has {children} child node(s)")]
    HasChildren { node_id: String, children: usize },

    /// A collaborator (lookup, writer, database) failed.
    #[error("hierarchy lookup failed: {0:#}")]
    Lookup(#[from] anyhow::Error),
}

/// Why a traversal gave up on a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorruptionKind {
    /// The walk came back to a node it had already seen.
    Revisited,
    /// The walk hit `max_depth` steps without reaching a root.
    DepthExceeded { max_depth: usize },
}

impl fmt::Display for CorruptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Revisited => write!(f, "node revisited (pre-existing cycle)"),
            Self::DepthExceeded { max_depth } => {
                write!(f, "no root within {max_depth} steps")
            }
        }
    }
}

impl HierarchyError {
    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Cycle { .. } => ErrorCode::CycleDetected,
            Self::CorruptHierarchy { .. } => ErrorCode::CorruptHierarchy,
            Self::NodeNotFound(_) => ErrorCode::NodeNotFound,
            Self::NodeAlreadyExists(_) => ErrorCode::NodeAlreadyExists,
            Self::HasChildren { .. } => ErrorCode::HasChildren,
            Self::Lookup(_) => ErrorCode::StoreUnavailable,
        }
    }

    /// Optional remediation hint for operators.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }

    /// Returns `true` when the error is caused by the caller's input rather
    /// than by stored data or infrastructure.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Cycle { .. }
                | Self::NodeNotFound(_)
                | Self::NodeAlreadyExists(_)
                | Self::HasChildren { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{CorruptionKind, ErrorCode, HierarchyError};
    use std::collections::HashSet;

    #[test]
    fn all_codes_are_unique() {
        let all = [
            ErrorCode::NotInitialized,
            ErrorCode::ConfigParseError,
            ErrorCode::NodeNotFound,
            ErrorCode::NodeAlreadyExists,
            ErrorCode::CycleDetected,
            ErrorCode::InvalidNodeId,
            ErrorCode::HasChildren,
            ErrorCode::CorruptHierarchy,
            ErrorCode::StoreUnavailable,
            ErrorCode::InternalUnexpected,
        ];

        let mut seen = HashSet::new();
        for code in all {
            assert!(seen.insert(code.code()), "duplicate code {}", code.code());
        }
    }

    #[test]
    fn code_format_is_machine_friendly() {
        let code = ErrorCode::CycleDetected.code();
        assert_eq!(code.len(), 5);
        assert!(code.starts_with('E'));
        assert!(code.chars().skip(1).all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn cycle_display_names_both_nodes() {
        let e = HierarchyError::Cycle {
            node_id: "co-acme".to_string(),
            candidate_parent: "co-sub".to_string(),
        };
        let s = e.to_string();
        assert!(s.contains("co-acme"));
        assert!(s.contains("co-sub"));
        assert!(s.contains("circular reference"));
        assert_eq!(e.code(), ErrorCode::CycleDetected);
        assert!(e.is_user_error());
    }

    #[test]
    fn corrupt_hierarchy_is_not_a_user_error() {
        let e = HierarchyError::CorruptHierarchy {
            node_id: "co-x".to_string(),
            visited: 3,
            reason: CorruptionKind::DepthExceeded { max_depth: 3 },
        };
        assert!(!e.is_user_error());
        assert_eq!(e.code(), ErrorCode::CorruptHierarchy);
        assert!(e.to_string().contains("no root within 3 steps"));
        assert!(e.hint().is_some());
    }

    #[test]
    fn lookup_error_keeps_context_chain() {
        let inner = anyhow::anyhow!("disk I/O error").context("get_node 'co-a'");
        let e = HierarchyError::from(inner);
        let s = e.to_string();
        assert!(s.contains("get_node 'co-a'"), "display: {s}");
        assert!(s.contains("disk I/O error"), "display: {s}");
        assert_eq!(e.code(), ErrorCode::StoreUnavailable);
    }
}
