//! Collaborator contracts consumed by the guard.
//!
//! The guard never touches storage directly. It is handed one of these
//! traits and performs at most one call per traversal step. Closures of the
//! matching shape implement the traits, so a caller can pass
//! `|id: &str| -> anyhow::Result<Option<String>> { ... }` straight through.

/// Point lookup of a node's current parent.
pub trait ParentLookup {
    /// Return the parent of `node_id`, or `None` if it is a root or absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot answer.
    fn parent_of(&self, node_id: &str) -> anyhow::Result<Option<String>>;
}

/// Lookup of a node's direct children.
pub trait ChildLookup {
    /// Return the IDs of the direct children of `node_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot answer.
    fn children_of(&self, node_id: &str) -> anyhow::Result<Vec<String>>;
}

/// Single-row update of a node's parent link.
pub trait ParentWriter {
    /// Set the parent of `node_id` to `parent_id` (`None` detaches).
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store rejects the write.
    fn apply_parent(&mut self, node_id: &str, parent_id: Option<&str>) -> anyhow::Result<()>;
}

impl<F> ParentLookup for F
where
    F: Fn(&str) -> anyhow::Result<Option<String>>,
{
    fn parent_of(&self, node_id: &str) -> anyhow::Result<Option<String>> {
        self(node_id)
    }
}

impl<F> ChildLookup for F
where
    F: Fn(&str) -> anyhow::Result<Vec<String>>,
{
    fn children_of(&self, node_id: &str) -> anyhow::Result<Vec<String>> {
        self(node_id)
    }
}

impl<F> ParentWriter for F
where
    F: FnMut(&str, Option<&str>) -> anyhow::Result<()>,
{
    fn apply_parent(&mut self, node_id: &str, parent_id: Option<&str>) -> anyhow::Result<()> {
        self(node_id, parent_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_implement_lookup_traits() {
        let parent = |id: &str| -> anyhow::Result<Option<String>> {
            Ok((id == "child").then(|| "root".to_string()))
        };
        assert_eq!(parent.parent_of("child").unwrap(), Some("root".to_string()));
        assert_eq!(parent.parent_of("root").unwrap(), None);

        let children = |id: &str| -> anyhow::Result<Vec<String>> {
            Ok(if id == "root" {
                vec!["child".to_string()]
            } else {
                Vec::new()
            })
        };
        assert_eq!(children.children_of("root").unwrap(), vec!["child"]);
    }

    #[test]
    fn closure_writer_records_updates() {
        let mut log: Vec<(String, Option<String>)> = Vec::new();
        {
            let mut writer = |id: &str, parent: Option<&str>| -> anyhow::Result<()> {
                log.push((id.to_string(), parent.map(str::to_string)));
                Ok(())
            };
            writer.apply_parent("a", Some("b")).unwrap();
            writer.apply_parent("a", None).unwrap();
        }
        assert_eq!(
            log,
            vec![
                ("a".to_string(), Some("b".to_string())),
                ("a".to_string(), None),
            ]
        );
    }
}
