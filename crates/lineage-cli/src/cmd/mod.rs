pub mod add;
pub mod ancestors;
pub mod check;
pub mod collections;
pub mod completions;
pub mod descendants;
pub mod init;
pub mod move_cmd;
pub mod rm;
pub mod verify;

use crate::output::{CliError, ErrorRendered, OutputMode, render_error};
use crate::validate::ValidationError;
use lineage_core::db::{SqliteHierarchy, try_open_store};
use lineage_core::error::{ErrorCode, HierarchyError};
use rusqlite::Connection;
use std::path::PathBuf;
use tracing::error;

/// Everything a command handler needs besides its own arguments.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub output: OutputMode,
    pub project_root: PathBuf,
    pub db_path: PathBuf,
    pub collection: String,
    pub max_depth: Option<usize>,
}

impl CommandContext {
    /// Open the store, returning a helpful error if it doesn't exist.
    pub fn open_store(&self) -> anyhow::Result<Connection> {
        match try_open_store(&self.db_path) {
            Ok(Some(conn)) => Ok(conn),
            Ok(None) => {
                let code = ErrorCode::NotInitialized;
                self.fail(&CliError::with_details(
                    format!("no hierarchy store at {}", self.db_path.display()),
                    code.hint().unwrap_or_default(),
                    code.code(),
                ))
            }
            Err(e) => {
                let code = ErrorCode::StoreUnavailable;
                self.fail(&CliError::with_details(
                    format!("{e:#}"),
                    code.hint().unwrap_or_default(),
                    code.code(),
                ))
            }
        }
    }

    /// The configured collection over `conn`.
    pub fn hierarchy<'c>(&self, conn: &'c Connection) -> SqliteHierarchy<'c> {
        SqliteHierarchy::new(conn, self.collection.as_str()).with_max_depth(self.max_depth)
    }

    /// Render `err` on stderr and return it as the command's failure.
    pub fn fail<T>(&self, err: &CliError) -> anyhow::Result<T> {
        render_error(self.output, err)?;
        Err(ErrorRendered(err.message.clone()).into())
    }

    pub fn fail_validation<T>(&self, err: &ValidationError) -> anyhow::Result<T> {
        self.fail(&err.to_cli_error())
    }

    pub fn fail_hierarchy<T>(&self, err: &HierarchyError) -> anyhow::Result<T> {
        if !err.is_user_error() {
            error!(collection = %self.collection, code = %err.code(), "{err}");
        }
        self.fail(&CliError::from(err))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Context over a fresh on-disk store inside `dir`.
    pub fn context(dir: &std::path::Path) -> CommandContext {
        let db_path = dir.join(".lineage/lineage.db");
        lineage_core::db::open_store(&db_path).expect("create store");
        CommandContext {
            output: OutputMode::Json,
            project_root: dir.to_path_buf(),
            db_path,
            collection: "companies".to_string(),
            max_depth: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_store_is_not_created() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = CommandContext {
            output: OutputMode::Json,
            project_root: dir.path().to_path_buf(),
            db_path: dir.path().join(".lineage/lineage.db"),
            collection: "companies".to_string(),
            max_depth: None,
        };
        let err = ctx.open_store().unwrap_err();
        assert!(err.to_string().contains("no hierarchy store"));
        assert!(err.is::<ErrorRendered>());
        assert!(!ctx.db_path.exists());
    }

    #[test]
    fn hierarchy_uses_configured_collection() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = test_support::context(dir.path());
        ctx.collection = "pipeline_stages".to_string();
        let conn = ctx.open_store().unwrap();
        assert_eq!(ctx.hierarchy(&conn).collection(), "pipeline_stages");
    }
}
