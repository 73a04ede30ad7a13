use super::CommandContext;
use crate::output::{CliError, render};
use anyhow::Context as _;
use clap::Args;
use lineage_core::config::PROJECT_DIR;
use lineage_core::db::open_store;
use serde_json::json;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Rewrite `config.toml` even if `.lineage/` already exists.
    #[arg(long)]
    pub force: bool,
}

const CONFIG_TOML: &str = "[hierarchy]\n\
    # Collection used when --collection is not given.\n\
    default_collection = \"companies\"\n\
    # Fixed bound for ancestor walks. Defaults to the collection size.\n\
    # max_depth = 10000\n";

const GITIGNORE: &str = "lineage.db\nlineage.db-wal\nlineage.db-shm\n";

/// Execute `lineage init`. Creates the project skeleton:
///
/// ```text
/// .lineage/
///   config.toml   (default project config)
///   .gitignore    (database files)
///   lineage.db    (migrated hierarchy store)
/// ```
///
/// # Errors
///
/// Returns an error if `.lineage/` already exists and `--force` is not set,
/// or if any filesystem or database operation fails.
pub fn run_init(args: &InitArgs, ctx: &CommandContext) -> anyhow::Result<()> {
    let project_dir = ctx.project_root.join(PROJECT_DIR);

    if project_dir.exists() && !args.force {
        return ctx.fail(&CliError::new(
            ".lineage/ already exists. Use `lineage init --force` to reinitialize.",
        ));
    }

    std::fs::create_dir_all(&project_dir)
        .with_context(|| format!("Failed to create {}", project_dir.display()))?;

    let config_path = project_dir.join("config.toml");
    std::fs::write(&config_path, CONFIG_TOML)
        .with_context(|| format!("Failed to write config: {}", config_path.display()))?;

    let gitignore_path = project_dir.join(".gitignore");
    std::fs::write(&gitignore_path, GITIGNORE)
        .with_context(|| format!("Failed to write .gitignore: {}", gitignore_path.display()))?;

    // Existing stores are migrated in place, never recreated.
    open_store(&ctx.db_path)?;

    let val = json!({
        "ok": true,
        "config": config_path.display().to_string(),
        "db": ctx.db_path.display().to_string(),
    });
    render(ctx.output, &val, |v, w| {
        writeln!(w, "✓ Initialized .lineage/ project structure.")?;
        writeln!(w)?;
        writeln!(w, "  Config:   {}", v["config"].as_str().unwrap_or(""))?;
        writeln!(w, "  Database: {}", v["db"].as_str().unwrap_or(""))?;
        writeln!(w)?;
        writeln!(w, "Next steps:")?;
        writeln!(w, "  lineage add acme-holdings")?;
        writeln!(w, "  lineage add acme-retail --parent acme-holdings")
    })
}
