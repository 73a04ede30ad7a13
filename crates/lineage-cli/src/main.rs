#![forbid(unsafe_code)]

mod cmd;
mod output;
mod validate;

use clap::{CommandFactory, Parser, Subcommand};
use cmd::CommandContext;
use lineage_core::config::{resolve_config, store_path};
use lineage_core::error::ErrorCode;
use output::{CliError, ErrorRendered, OutputMode, render_error, resolve_output_mode};
use std::env;
use std::process;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "lineage: cycle-safe parent/child hierarchies",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Output format. Overrides --json, FORMAT and the user config.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Path to the hierarchy store [default: .lineage/lineage.db].
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,

    /// Hierarchy namespace to operate on [default: from config, "companies"].
    #[arg(long, global = true, value_name = "NAME")]
    collection: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Lifecycle",
        about = "Initialize a lineage project",
        long_about = "Create .lineage/ with a default config and an empty hierarchy store.",
        after_help = "EXAMPLES:\n    # Initialize a project in the current directory\n    lineage init\n\n    # Emit machine-readable output\n    lineage init --json"
    )]
    Init(cmd::init::InitArgs),

    #[command(
        next_help_heading = "Lifecycle",
        about = "Add a node",
        long_about = "Create a node in the collection, optionally under an existing parent.",
        after_help = "EXAMPLES:\n    # Add a root\n    lineage add acme-holdings --label \"Acme Holdings\"\n\n    # Add a child\n    lineage add acme-retail --parent acme-holdings"
    )]
    Add(cmd::add::AddArgs),

    #[command(
        next_help_heading = "Lifecycle",
        about = "Move a node under a new parent",
        long_about = "Re-parent a node. Moves that would create a circular reference are rejected.",
        after_help = "EXAMPLES:\n    # Move under another node\n    lineage move acme-retail --parent acme-europe\n\n    # Make it a root\n    lineage move acme-retail --parent none\n\n    # Emit machine-readable output\n    lineage move acme-retail --parent acme-europe --json"
    )]
    Move(cmd::move_cmd::MoveArgs),

    #[command(
        next_help_heading = "Lifecycle",
        about = "Remove a node with no children",
        after_help = "EXAMPLES:\n    # Remove a leaf\n    lineage rm acme-retail"
    )]
    Rm(cmd::rm::RmArgs),

    #[command(
        next_help_heading = "Read",
        about = "Check whether a move would create a cycle",
        long_about = "Dry run of `lineage move`: report whether the move is safe without writing.",
        after_help = "EXAMPLES:\n    # Would this close a loop?\n    lineage check acme-holdings --parent acme-retail\n\n    # Emit machine-readable output\n    lineage check acme-holdings --parent acme-retail --json"
    )]
    Check(cmd::check::CheckArgs),

    #[command(
        next_help_heading = "Read",
        about = "List a node's ancestors",
        long_about = "List a node's ancestors from its immediate parent up to the root.",
        after_help = "EXAMPLES:\n    lineage ancestors acme-retail\n    lineage ancestors acme-retail --format text"
    )]
    Ancestors(cmd::ancestors::AncestorsArgs),

    #[command(
        next_help_heading = "Read",
        about = "List a node's descendants",
        long_about = "List every node below a node, breadth first.",
        after_help = "EXAMPLES:\n    lineage descendants acme-holdings\n    lineage descendants acme-holdings --json"
    )]
    Descendants(cmd::descendants::DescendantsArgs),

    #[command(
        next_help_heading = "Read",
        about = "List collections and their node counts",
        after_help = "EXAMPLES:\n    lineage collections\n    lineage collections --json"
    )]
    Collections,

    #[command(
        next_help_heading = "Project Maintenance",
        about = "Scan the collection for cycles and broken links",
        long_about = "Check every stored parent link. Exits non-zero if a cycle, a corrupt chain, or a dangling parent is found.",
        after_help = "EXAMPLES:\n    # Verify the default collection\n    lineage verify\n\n    # Verify another collection\n    lineage verify --collection pipeline_stages --json"
    )]
    Verify,

    #[command(
        next_help_heading = "Project Maintenance",
        about = "Generate shell completion scripts",
        long_about = "Generate shell completion scripts for supported shells.",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    lineage completions bash\n\n    # Generate zsh completions\n    lineage completions zsh"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("LINEAGE_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "lineage=debug,info"
        } else {
            "lineage=info,warn"
        })
    });

    let format = env::var("LINEAGE_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

/// Merge flags and config into the context every handler receives.
fn build_context(cli: &Cli, project_root: &Path) -> anyhow::Result<CommandContext> {
    let early_output = cli.format.unwrap_or(if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Text
    });

    let config = match resolve_config(project_root, cli.json) {
        Ok(config) => config,
        Err(e) => {
            let code = ErrorCode::ConfigParseError;
            let message = format!("{e:#}");
            render_error(
                early_output,
                &CliError::with_details(
                    message.clone(),
                    code.hint().unwrap_or_default(),
                    code.code(),
                ),
            )?;
            return Err(ErrorRendered(message).into());
        }
    };

    let output = resolve_output_mode(cli.format, &config.resolved_output);
    let collection = cli
        .collection
        .clone()
        .unwrap_or(config.project.hierarchy.default_collection);
    if let Err(e) = validate::validate_collection(&collection) {
        render_error(output, &e.to_cli_error())?;
        return Err(ErrorRendered(e.reason).into());
    }

    let db_path = cli
        .db
        .clone()
        .unwrap_or_else(|| store_path(project_root));

    debug!(db = %db_path.display(), %collection, ?output, "resolved command context");

    Ok(CommandContext {
        output,
        project_root: project_root.to_path_buf(),
        db_path,
        collection,
        max_depth: config.project.hierarchy.max_depth,
    })
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    match run(&cli) {
        // Already rendered on stderr; exit without anyhow printing it again.
        Err(e) if e.is::<ErrorRendered>() => process::exit(1),
        result => result,
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    if let Commands::Completions(args) = &cli.command {
        let mut command = Cli::command();
        return cmd::completions::run_completions(args.shell, &mut command);
    }

    let project_root = env::current_dir()?;
    let ctx = build_context(cli, &project_root)?;

    match &cli.command {
        Commands::Init(args) => cmd::init::run_init(args, &ctx),
        Commands::Add(args) => cmd::add::run_add(args, &ctx),
        Commands::Move(args) => cmd::move_cmd::run_move(args, &ctx),
        Commands::Rm(args) => cmd::rm::run_rm(args, &ctx),
        Commands::Check(args) => cmd::check::run_check(args, &ctx),
        Commands::Ancestors(args) => cmd::ancestors::run_ancestors(args, &ctx),
        Commands::Descendants(args) => cmd::descendants::run_descendants(args, &ctx),
        Commands::Collections => cmd::collections::run_collections(&ctx),
        Commands::Verify => cmd::verify::run_verify(&ctx),
        Commands::Completions(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_flag_parses_before_and_after_subcommand() {
        let cli = Cli::parse_from(["lineage", "--json", "verify"]);
        assert!(cli.json);
        let cli = Cli::parse_from(["lineage", "verify", "--json"]);
        assert!(cli.json);
    }

    #[test]
    fn format_flag_parses() {
        let cli = Cli::parse_from(["lineage", "ancestors", "x", "--format", "text"]);
        assert_eq!(cli.format, Some(OutputMode::Text));
    }

    #[test]
    fn db_and_collection_are_global() {
        let cli = Cli::parse_from([
            "lineage",
            "add",
            "x",
            "--db",
            "/tmp/h.db",
            "--collection",
            "pipeline_stages",
        ]);
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/h.db")));
        assert_eq!(cli.collection.as_deref(), Some("pipeline_stages"));
    }

    #[test]
    fn move_requires_parent() {
        assert!(Cli::try_parse_from(["lineage", "move", "x"]).is_err());
    }

    #[test]
    fn completions_subcommand_parses() {
        let cli = Cli::parse_from(["lineage", "completions", "bash"]);
        assert!(matches!(
            cli.command,
            Commands::Completions(cmd::completions::CompletionsArgs {
                shell: clap_complete::Shell::Bash,
            })
        ));
    }

    #[test]
    fn all_subcommands_listed() {
        let subcommands = [
            vec!["lineage", "init"],
            vec!["lineage", "add", "x"],
            vec!["lineage", "add", "x", "--parent", "p", "--label", "X"],
            vec!["lineage", "move", "x", "--parent", "p"],
            vec!["lineage", "move", "x", "--parent", "none"],
            vec!["lineage", "rm", "x"],
            vec!["lineage", "check", "x", "--parent", "p"],
            vec!["lineage", "ancestors", "x"],
            vec!["lineage", "descendants", "x"],
            vec!["lineage", "collections"],
            vec!["lineage", "verify"],
            vec!["lineage", "completions", "zsh"],
        ];
        for args in &subcommands {
            let result = Cli::try_parse_from(args.iter());
            assert!(result.is_ok(), "Failed to parse: {args:?}: {:?}", result.err());
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
