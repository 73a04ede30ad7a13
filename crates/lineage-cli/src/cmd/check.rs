//! `lineage check`: dry run of the cycle guard.

use super::CommandContext;
use crate::output::render;
use crate::validate;
use clap::Args;
use serde::Serialize;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Node that would be moved.
    pub id: String,

    /// Candidate parent node ID, or "none".
    #[arg(long)]
    pub parent: String,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    node_id: String,
    parent_id: Option<String>,
    would_create_cycle: bool,
}

/// Prints the verdict; a would-be cycle is an answer, not a failure.
pub fn run_check(args: &CheckArgs, ctx: &CommandContext) -> anyhow::Result<()> {
    if let Err(e) = validate::validate_node_id("id", &args.id) {
        return ctx.fail_validation(&e);
    }
    let parent_id = match validate::parse_parent(&args.parent) {
        Ok(parent) => parent,
        Err(e) => return ctx.fail_validation(&e),
    };

    let conn = ctx.open_store()?;
    let store = ctx.hierarchy(&conn);
    let would_create_cycle = match store.would_create_cycle(&args.id, parent_id.as_deref()) {
        Ok(verdict) => verdict,
        Err(e) => return ctx.fail_hierarchy(&e),
    };

    let result = CheckResult {
        node_id: args.id.clone(),
        parent_id,
        would_create_cycle,
    };
    render(ctx.output, &result, |r, w| {
        let target = r.parent_id.as_deref().unwrap_or("top level");
        if r.would_create_cycle {
            writeln!(w, "✗ {} → {target}: would create a circular reference", r.node_id)
        } else {
            writeln!(w, "✓ {} → {target}: safe", r.node_id)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::test_support::context;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: CheckArgs,
    }

    #[test]
    fn check_never_writes() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        {
            let conn = ctx.open_store().unwrap();
            let store = ctx.hierarchy(&conn);
            store.add_node("root", None, None).unwrap();
            store.add_node("leaf", Some("root"), None).unwrap();
        }

        run_check(&Wrapper::parse_from(["test", "root", "--parent", "leaf"]).args, &ctx).unwrap();
        run_check(&Wrapper::parse_from(["test", "leaf", "--parent", "none"]).args, &ctx).unwrap();

        let conn = ctx.open_store().unwrap();
        let store = ctx.hierarchy(&conn);
        assert_eq!(store.ancestors("leaf").unwrap(), vec!["root"]);
        assert!(store.ancestors("root").unwrap().is_empty());
    }

    #[test]
    fn check_unknown_node_fails() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        assert!(run_check(&Wrapper::parse_from(["test", "ghost", "--parent", "none"]).args, &ctx).is_err());
    }
}
