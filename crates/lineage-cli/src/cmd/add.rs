//! `lineage add`: create a node, optionally under an existing parent.

use super::CommandContext;
use crate::output::render;
use crate::validate;
use clap::Args;
use serde::Serialize;

#[derive(Args, Debug)]
pub struct AddArgs {
    /// ID of the new node.
    pub id: String,

    /// Existing node to place the new node under. Omit for a root.
    #[arg(long)]
    pub parent: Option<String>,

    /// Optional display label stored with the node.
    #[arg(long)]
    pub label: Option<String>,
}

#[derive(Debug, Serialize)]
struct AddResult<'a> {
    ok: bool,
    collection: &'a str,
    node_id: &'a str,
    parent_id: Option<&'a str>,
    label: Option<&'a str>,
}

pub fn run_add(args: &AddArgs, ctx: &CommandContext) -> anyhow::Result<()> {
    if let Err(e) = validate::validate_node_id("id", &args.id) {
        return ctx.fail_validation(&e);
    }
    if let Some(parent) = &args.parent {
        if let Err(e) = validate::validate_node_id("parent", parent) {
            return ctx.fail_validation(&e);
        }
    }
    if let Some(label) = &args.label {
        if let Err(e) = validate::validate_label(label) {
            return ctx.fail_validation(&e);
        }
    }

    let conn = ctx.open_store()?;
    let store = ctx.hierarchy(&conn);
    if let Err(e) = store.add_node(&args.id, args.parent.as_deref(), args.label.as_deref()) {
        return ctx.fail_hierarchy(&e);
    }

    let result = AddResult {
        ok: true,
        collection: store.collection(),
        node_id: &args.id,
        parent_id: args.parent.as_deref(),
        label: args.label.as_deref(),
    };
    render(ctx.output, &result, |r, w| match r.parent_id {
        Some(parent) => writeln!(w, "✓ {}: added under {parent}", r.node_id),
        None => writeln!(w, "✓ {}: added as root", r.node_id),
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
        args: AddArgs,
    }

    #[test]
    fn add_args_parse() {
        let w = Wrapper::parse_from(["test", "acme", "--parent", "holding", "--label", "Acme"]);
        assert_eq!(w.args.id, "acme");
        assert_eq!(w.args.parent.as_deref(), Some("holding"));
        assert_eq!(w.args.label.as_deref(), Some("Acme"));
    }

    #[test]
    fn add_root_then_child() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());

        run_add(&Wrapper::parse_from(["test", "holding"]).args, &ctx).unwrap();
        run_add(&Wrapper::parse_from(["test", "acme", "--parent", "holding"]).args, &ctx).unwrap();

        let conn = ctx.open_store().unwrap();
        assert_eq!(ctx.hierarchy(&conn).ancestors("acme").unwrap(), vec!["holding"]);
    }

    #[test]
    fn add_under_missing_parent_fails() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        let err = run_add(&Wrapper::parse_from(["test", "acme", "--parent", "ghost"]).args, &ctx)
            .unwrap_err();
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn add_rejects_whitespace_id() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        assert!(run_add(&Wrapper::parse_from(["test", "two words"]).args, &ctx).is_err());
    }
}
