//! `lineage rm`: remove a leaf node.

use super::CommandContext;
use crate::output::render;
use crate::validate;
use clap::Args;
use serde_json::json;

#[derive(Args, Debug)]
pub struct RmArgs {
    /// Node ID to remove. Must have no children.
    pub id: String,
}

pub fn run_rm(args: &RmArgs, ctx: &CommandContext) -> anyhow::Result<()> {
    if let Err(e) = validate::validate_node_id("id", &args.id) {
        return ctx.fail_validation(&e);
    }

    let conn = ctx.open_store()?;
    if let Err(e) = ctx.hierarchy(&conn).remove_node(&args.id) {
        return ctx.fail_hierarchy(&e);
    }

    let val = json!({ "ok": true, "node_id": args.id });
    render(ctx.output, &val, |v, w| {
        writeln!(w, "✓ {}: removed", v["node_id"].as_str().unwrap_or(""))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::test_support::context;

    #[test]
    fn rm_refuses_parents_and_removes_leaves() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        {
            let conn = ctx.open_store().unwrap();
            let store = ctx.hierarchy(&conn);
            store.add_node("root", None, None).unwrap();
            store.add_node("leaf", Some("root"), None).unwrap();
        }

        let err = run_rm(&RmArgs { id: "root".to_string() }, &ctx).unwrap_err();
        assert!(err.to_string().contains("child"));

        run_rm(&RmArgs { id: "leaf".to_string() }, &ctx).unwrap();
        run_rm(&RmArgs { id: "root".to_string() }, &ctx).unwrap();

        let conn = ctx.open_store().unwrap();
        assert_eq!(ctx.hierarchy(&conn).node_count().unwrap(), 0);
    }
}
