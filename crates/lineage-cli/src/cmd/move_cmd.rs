//! `lineage move`: re-parent a node through the cycle guard.

use super::CommandContext;
use crate::output::render;
use crate::validate;
use clap::Args;
use serde_json::json;

#[derive(Args, Debug)]
pub struct MoveArgs {
    /// Node ID to move.
    pub id: String,

    /// New parent node ID. Use "--parent none" to make it a root.
    #[arg(long)]
    pub parent: String,
}

pub fn run_move(args: &MoveArgs, ctx: &CommandContext) -> anyhow::Result<()> {
    if let Err(e) = validate::validate_node_id("id", &args.id) {
        return ctx.fail_validation(&e);
    }
    let new_parent = match validate::parse_parent(&args.parent) {
        Ok(parent) => parent,
        Err(e) => return ctx.fail_validation(&e),
    };

    let conn = ctx.open_store()?;
    let store = ctx.hierarchy(&conn);
    if let Err(e) = store.reparent(&args.id, new_parent.as_deref()) {
        return ctx.fail_hierarchy(&e);
    }

    let val = json!({
        "ok": true,
        "node_id": args.id,
        "parent_id": new_parent,
    });

    render(ctx.output, &val, |v, w| {
        let node = v["node_id"].as_str().unwrap_or("");
        match v["parent_id"].as_str() {
            Some(parent) => writeln!(w, "✓ {node}: moved under parent {parent}"),
            None => writeln!(w, "✓ {node}: moved to top level (no parent)"),
        }
    })
}
