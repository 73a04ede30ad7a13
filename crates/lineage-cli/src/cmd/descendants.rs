//! `lineage descendants`: breadth-first listing of everything below a node.

use super::CommandContext;
use crate::output::render_mode;
use crate::validate;
use clap::Args;
use serde::Serialize;

#[derive(Args, Debug)]
pub struct DescendantsArgs {
    /// Node whose descendants to list.
    pub id: String,
}

#[derive(Debug, Serialize)]
struct DescendantsResult {
    node_id: String,
    descendants: Vec<String>,
}

pub fn run_descendants(args: &DescendantsArgs, ctx: &CommandContext) -> anyhow::Result<()> {
    if let Err(e) = validate::validate_node_id("id", &args.id) {
        return ctx.fail_validation(&e);
    }

    let conn = ctx.open_store()?;
    let descendants = match ctx.hierarchy(&conn).descendants(&args.id) {
        Ok(nodes) => nodes,
        Err(e) => return ctx.fail_hierarchy(&e),
    };

    let result = DescendantsResult {
        node_id: args.id.clone(),
        descendants,
    };
    render_mode(
        ctx.output,
        &result,
        |r, w| {
            for id in &r.descendants {
                writeln!(w, "{id}")?;
            }
            Ok(())
        },
        |r, w| {
            writeln!(w, "{} ({} descendant(s))", r.node_id, r.descendants.len())?;
            for id in &r.descendants {
                writeln!(w, "  {id}")?;
            }
            Ok(())
        },
    )
}
