//! `lineage collections`: node counts per collection.

use super::CommandContext;
use crate::output::render_mode;
use lineage_core::db::query;

pub fn run_collections(ctx: &CommandContext) -> anyhow::Result<()> {
    let conn = ctx.open_store()?;
    let collections = query::list_collections(&conn)?;

    render_mode(
        ctx.output,
        &collections,
        |rows, w| {
            for row in rows {
                writeln!(w, "{}\t{}", row.collection, row.nodes)?;
            }
            Ok(())
        },
        |rows, w| {
            if rows.is_empty() {
                return writeln!(w, "No nodes yet. Add one with `lineage add <id>`.");
            }
            for row in rows {
                let marker = if row.collection == ctx.collection { "*" } else { " " };
                writeln!(w, "{marker} {:<24} {:>8} node(s)", row.collection, row.nodes)?;
            }
            Ok(())
        },
    )
}
