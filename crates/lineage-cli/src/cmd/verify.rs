//! `lineage verify`: integrity scan of one collection.

use super::CommandContext;
use crate::output::{CliError, render_mode};
use lineage_core::verify::{VerifyReport, verify_collection};
use std::io::{self, Write};

fn write_findings(r: &VerifyReport, w: &mut dyn Write) -> io::Result<()> {
    for cycle in &r.cycles {
        writeln!(w, "cycle: {} → {}", cycle.join(" → "), cycle[0])?;
    }
    for node in &r.corrupt_nodes {
        writeln!(w, "corrupt: {node}")?;
    }
    for d in &r.dangling {
        writeln!(w, "dangling: {} → {}", d.node_id, d.parent_id)?;
    }
    Ok(())
}

/// Exits non-zero when the scan finds anything.
pub fn run_verify(ctx: &CommandContext) -> anyhow::Result<()> {
    let conn = ctx.open_store()?;
    let snapshot = match ctx.hierarchy(&conn).snapshot() {
        Ok(map) => map,
        Err(e) => return ctx.fail_hierarchy(&e),
    };

    let report = verify_collection(&snapshot);
    let collection = ctx.collection.as_str();
    render_mode(ctx.output, &report, write_findings, |r, w| {
        if r.is_clean() {
            writeln!(
                w,
                "✓ {collection}: {} node(s), {} root(s), max depth {}",
                r.nodes_checked, r.roots, r.max_depth
            )
        } else {
            writeln!(w, "✗ {collection}: integrity scan failed")?;
            write_findings(r, w)
        }
    })?;

    if report.is_clean() {
        return Ok(());
    }
    ctx.fail(&CliError::new(format!(
        "{collection}: {} cycle(s), {} corrupt node(s), {} dangling parent(s)",
        report.cycles.len(),
        report.corrupt_nodes.len(),
        report.dangling.len()
    )))
}
