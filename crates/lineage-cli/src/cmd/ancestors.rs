//! `lineage ancestors`: print a node's chain up to its root.

use super::CommandContext;
use crate::output::render_mode;
use crate::validate;
use clap::Args;
use serde::Serialize;

#[derive(Args, Debug)]
pub struct AncestorsArgs {
    /// Node whose ancestors to list.
    pub id: String,
}

#[derive(Debug, Serialize)]
struct AncestorsResult {
    node_id: String,
    ancestors: Vec<String>,
}

pub fn run_ancestors(args: &AncestorsArgs, ctx: &CommandContext) -> anyhow::Result<()> {
    if let Err(e) = validate::validate_node_id("id", &args.id) {
        return ctx.fail_validation(&e);
    }

    let conn = ctx.open_store()?;
    let ancestors = match ctx.hierarchy(&conn).ancestors(&args.id) {
        Ok(chain) => chain,
        Err(e) => return ctx.fail_hierarchy(&e),
    };

    let result = AncestorsResult {
        node_id: args.id.clone(),
        ancestors,
    };
    render_mode(
        ctx.output,
        &result,
        |r, w| {
            for id in &r.ancestors {
                writeln!(w, "{id}")?;
            }
            Ok(())
        },
        |r, w| {
            if r.ancestors.is_empty() {
                return writeln!(w, "{} is a root", r.node_id);
            }
            writeln!(w, "{} → {}", r.node_id, r.ancestors.join(" → "))
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::test_support::context;

    #[test]
    fn corrupt_chain_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        let conn = ctx.open_store().unwrap();
        let store = ctx.hierarchy(&conn);
        store.add_node("P", None, None).unwrap();
        store.add_node("Q", Some("P"), None).unwrap();
        conn.execute(
            "UPDATE nodes SET parent_id = 'Q' WHERE node_id = 'P'",
            [],
        )
        .unwrap();

        let err = run_ancestors(&AncestorsArgs { id: "Q".to_string() }, &ctx).unwrap_err();
        assert!(err.to_string().contains("corrupt hierarchy"));
    }

    #[test]
    fn root_has_no_ancestors() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        {
            let conn = ctx.open_store().unwrap();
            ctx.hierarchy(&conn).add_node("solo", None, None).unwrap();
        }
        run_ancestors(&AncestorsArgs { id: "solo".to_string() }, &ctx).unwrap();
    }
}
