use anyhow::Result;
use declarative::{DiffSummary, ResourceDiff, Snapshot, compute_diffs};
use serde::Serialize;

use crate::Context;
use crate::cli::StateArgs;
use crate::engine::differ::display_diff;
use crate::paths;
use crate::resource::KindPolicy;
use crate::state::StateFile;
use crate::ui;

#[derive(Serialize)]
struct DiffReport<'a> {
    summary: DiffSummary,
    changes: &'a [ResourceDiff],
}

pub fn run(ctx: &Context, args: &StateArgs) -> Result<()> {
    let validated = super::load_validated(ctx, &args.source)?;
    let state_path = paths::resolve_or(args.state.as_deref(), paths::snapshot_file)?;

    let prior = match StateFile::load(&state_path)? {
        Some(state) => {
            if !ctx.quiet && !args.json {
                ui::dim(&format!(
                    "Comparing against snapshot recorded {} from {}",
                    state.recorded_at.format("%Y-%m-%d %H:%M:%S UTC"),
                    state.source
                ));
            }
            state.snapshot
        }
        None => {
            if !ctx.quiet && !args.json {
                ui::warn(&format!(
                    "No snapshot at {}; every resource is new",
                    state_path.display()
                ));
            }
            Snapshot::default()
        }
    };

    let diffs = compute_diffs(&prior, &validated.loaded.graph, &KindPolicy)?;

    if args.json {
        let report = DiffReport {
            summary: DiffSummary::from_diffs(&diffs),
            changes: &diffs,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        display_diff(&diffs);
    }
    Ok(())
}
