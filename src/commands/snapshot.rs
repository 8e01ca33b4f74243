use anyhow::Result;

use crate::Context;
use crate::cli::StateArgs;
use crate::paths;
use crate::state::StateFile;
use crate::ui;

pub fn run(ctx: &Context, args: &StateArgs) -> Result<()> {
    let validated = super::load_validated(ctx, &args.source)?;
    let state_path = paths::resolve_or(args.state.as_deref(), paths::snapshot_file)?;

    let state = StateFile::record(&validated.loaded.graph, &validated.path);
    state.save(&state_path)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&state)?);
    } else if !ctx.quiet {
        ui::success(&format!(
            "Recorded {} to {}",
            ui::plural(validated.loaded.graph.len(), "resource"),
            state_path.display()
        ));
    }
    Ok(())
}
