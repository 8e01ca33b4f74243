use anyhow::Result;
use colored::Colorize;
use declarative::Value;

use crate::Context;
use crate::cli::SourceArgs;
use crate::engine::Output;
use crate::ui;

pub fn run(ctx: &Context, args: &SourceArgs) -> Result<()> {
    let validated = super::load_validated(ctx, args)?;
    let outputs = &validated.loaded.outputs;

    if outputs.is_empty() {
        ui::info("No outputs declared");
        return Ok(());
    }

    ui::header("Outputs");
    for output in outputs {
        println!("  {} = {}", output.name.bold(), render(output));
        if !output.description.is_empty() {
            ui::dim(&format!("  {}", output.description));
        }
    }
    Ok(())
}

/// Value as it will read once the graph is applied
fn render(output: &Output) -> String {
    match &output.value {
        Value::Reference(r) => format!("{} {}", ui::KNOWN_AFTER_APPLY.dimmed(), r.to_string().dimmed()),
        other => ui::format_value(other),
    }
}
