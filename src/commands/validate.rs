use anyhow::Result;
use colored::Colorize;
use std::collections::BTreeMap;

use crate::Context;
use crate::cli::SourceArgs;
use crate::ui;

pub fn run(ctx: &Context, args: &SourceArgs) -> Result<()> {
    let validated = super::load_validated(ctx, args)?;
    let graph = &validated.loaded.graph;

    if ctx.quiet {
        return Ok(());
    }

    ui::success(&format!(
        "{} is valid: {}",
        validated.path.display(),
        ui::plural(graph.len(), "resource")
    ));

    let mut by_kind: BTreeMap<&str, usize> = BTreeMap::new();
    for node in graph.nodes() {
        *by_kind.entry(node.resource_type()).or_default() += 1;
    }
    for (kind, count) in &by_kind {
        ui::kv(kind, &count.to_string());
    }

    for id in &validated.loaded.disabled {
        ui::dim(&format!("{id} is disabled"));
    }

    if ctx.verbose > 0 {
        let variables = &validated.loaded.variables;
        if !variables.is_empty() {
            ui::section("Variables");
            for (name, value) in variables.iter() {
                ui::kv(name, &value.to_string());
            }
        }

        ui::section("Creation order");
        for (i, id) in validated.order.creation().iter().enumerate() {
            println!("  {:>3}. {}", (i + 1).to_string().dimmed(), id);
        }
    }

    Ok(())
}
