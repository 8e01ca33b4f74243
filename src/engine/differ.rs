//! Diff display

use crate::ui;
use colored::{ColoredString, Colorize};
use declarative::{Action, DiffSummary, ResourceDiff, group_by_type};

fn colored_symbol(action: Action) -> ColoredString {
    match action {
        Action::Create => action.symbol().green(),
        Action::Update => action.symbol().yellow(),
        Action::Replace => action.symbol().magenta(),
        Action::Delete => action.symbol().red(),
    }
}

/// Display a list of diffs in a user-friendly format
pub fn display_diff(diffs: &[ResourceDiff]) {
    if diffs.is_empty() {
        println!();
        println!("  {} No changes. The snapshot matches the declaration.", "✓".green());
        return;
    }

    let by_type = group_by_type(diffs);

    println!();
    println!(
        "┌─ {} ─────────────────────────────────────────┐",
        "Snapshot Diff".bold()
    );
    println!("│");

    for (resource_type, type_diffs) in &by_type {
        println!("│ {}", resource_type.bold());

        for diff in type_diffs {
            let note = match diff.action {
                Action::Create => "(will create)".to_string(),
                Action::Delete => "(will destroy)".to_string(),
                Action::Update => format!("(update {})", ui::plural(diff.changes.len(), "attribute")),
                Action::Replace => "(destroy, then create)".to_string(),
            };
            println!(
                "│   {} {:<36} {}",
                colored_symbol(diff.action),
                diff.resource_id.to_string(),
                note.dimmed()
            );

            for change in &diff.changes {
                let before = change.before.as_ref().map_or_else(|| "(none)".to_string(), ui::format_value);
                let after = change.after.as_ref().map_or_else(|| "(none)".to_string(), ui::format_value);
                let forces = if change.forces_replacement {
                    " # forces replacement".red().to_string()
                } else {
                    String::new()
                };
                println!(
                    "│       {}: {} → {}{}",
                    change.name,
                    ui::truncate(&before, 40).dimmed(),
                    ui::truncate(&after, 40),
                    forces
                );
            }
            for dep in &diff.replaced_dependencies {
                println!("│       {} {}", "depends on replaced".dimmed(), dep);
            }
        }
        println!("│");
    }

    let summary = DiffSummary::from_diffs(diffs);
    println!("├─────────────────────────────────────────────────────┤");
    println!(
        "│ Summary: {} to create, {} to update, {} to replace, {} to destroy",
        summary.additions.to_string().green(),
        summary.modifications.to_string().yellow(),
        summary.replacements.to_string().magenta(),
        summary.removals.to_string().red()
    );
    println!("└─────────────────────────────────────────────────────┘");
}
