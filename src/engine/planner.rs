//! Execution plan display

use crate::ui;
use colored::Colorize;
use declarative::{Direction, ExecutionPlan, Graph};

/// Display a plan wave by wave
pub fn display_plan(plan: &ExecutionPlan, graph: &Graph) {
    if plan.is_empty() {
        println!();
        println!("  {} Nothing to do", "✓".green());
        return;
    }

    let (verb, symbol) = match plan.direction {
        Direction::Create => ("create", "+".green()),
        Direction::Destroy => ("destroy", "-".red()),
    };

    ui::header(&format!(
        "Plan: {verb} {} in {}",
        ui::plural(plan.total_resources(), "resource"),
        ui::plural(plan.waves.len(), "wave")
    ));

    for (i, wave) in plan.waves.iter().enumerate() {
        println!();
        println!(
            "{} {}",
            format!("Wave {}", i + 1).cyan().bold(),
            format!("({} in parallel)", wave.len()).dimmed()
        );
        for id in wave {
            // Create waits on dependencies, destroy waits on dependents
            let waits_on = match plan.direction {
                Direction::Create => graph.get(id).map(|n| n.dependencies()).unwrap_or_default(),
                Direction::Destroy => graph.dependents(id),
            };
            let after = if waits_on.is_empty() {
                String::new()
            } else {
                let names: Vec<String> = waits_on.iter().map(ToString::to_string).collect();
                format!("after {}", names.join(", "))
            };
            println!("  {} {:<40} {}", symbol, id.to_string(), ui::truncate(&after, 60).dimmed());
        }
    }

    println!();
    println!(
        "Max parallelism: {}",
        plan.max_parallelism().to_string().bold()
    );
}
