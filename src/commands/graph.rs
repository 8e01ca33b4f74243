use anyhow::Result;
use colored::Colorize;
use declarative::{Graph, NodeId, Order};
use std::fmt::Write as _;

use crate::Context;
use crate::cli::{GraphArgs, GraphFormat};
use crate::ui;

pub fn run(ctx: &Context, args: &GraphArgs) -> Result<()> {
    let validated = super::load_validated(ctx, &args.source)?;
    let graph = &validated.loaded.graph;
    let components = declarative::components(graph)?;

    match args.format {
        GraphFormat::Dot => print!("{}", to_dot(graph, &components)),
        GraphFormat::Text => display_text(graph, &validated.order, &components),
    }
    Ok(())
}

fn display_text(graph: &Graph, order: &Order, components: &[Vec<NodeId>]) {
    ui::header(&format!(
        "{} in {}",
        ui::plural(graph.len(), "resource"),
        ui::plural(components.len(), "independent component")
    ));

    for (i, component) in components.iter().enumerate() {
        ui::section(&format!("Component {} ({})", i + 1, ui::plural(component.len(), "resource")));
        for id in order.creation().iter().filter(|id| component.contains(id)) {
            let deps = graph.get(id).map(|n| n.dependencies()).unwrap_or_default();
            if deps.is_empty() {
                println!("  {id}");
            } else {
                let names: Vec<String> = deps.iter().map(ToString::to_string).collect();
                println!("  {id} {} {}", "→".dimmed(), names.join(", ").dimmed());
            }
        }
    }
}

/// Render the graph in Graphviz DOT format, one cluster per component.
///
/// Edges point from a resource to what it depends on.
pub fn to_dot(graph: &Graph, components: &[Vec<NodeId>]) -> String {
    let mut out = String::from("digraph infragraph {\n  rankdir=LR;\n  node [shape=box];\n");

    for (i, component) in components.iter().enumerate() {
        let _ = writeln!(out, "  subgraph cluster_{i} {{");
        let _ = writeln!(out, "    label=\"component {}\";", i + 1);
        for id in component {
            let _ = writeln!(out, "    \"{id}\";");
        }
        out.push_str("  }\n");
    }

    for node in graph.nodes() {
        for dep in node.dependencies() {
            let _ = writeln!(out, "  \"{}\" -> \"{dep}\";", node.id);
        }
    }

    out.push_str("}\n");
    out
}
