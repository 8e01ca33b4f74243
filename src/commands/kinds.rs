use anyhow::{Result, bail};
use colored::Colorize;

use crate::resource::{self, AttrType, ResourceKind};
use crate::ui;

pub fn run(kind: Option<&str>) -> Result<()> {
    match kind {
        Some(name) => {
            let Some(kind) = resource::kind(name) else {
                let known: Vec<&str> = resource::kinds().iter().map(|k| k.name()).collect();
                bail!("Unknown resource kind '{}'. Known kinds: {}", name, known.join(", "));
            };
            show(kind);
        }
        None => {
            ui::header("Resource kinds");
            for kind in resource::kinds() {
                println!("  {:<22} {}", kind.name().bold(), kind.description().dimmed());
            }
            println!();
            ui::dim("Run `infragraph kinds <kind>` for attributes");
        }
    }
    Ok(())
}

fn show(kind: &dyn ResourceKind) {
    ui::header(kind.name());
    println!("  {}", kind.description());

    ui::section("Attributes");
    for spec in kind.attributes() {
        let mut flags = Vec::new();
        if spec.required {
            flags.push("required".yellow().to_string());
        }
        if spec.forces_replacement {
            flags.push("forces replacement".red().to_string());
        }
        println!("  {:<28} {:<28} {}", spec.name, type_label(spec.ty).dimmed(), flags.join(", "));
    }

    ui::section("Exports");
    println!("  {}", kind.exports().join(", "));
}

fn type_label(ty: AttrType) -> String {
    match ty {
        AttrType::String => "string".to_string(),
        AttrType::Bool => "bool".to_string(),
        AttrType::Integer => "integer".to_string(),
        AttrType::Block => "cidr block".to_string(),
        AttrType::Map => "table".to_string(),
        AttrType::List => "list".to_string(),
        AttrType::Ref(kind) => format!("ref {kind}"),
        AttrType::RefList(kind) => format!("[ref {kind}]"),
    }
}
