use anyhow::Result;
use declarative::ExecutionPlan;

use crate::Context;
use crate::cli::PlanArgs;
use crate::engine::planner::display_plan;
use crate::ui;

pub fn create(ctx: &Context, args: &PlanArgs) -> Result<()> {
    let validated = super::load_validated(ctx, &args.source)?;
    let graph = &validated.loaded.graph;
    let plan = ExecutionPlan::create(graph)?.filter_by_targets(graph, &args.target)?;
    show(ctx, args, &plan, graph)
}

pub fn destroy(ctx: &Context, args: &PlanArgs) -> Result<()> {
    let validated = super::load_validated(ctx, &args.source)?;
    let graph = &validated.loaded.graph;
    let plan = ExecutionPlan::destroy(graph)?.filter_by_targets(graph, &args.target)?;
    show(ctx, args, &plan, graph)
}

fn show(ctx: &Context, args: &PlanArgs, plan: &ExecutionPlan, graph: &declarative::Graph) -> Result<()> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(plan)?);
        return Ok(());
    }

    display_plan(plan, graph);

    if !args.target.is_empty() && !ctx.quiet {
        println!();
        ui::info(&format!(
            "Targeted {} of {}",
            ui::plural(plan.total_resources(), "resource"),
            graph.len()
        ));
    }
    Ok(())
}
