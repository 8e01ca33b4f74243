mod cli;
mod commands;
mod engine;
mod error;
mod paths;
mod resource;
mod schema;
mod state;
mod ui;
mod variables;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use std::io;
use std::process::ExitCode;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
    };

    match run(&ctx, cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            ui::error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

fn run(ctx: &Context, command: Command) -> Result<()> {
    match command {
        Command::Validate(args) => commands::validate::run(ctx, &args),
        Command::Plan(args) => commands::plan::create(ctx, &args),
        Command::Destroy(args) => commands::plan::destroy(ctx, &args),
        Command::Graph(args) => commands::graph::run(ctx, &args),
        Command::Outputs(args) => commands::outputs::run(ctx, &args),
        Command::Diff(args) => commands::diff::run(ctx, &args),
        Command::Snapshot(args) => commands::snapshot::run(ctx, &args),
        Command::Kinds { kind } => commands::kinds::run(kind.as_deref()),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "infragraph", &mut io::stdout());
            Ok(())
        }
    }
}
