use crate::paths;
use crate::variables;
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "infragraph")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Validate and order declarative network and compute resources", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Load a declaration, resolve its dependencies and check every resource
    Validate(SourceArgs),

    /// Show the creation order grouped into parallel waves
    Plan(PlanArgs),

    /// Show the destruction order
    Destroy(PlanArgs),

    /// Show connected components and dependency edges
    Graph(GraphArgs),

    /// Show declared outputs
    Outputs(SourceArgs),

    /// Compare the declaration against a recorded snapshot
    Diff(StateArgs),

    /// Record the declared graph as the applied snapshot
    Snapshot(StateArgs),

    /// List supported resource kinds and their attributes
    Kinds {
        /// Only show this kind
        kind: Option<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ============================================================================
// Shared Arguments
// ============================================================================

#[derive(Args, Clone)]
pub struct SourceArgs {
    /// Declaration file
    #[arg(short, long, env = paths::ENV_FILE, default_value = paths::DEFAULT_FILE)]
    pub file: PathBuf,

    /// Set a variable (NAME=VALUE); repeatable
    #[arg(long = "var", value_name = "NAME=VALUE", value_parser = variables::parse_override)]
    pub vars: Vec<(String, String)>,
}

#[derive(Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Only plan these targets: "kind" or "kind.name"; repeatable
    #[arg(short, long)]
    pub target: Vec<String>,

    /// Print the plan as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct GraphArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output format
    #[arg(long, value_enum, default_value_t = GraphFormat::Text)]
    pub format: GraphFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GraphFormat {
    Text,
    Dot,
}

#[derive(Args)]
pub struct StateArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Snapshot file (default: state directory)
    #[arg(short, long)]
    pub state: Option<PathBuf>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_plan_args() {
        let cli = Cli::try_parse_from([
            "infragraph",
            "-vv",
            "plan",
            "--file",
            "net.toml",
            "--var",
            "env=prod",
            "--target",
            "subnet",
            "--target",
            "instance.web",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        let Command::Plan(args) = cli.command else {
            panic!("expected plan");
        };
        assert_eq!(args.source.file, PathBuf::from("net.toml"));
        assert_eq!(args.source.vars, vec![("env".to_string(), "prod".to_string())]);
        assert_eq!(args.target, vec!["subnet", "instance.web"]);
        assert!(!args.json);
    }

    #[test]
    fn test_bad_var_rejected() {
        assert!(Cli::try_parse_from(["infragraph", "validate", "--var", "novalue"]).is_err());
    }

    #[test]
    fn test_graph_format() {
        let cli = Cli::try_parse_from(["infragraph", "graph", "--format", "dot", "-f", "x.toml"]).unwrap();
        let Command::Graph(args) = cli.command else {
            panic!("expected graph");
        };
        assert!(args.format == GraphFormat::Dot);
    }
}
