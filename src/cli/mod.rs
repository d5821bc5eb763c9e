//! CLI Module
//!
//! Command-line interface for driving a paint session from a script.

pub mod commands;
pub mod script;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::store::CompositionPolicy;

/// Layerpaint - layer-composition canvas with undo, redo and replay
#[derive(Parser, Debug)]
#[command(name = "layerpaint")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the layer catalog in application order
    #[command(name = "layers")]
    Layers,

    /// Run a paint script and print the resulting canvas
    #[command(name = "run")]
    Run(RunArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Path to the paint script
    pub script: PathBuf,

    /// JSON session config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Composition policy (overrides the config file)
    #[arg(short, long, value_enum)]
    pub policy: Option<CompositionPolicy>,

    /// Canvas width (overrides the config file)
    #[arg(long)]
    pub width: Option<usize>,

    /// Canvas height (overrides the config file)
    #[arg(long)]
    pub height: Option<usize>,

    /// Timestamp passed to every layer transform when rendering
    #[arg(short, long, default_value_t = 0)]
    pub timestamp: u64,

    /// Replay the log onto a fresh canvas and compare fingerprints
    #[arg(long)]
    pub verify_replay: bool,

    /// List the undo and redo stacks with their recording times
    #[arg(long)]
    pub show_history: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_args() {
        let cli = Cli::parse_from([
            "layerpaint",
            "run",
            "strokes.txt",
            "--policy",
            "add",
            "--width",
            "8",
            "--verify-replay",
            "--show-history",
        ]);

        match cli.command {
            Some(Commands::Run(args)) => {
                assert_eq!(args.script, PathBuf::from("strokes.txt"));
                assert_eq!(args.policy, Some(CompositionPolicy::Accumulate));
                assert_eq!(args.width, Some(8));
                assert_eq!(args.height, None);
                assert!(args.verify_replay);
                assert!(args.show_history);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_layers() {
        let cli = Cli::parse_from(["layerpaint", "-v", "layers"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Some(Commands::Layers)));
    }
}
