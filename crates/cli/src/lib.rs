//! JSHunter CLI library, exposed for integration tests

pub mod commands;
pub mod output;
pub mod progress;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "jshunter")]
#[command(about = "Find endpoints, GraphQL operations and DOM sinks in JavaScript", long_about = None)]
#[command(version = jshunter_core::VERSION)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Files or directories to analyze (default: current directory)
    pub paths: Vec<PathBuf>,

    /// Minimum confidence for reported URLs (0.0 - 1.0)
    #[arg(short = 'c', long)]
    pub confidence: Option<f64>,

    /// Maximum traversal depth
    #[arg(short = 'd', long)]
    pub depth: Option<usize>,

    /// Path to a .jshunter.toml (default: nearest one found upwards)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Single-line JSON output
    #[arg(long)]
    pub compact: bool,

    /// Show debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress logging and progress output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize .jshunter.toml configuration
    Init {
        /// Path to initialize (default: current directory)
        path: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    Terminal,
}

impl OutputFormat {
    /// Parse the `[output] format` value from `.jshunter.toml`
    pub fn from_config(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "terminal" | "text" => Some(Self::Terminal),
            _ => None,
        }
    }
}
