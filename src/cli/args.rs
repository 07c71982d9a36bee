//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand};

use crate::cli::commands::{
    completions::CompletionsArgs, config::ConfigArgs, create::CreateArgs, info::InfoArgs,
    init::InitArgs, list::ListCommands, search::SearchArgs, sync::SyncArgs,
};

#[derive(Parser)]
#[command(name = "linear")]
#[command(author, version, about = "Command-line client for Linear")]
#[command(long_about = "Create, search and inspect Linear issues from the terminal, using a local cache of teams, workflow states, users and projects.")]
#[command(propagate_version = true)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Print JSON output
    #[arg(long, global = true)]
    pub json: bool,

    /// Show request timings and debug logs
    #[arg(long, global = true)]
    pub debug: bool,

    /// Request timeout in seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Store an API key and sync all reference data
    Init(InitArgs),

    /// Refresh cached reference data
    Sync(SyncArgs),

    /// Set a value in the cached configuration
    Config(ConfigArgs),

    /// Create an issue
    Create(CreateArgs),

    /// Search issues
    Search(SearchArgs),

    /// Show one issue
    Info(InfoArgs),

    /// List cached reference data as launcher items
    #[command(subcommand)]
    List(ListCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}
