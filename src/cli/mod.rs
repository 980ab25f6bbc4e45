//! Command-line surface for `llmrec`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod commands;
pub mod output;

#[derive(Parser, Debug)]
#[command(name = "llmrec", version, about = "Contextual-bandit LLM recommender")]
pub struct Cli {
    /// Emit JSON on stdout and JSON logs on stderr
    #[arg(long, global = true)]
    pub robot: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all logging
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Use this config file instead of the global and project layers
    #[arg(long, global = true, env = "LLMREC_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train a policy offline against the heuristic reward simulator
    Train(commands::train::TrainArgs),

    /// Rank catalog models for a request context
    Recommend(commands::recommend::RecommendArgs),

    /// Record an observed reward for a model
    Feedback(commands::feedback::FeedbackArgs),

    /// List the candidate models
    Catalog(commands::catalog::CatalogArgs),

    /// Inspect, reset or export the persisted policy
    Policy(commands::policy::PolicyArgs),

    /// Serve recommend/feedback over line-delimited JSON-RPC on stdio
    Serve(commands::serve::ServeArgs),

    /// Print shell completions
    Completions(commands::completions::CompletionsArgs),
}
