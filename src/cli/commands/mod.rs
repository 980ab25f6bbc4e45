//! CLI command implementations
//!
//! Each subcommand has its own module with:
//! - Args struct for command-line arguments
//! - run() function to execute the command

use std::path::Path;

pub mod catalog;
pub mod completions;
pub mod feedback;
pub mod policy;
pub mod recommend;
pub mod serve;
pub mod train;

use crate::app::AppContext;
use crate::cli::Commands;
use crate::error::{RecError, Result};
use crate::recommender::Context;

pub fn run(ctx: &AppContext, command: &Commands) -> Result<()> {
    match command {
        Commands::Train(args) => train::run(ctx, args),
        Commands::Recommend(args) => recommend::run(ctx, args),
        Commands::Feedback(args) => feedback::run(ctx, args),
        Commands::Catalog(args) => catalog::run(ctx, args),
        Commands::Policy(args) => policy::run(ctx, args),
        Commands::Serve(args) => serve::run(ctx, args),
        Commands::Completions(args) => completions::run(args),
    }
}

/// Parse a `--ctx` value: inline JSON when it starts with `{`, otherwise a file path.
pub fn read_context(raw: &str) -> Result<Context> {
    if raw.trim_start().starts_with('{') {
        return Context::from_json(raw);
    }
    let path = Path::new(raw);
    if !path.exists() {
        return Err(RecError::InvalidArgument(format!(
            "--ctx is neither inline JSON nor an existing file: {raw}"
        )));
    }
    Context::from_json(&std::fs::read_to_string(path)?)
}
