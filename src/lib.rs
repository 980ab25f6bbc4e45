//! llmrec - contextual-bandit recommender for picking an LLM per request.
//!
//! The core lives in [`recommender`]; the remaining modules wire it to
//! configuration, persistence paths and the `llmrec` command line.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod recommender;
pub mod test_utils;

pub use error::{RecError, Result};
