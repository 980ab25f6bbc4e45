use clap::Args;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_json, robot_ok};
use crate::error::Result;

use super::read_context;

#[derive(Args, Debug)]
pub struct FeedbackArgs {
    /// Request context as inline JSON or a path to a JSON file
    #[arg(long)]
    pub ctx: String,

    /// Catalog id of the model that served the request
    #[arg(long)]
    pub model: String,

    /// Observed reward
    #[arg(long, allow_hyphen_values = true)]
    pub reward: f64,
}

pub fn run(ctx: &AppContext, args: &FeedbackArgs) -> Result<()> {
    let context = read_context(&args.ctx)?;
    let recommender = ctx.open_recommender()?;
    recommender.feedback(&context, &args.model, args.reward)?;
    let path = ctx.policy_path();

    if ctx.robot_mode {
        emit_json(&robot_ok(serde_json::json!({
            "model_id": args.model,
            "reward": args.reward,
            "path": path.display().to_string(),
        })))
    } else {
        let mut layout = HumanLayout::new();
        layout
            .title("Feedback Recorded")
            .kv("Model", &args.model)
            .kv("Reward", &format!("{:.4}", args.reward))
            .kv("Policy", &path.display().to_string());
        emit_human(layout);
        Ok(())
    }
}
