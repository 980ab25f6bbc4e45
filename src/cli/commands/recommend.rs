use clap::Args;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_json, robot_ok};
use crate::error::Result;

use super::read_context;

#[derive(Args, Debug)]
pub struct RecommendArgs {
    /// Request context as inline JSON or a path to a JSON file
    #[arg(long)]
    pub ctx: String,

    /// Number of models to return
    #[arg(long)]
    pub top_k: Option<usize>,
}

pub fn run(ctx: &AppContext, args: &RecommendArgs) -> Result<()> {
    let context = read_context(&args.ctx)?;
    let top_k = args.top_k.unwrap_or(ctx.config.serve.top_k);
    let recommender = ctx.open_recommender()?;
    let ranked = recommender.recommend(&context, top_k)?;

    if ctx.robot_mode {
        emit_json(&robot_ok(serde_json::json!({
            "context": context,
            "top_k": top_k,
            "recommendations": ranked,
        })))
    } else {
        let mut layout = HumanLayout::new();
        layout.title("Recommendations");
        for rec in &ranked {
            layout.kv(
                &format!("{}. {}", rec.rank, rec.model_id),
                &format!(
                    "score {:.4} (mean {:.4} + bonus {:.4})",
                    rec.score, rec.mean, rec.bonus
                ),
            );
        }
        emit_human(layout);
        Ok(())
    }
}
