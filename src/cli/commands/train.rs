use std::path::PathBuf;

use clap::Args;
use tracing::info;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_json, robot_ok};
use crate::error::Result;
use crate::recommender::{
    ActionCatalog, ContextSampler, FEATURE_DIM, HeuristicRewarder, JsonFileStore, LinUcb,
    OneHotEncoder, PolicyConfig, PolicyStore, TrainOptions, train,
};

#[derive(Args, Debug, Default)]
pub struct TrainArgs {
    /// Number of simulated interactions
    #[arg(long)]
    pub steps: Option<u64>,

    /// Exploration strength for the new policy
    #[arg(long)]
    pub alpha: Option<f64>,

    /// Standard deviation of the simulated reward noise
    #[arg(long)]
    pub noise: Option<f64>,

    /// Seed for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write the policy here instead of the configured path
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub fn run(ctx: &AppContext, args: &TrainArgs) -> Result<()> {
    let settings = &ctx.config.train;
    let steps = args.steps.unwrap_or(settings.steps);
    let alpha = args.alpha.unwrap_or(ctx.config.policy.alpha);
    let noise = args.noise.unwrap_or(settings.noise);
    let seed = args.seed.or(settings.seed);
    let out = args.out.clone().unwrap_or_else(|| ctx.policy_path());

    let catalog = ctx.load_catalog()?;
    let mut engine = LinUcb::new(PolicyConfig {
        alpha,
        d: FEATURE_DIM,
        n_actions: catalog.count(),
    })?;
    // Distinct streams for contexts and reward noise.
    let mut sampler = ContextSampler::new(seed);
    let mut rewards = HeuristicRewarder::new(catalog.clone(), noise, seed.map(|s| s ^ 1))?;

    info!(steps, alpha, noise, ?seed, "training started");
    let report = train(
        &mut engine,
        &OneHotEncoder,
        &mut rewards,
        &mut sampler,
        TrainOptions {
            steps,
            log_every: settings.log_every,
        },
    )?;

    let store = JsonFileStore::new(out.clone());
    store.save(&engine.export())?;
    info!(path = %out.display(), "policy saved");

    if ctx.robot_mode {
        let pulls: Vec<_> = report
            .pulls
            .iter()
            .enumerate()
            .map(|(action, count)| {
                serde_json::json!({
                    "model_id": catalog.id_of(action),
                    "pulls": count,
                })
            })
            .collect();
        emit_json(&robot_ok(serde_json::json!({
            "path": out.display().to_string(),
            "steps": report.steps,
            "alpha": alpha,
            "noise": noise,
            "seed": seed,
            "mean_reward": report.mean_reward,
            "tail_mean_reward": report.tail_mean_reward,
            "pulls": pulls,
        })))
    } else {
        let mut layout = HumanLayout::new();
        layout
            .title("Training Complete")
            .kv("Policy", &out.display().to_string())
            .kv("Steps", &report.steps.to_string())
            .kv("Alpha", &format!("{alpha:.3}"))
            .kv("Mean reward", &format!("{:.4}", report.mean_reward))
            .kv("Tail mean reward", &format!("{:.4}", report.tail_mean_reward))
            .blank()
            .section("Pulls");
        for (action, count) in report.pulls.iter().enumerate() {
            layout.kv(catalog.id_of(action).unwrap_or("?"), &count.to_string());
        }
        emit_human(layout);
        Ok(())
    }
}
