use std::path::PathBuf;

use clap::{Args, Subcommand};
use tracing::info;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_json, robot_ok};
use crate::error::{RecError, Result};
use crate::recommender::{
    ActionCatalog, FEATURE_DIM, JsonFileStore, LinUcb, PolicyConfig, PolicyStore,
};

#[derive(Args, Debug)]
pub struct PolicyArgs {
    #[command(subcommand)]
    pub command: PolicyCommand,
}

#[derive(Subcommand, Debug)]
pub enum PolicyCommand {
    /// Show policy configuration and per-model statistics
    Stats(StatsArgs),

    /// Replace the policy with a fresh one
    Reset(ResetArgs),

    /// Print or copy the policy snapshot
    Export(ExportArgs),
}

#[derive(Args, Debug, Default)]
pub struct StatsArgs {
    /// Optional policy path
    #[arg(long)]
    pub path: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub struct ResetArgs {
    /// Optional policy path
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Exploration strength for the fresh policy
    #[arg(long)]
    pub alpha: Option<f64>,
}

#[derive(Args, Debug, Default)]
pub struct ExportArgs {
    /// Optional policy path
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Write the snapshot to this file instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub fn run(ctx: &AppContext, args: &PolicyArgs) -> Result<()> {
    match &args.command {
        PolicyCommand::Stats(args) => stats(ctx, args),
        PolicyCommand::Reset(args) => reset(ctx, args),
        PolicyCommand::Export(args) => export(ctx, args),
    }
}

fn store_for(ctx: &AppContext, path: Option<&PathBuf>) -> JsonFileStore {
    JsonFileStore::new(path.cloned().unwrap_or_else(|| ctx.policy_path()))
}

fn load_engine(store: &JsonFileStore) -> Result<LinUcb> {
    let snapshot = store.load()?.ok_or_else(|| {
        RecError::NotFound(format!("no policy at {}", store.path().display()))
    })?;
    LinUcb::import(&snapshot)
}

fn stats(ctx: &AppContext, args: &StatsArgs) -> Result<()> {
    let store = store_for(ctx, args.path.as_ref());
    let engine = load_engine(&store)?;
    let config = *engine.config();
    // Names are cosmetic here; a missing or mismatched catalog falls back to indices.
    let catalog = ctx
        .load_catalog()
        .ok()
        .filter(|c| c.count() == config.n_actions);

    let mut actions = Vec::with_capacity(config.n_actions);
    for action in 0..config.n_actions {
        let theta = engine.theta(action)?;
        let design = engine.state().design(action).ok_or_else(|| {
            RecError::MalformedState(format!("missing statistics for action {action}"))
        })?;
        // trace(A) - d is the summed squared norm of every observed feature vector.
        let evidence = (0..config.d).map(|i| design.get(i, i)).sum::<f64>() - config.d as f64;
        let theta_norm = theta.iter().map(|v| v * v).sum::<f64>().sqrt();
        actions.push(serde_json::json!({
            "action": action,
            "model_id": catalog.as_ref().and_then(|c| c.id_of(action)),
            "evidence": evidence,
            "theta_norm": theta_norm,
        }));
    }

    if ctx.robot_mode {
        emit_json(&robot_ok(serde_json::json!({
            "path": store.path().display().to_string(),
            "config": config,
            "actions": actions,
        })))
    } else {
        let mut layout = HumanLayout::new();
        layout
            .title("Policy Stats")
            .kv("Path", &store.path().display().to_string())
            .kv("Alpha", &format!("{:.3}", config.alpha))
            .kv("Features", &config.d.to_string())
            .kv("Models", &config.n_actions.to_string())
            .blank()
            .section("Per model");
        for entry in &actions {
            let label = entry["model_id"]
                .as_str()
                .map_or_else(|| format!("#{}", entry["action"]), ToString::to_string);
            layout.kv(
                &label,
                &format!(
                    "evidence {:.1}, |theta| {:.4}",
                    entry["evidence"].as_f64().unwrap_or_default(),
                    entry["theta_norm"].as_f64().unwrap_or_default()
                ),
            );
        }
        emit_human(layout);
        Ok(())
    }
}

fn reset(ctx: &AppContext, args: &ResetArgs) -> Result<()> {
    let store = store_for(ctx, args.path.as_ref());
    let config = PolicyConfig {
        alpha: args.alpha.unwrap_or(ctx.config.policy.alpha),
        d: FEATURE_DIM,
        n_actions: ctx.load_catalog()?.count(),
    };
    store.save(&LinUcb::new(config)?.export())?;
    info!(path = %store.path().display(), "policy reset");

    if ctx.robot_mode {
        emit_json(&robot_ok(serde_json::json!({
            "reset": true,
            "path": store.path().display().to_string(),
            "config": config,
        })))
    } else {
        let mut layout = HumanLayout::new();
        layout
            .title("Policy Reset")
            .kv("Path", &store.path().display().to_string())
            .kv("Alpha", &format!("{:.3}", config.alpha))
            .kv("Models", &config.n_actions.to_string());
        emit_human(layout);
        Ok(())
    }
}

fn export(ctx: &AppContext, args: &ExportArgs) -> Result<()> {
    let store = store_for(ctx, args.path.as_ref());
    let snapshot = load_engine(&store)?.export();

    match &args.out {
        Some(out) => {
            JsonFileStore::new(out.clone()).save(&snapshot)?;
            if ctx.robot_mode {
                emit_json(&robot_ok(serde_json::json!({
                    "from": store.path().display().to_string(),
                    "to": out.display().to_string(),
                })))
            } else {
                let mut layout = HumanLayout::new();
                layout
                    .title("Policy Exported")
                    .kv("From", &store.path().display().to_string())
                    .kv("To", &out.display().to_string());
                emit_human(layout);
                Ok(())
            }
        }
        // The raw snapshot is the payload in both modes so it can be piped to a file.
        None => {
            println!("{}", snapshot.to_json_pretty()?);
            Ok(())
        }
    }
}
