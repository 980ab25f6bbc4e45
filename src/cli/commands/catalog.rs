use clap::Args;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_json, robot_ok};
use crate::error::Result;

#[derive(Args, Debug, Default)]
pub struct CatalogArgs {}

pub fn run(ctx: &AppContext, _args: &CatalogArgs) -> Result<()> {
    let path = ctx.catalog_path();
    let catalog = ctx.load_catalog()?;

    if ctx.robot_mode {
        emit_json(&robot_ok(serde_json::json!({
            "path": path.display().to_string(),
            "count": catalog.models().len(),
            "models": catalog.models(),
        })))
    } else {
        let mut layout = HumanLayout::new();
        layout
            .title("Model Catalog")
            .kv("Path", &path.display().to_string())
            .blank();
        for (index, card) in catalog.models().iter().enumerate() {
            let licence = if card.open_source { "open" } else { "closed" };
            layout.bullet(&format!(
                "[{index}] {} ({}, {licence}, cost {}, latency {}) {}",
                card.id,
                card.provider,
                card.cost_tier,
                card.latency_tier,
                card.strengths.join(", ")
            ));
        }
        emit_human(layout);
        Ok(())
    }
}
