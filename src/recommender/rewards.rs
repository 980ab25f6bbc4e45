//! Reward sources for offline training and simulation.
//!
//! The serving path never calls these: in production the reward is whatever the caller
//! observed. For simulation the engine is driven by a [`RewardSource`], and
//! [`HeuristicRewarder`] is one interchangeable synthetic model of how well each card
//! fits a context.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

use crate::error::{RecError, Result};

use super::catalog::{ModelCard, ModelCatalog};
use super::features::{Budget, Context, DatasetSize, Domain, Task};

/// Upper clip applied to the noiseless heuristic score.
pub const MAX_HEURISTIC_REWARD: f64 = 2.5;

/// Supplies a scalar reward for a (context, chosen action) pair.
pub trait RewardSource {
    fn reward(&mut self, context: &Context, action: usize) -> f64;
}

/// Hand-tuned fit between a context and a model card, plus Gaussian noise.
///
/// # Score components
/// - cost fit: 0.6 for closed models on a high budget or open models on a low one
/// - latency fit: up to 0.6 for fast models under tight latency budgets, else 0.1
/// - task fit: code 0.5, summarization 0.3, qa 0.4 when strengths match
/// - regulated domains: 0.3 for reasoning or closed models
/// - flags: 0.3-0.4 each when the matching strength is present
/// - larger datasets: 0.2 for open or fine-tunable models
#[derive(Debug)]
pub struct HeuristicRewarder {
    catalog: ModelCatalog,
    noise: Normal<f64>,
    rng: StdRng,
}

impl HeuristicRewarder {
    /// `noise` is the standard deviation of the additive Gaussian term; `seed` makes
    /// simulations reproducible.
    pub fn new(catalog: ModelCatalog, noise: f64, seed: Option<u64>) -> Result<Self> {
        let noise = Normal::new(0.0, noise).map_err(|err| {
            RecError::InvalidArgument(format!("invalid reward noise {noise}: {err}"))
        })?;
        let rng = seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        Ok(Self {
            catalog,
            noise,
            rng,
        })
    }

    /// Noiseless score, clipped to `[0, MAX_HEURISTIC_REWARD]`. Unknown actions score 0.
    #[must_use]
    pub fn expected_reward(&self, context: &Context, action: usize) -> f64 {
        self.catalog
            .get(action)
            .map_or(0.0, |card| heuristic_fit(context, card))
    }
}

impl RewardSource for HeuristicRewarder {
    fn reward(&mut self, context: &Context, action: usize) -> f64 {
        self.expected_reward(context, action) + self.noise.sample(&mut self.rng)
    }
}

fn heuristic_fit(context: &Context, card: &ModelCard) -> f64 {
    let mut score = 0.0;

    match context.cost_budget {
        Budget::High if !card.open_source => score += 0.6,
        Budget::VeryLow | Budget::Low if card.open_source => score += 0.6,
        _ => {}
    }

    let fast_model = matches!(card.latency_tier, Budget::VeryLow | Budget::Low);
    score += if fast_model {
        match context.latency_budget {
            Budget::VeryLow => 0.6,
            Budget::Low => 0.4,
            Budget::High => 0.0,
            Budget::Medium | Budget::Unknown(_) => 0.2,
        }
    } else {
        0.1
    };

    match context.task {
        Task::Code if card.has_strength("coding") || card.has_strength("speed") => score += 0.5,
        Task::Summarization if card.has_strength("general") || card.has_strength("reasoning") => {
            score += 0.3;
        }
        Task::Qa if card.has_strength("reasoning") => score += 0.4,
        _ => {}
    }

    if matches!(
        context.domain,
        Domain::Legal | Domain::Medical | Domain::Finance
    ) && (card.has_strength("reasoning") || !card.open_source)
    {
        score += 0.3;
    }

    if context.multilingual && card.has_strength("multilingual") {
        score += 0.3;
    }
    if context.needs_reasoning && card.has_strength("reasoning") {
        score += 0.4;
    }
    if context.needs_coding && card.has_strength("coding") {
        score += 0.4;
    }
    if context.safety_sensitive && card.has_strength("safety") {
        score += 0.3;
    }

    if matches!(context.dataset_size, DatasetSize::Medium | DatasetSize::Large)
        && (card.has_strength("fine_tuning") || card.open_source)
    {
        score += 0.2;
    }

    f64::clamp(score, 0.0, MAX_HEURISTIC_REWARD)
}

/// Fixed reward per action, handy for tests and sanity simulations.
#[derive(Debug, Clone)]
pub struct ConstantRewards {
    pub per_action: Vec<f64>,
}

impl RewardSource for ConstantRewards {
    fn reward(&mut self, _context: &Context, action: usize) -> f64 {
        self.per_action.get(action).copied().unwrap_or(0.0)
    }
}
