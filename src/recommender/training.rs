//! Offline training: drive the engine with simulated contexts and rewards.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::info;

use crate::error::Result;

use super::engine::LinUcb;
use super::features::{Budget, Context, DatasetSize, Domain, FeatureEncoder, Task};
use super::rewards::RewardSource;

/// Draws contexts uniformly over every vocabulary and flag.
#[derive(Debug)]
pub struct ContextSampler {
    rng: StdRng,
}

impl ContextSampler {
    #[must_use]
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            rng: seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64),
        }
    }

    fn pick(&mut self, vocab: &[&str]) -> String {
        vocab[self.rng.random_range(0..vocab.len())].to_string()
    }

    pub fn sample(&mut self) -> Context {
        Context {
            task: Task::from(self.pick(Task::VOCAB)),
            domain: Domain::from(self.pick(Domain::VOCAB)),
            dataset_size: DatasetSize::from(self.pick(DatasetSize::VOCAB)),
            latency_budget: Budget::from(self.pick(Budget::VOCAB)),
            cost_budget: Budget::from(self.pick(Budget::VOCAB)),
            multilingual: self.rng.random(),
            needs_coding: self.rng.random(),
            needs_reasoning: self.rng.random(),
            safety_sensitive: self.rng.random(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TrainOptions {
    pub steps: u64,
    /// Emit a progress event every this many steps (0 disables).
    pub log_every: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrainReport {
    pub steps: u64,
    pub mean_reward: f64,
    /// Mean reward over the last tenth of the run.
    pub tail_mean_reward: f64,
    pub pulls: Vec<u64>,
}

/// Run `select -> reward -> update` for `options.steps` iterations.
pub fn train(
    engine: &mut LinUcb,
    encoder: &dyn FeatureEncoder,
    rewards: &mut dyn RewardSource,
    sampler: &mut ContextSampler,
    options: TrainOptions,
) -> Result<TrainReport> {
    let mut pulls = vec![0u64; engine.config().n_actions];
    let tail_start = options.steps - options.steps / 10;
    let mut total = 0.0;
    let mut tail_total = 0.0;

    for step in 0..options.steps {
        let context = sampler.sample();
        let x = encoder.encode(&context);
        let action = engine.select(&x)?;
        let reward = rewards.reward(&context, action);
        engine.update(&x, action, reward)?;

        pulls[action] += 1;
        total += reward;
        if step >= tail_start {
            tail_total += reward;
        }
        if options.log_every > 0 && (step + 1) % options.log_every == 0 {
            info!(
                step = step + 1,
                mean_reward = total / (step + 1) as f64,
                "training progress"
            );
        }
    }

    let tail_len = options.steps - tail_start;
    Ok(TrainReport {
        steps: options.steps,
        mean_reward: if options.steps == 0 {
            0.0
        } else {
            total / options.steps as f64
        },
        tail_mean_reward: if tail_len == 0 {
            0.0
        } else {
            tail_total / tail_len as f64
        },
        pulls,
    })
}
