//! LinUCB with disjoint per-action linear models.
//!
//! Each action keeps a ridge-regression estimate `theta = A⁻¹ b` of reward as a linear
//! function of the feature vector. Scoring adds an upper-confidence bonus
//! `alpha * sqrt(xᵀ A⁻¹ x)` that is large wherever the action has seen little data
//! resembling `x` and shrinks as observations accumulate.

use std::cmp::Ordering;

use serde::Serialize;
use tracing::{debug, trace};

use crate::error::{RecError, Result};

use super::linalg::dot;
use super::policy::{PolicyConfig, PolicySnapshot, PolicyState};

/// Score breakdown for one action.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ActionScore {
    pub action: usize,
    /// Predicted reward, `thetaᵀ x`.
    pub mean: f64,
    /// Exploration bonus, `alpha * sqrt(xᵀ A⁻¹ x)`.
    pub bonus: f64,
    /// `mean + bonus`.
    pub total: f64,
}

/// Descending by total, ascending action index on ties.
fn rank(a: &ActionScore, b: &ActionScore) -> Ordering {
    b.total.total_cmp(&a.total).then(a.action.cmp(&b.action))
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinUcb {
    state: PolicyState,
}

impl LinUcb {
    pub fn new(config: PolicyConfig) -> Result<Self> {
        Ok(Self {
            state: PolicyState::new(config)?,
        })
    }

    #[must_use]
    pub const fn from_state(state: PolicyState) -> Self {
        Self { state }
    }

    /// Restore from a snapshot, refusing inconsistent shapes.
    pub fn import(snapshot: &PolicySnapshot) -> Result<Self> {
        PolicyState::import(snapshot).map(Self::from_state)
    }

    #[must_use]
    pub fn export(&self) -> PolicySnapshot {
        self.state.export()
    }

    #[must_use]
    pub const fn state(&self) -> &PolicyState {
        &self.state
    }

    #[must_use]
    pub const fn config(&self) -> &PolicyConfig {
        self.state.config()
    }

    fn check_features(&self, x: &[f64]) -> Result<()> {
        let d = self.config().d;
        if x.len() != d {
            return Err(RecError::InvalidArgument(format!(
                "feature vector has length {}, expected {d}",
                x.len()
            )));
        }
        if !x.iter().all(|v| v.is_finite()) {
            return Err(RecError::InvalidArgument(
                "feature vector contains non-finite values".to_string(),
            ));
        }
        Ok(())
    }

    /// Score every action against `x`, ranked best first.
    pub fn score(&self, x: &[f64]) -> Result<Vec<ActionScore>> {
        self.check_features(x)?;
        let alpha = self.config().alpha;
        let mut scores = Vec::with_capacity(self.config().n_actions);

        for action in 0..self.config().n_actions {
            let (Some(design), Some(response)) =
                (self.state.design(action), self.state.response(action))
            else {
                return Err(RecError::MalformedState(format!(
                    "missing statistics for action {action}"
                )));
            };
            let factor = design.cholesky().map_err(|err| {
                RecError::NumericDegenerate(format!("action {action}: {err}"))
            })?;
            let theta = factor.solve(response);
            let mean = dot(&theta, x);
            let bonus = alpha * factor.inverse_quadratic_form(x).sqrt();
            let total = mean + bonus;
            if !total.is_finite() {
                return Err(RecError::NumericDegenerate(format!(
                    "action {action} produced a non-finite score"
                )));
            }
            trace!(action, mean, bonus, total, "scored action");
            scores.push(ActionScore {
                action,
                mean,
                bonus,
                total,
            });
        }

        scores.sort_by(rank);
        Ok(scores)
    }

    /// Action with the highest total score; lowest index wins ties.
    pub fn select(&self, x: &[f64]) -> Result<usize> {
        let scores = self.score(x)?;
        // score() returns k >= 1 entries, ranked.
        scores
            .first()
            .map(|best| best.action)
            .ok_or_else(|| RecError::InvalidArgument("policy has no actions".to_string()))
    }

    /// Current coefficient estimate `A⁻¹b` for one action.
    pub fn theta(&self, action: usize) -> Result<Vec<f64>> {
        let (Some(design), Some(response)) =
            (self.state.design(action), self.state.response(action))
        else {
            return Err(RecError::InvalidArgument(format!(
                "action index {action} out of range (k = {})",
                self.config().n_actions
            )));
        };
        Ok(design.cholesky()?.solve(response))
    }

    /// Fold one observation into the chosen action's statistics.
    ///
    /// Validation happens before any mutation, so a rejected update leaves the state
    /// untouched.
    pub fn update(&mut self, x: &[f64], action: usize, reward: f64) -> Result<()> {
        let k = self.config().n_actions;
        if action >= k {
            return Err(RecError::InvalidArgument(format!(
                "action index {action} out of range (k = {k})"
            )));
        }
        self.check_features(x)?;
        if !reward.is_finite() {
            return Err(RecError::InvalidArgument(format!(
                "reward must be finite, got {reward}"
            )));
        }
        self.state.accumulate(action, x, reward);
        debug!(action, reward, "policy updated");
        Ok(())
    }
}
