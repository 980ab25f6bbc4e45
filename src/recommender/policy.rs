//! Policy state: the per-action LinUCB sufficient statistics and their snapshot form.

use serde::{Deserialize, Serialize};

use crate::error::{RecError, Result};

use super::linalg::Matrix;

/// Exploration strength, feature dimension and action count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
    pub alpha: f64,
    pub d: usize,
    pub n_actions: usize,
}

impl PolicyConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.alpha.is_finite() || self.alpha <= 0.0 {
            return Err(RecError::InvalidArgument(format!(
                "alpha must be finite and > 0, got {}",
                self.alpha
            )));
        }
        if self.d == 0 {
            return Err(RecError::InvalidArgument("d must be > 0".to_string()));
        }
        if self.n_actions == 0 {
            return Err(RecError::InvalidArgument("n_actions must be > 0".to_string()));
        }
        Ok(())
    }
}

/// Per-action ridge-regression statistics.
///
/// `a[i]` is `I + Σ x xᵀ` over every observation of action `i`, `b[i]` is `Σ r x`.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyState {
    config: PolicyConfig,
    a: Vec<Matrix>,
    b: Vec<Vec<f64>>,
}

impl PolicyState {
    /// Fresh state: identity matrices and zero vectors.
    pub fn new(config: PolicyConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            a: vec![Matrix::identity(config.d); config.n_actions],
            b: vec![vec![0.0; config.d]; config.n_actions],
            config,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &PolicyConfig {
        &self.config
    }

    #[must_use]
    pub fn design(&self, action: usize) -> Option<&Matrix> {
        self.a.get(action)
    }

    #[must_use]
    pub fn response(&self, action: usize) -> Option<&[f64]> {
        self.b.get(action).map(Vec::as_slice)
    }

    /// Apply `A += x xᵀ`, `b += r x`. Caller has already validated the arguments.
    pub(crate) fn accumulate(&mut self, action: usize, x: &[f64], reward: f64) {
        self.a[action].add_outer(x);
        for (bi, xi) in self.b[action].iter_mut().zip(x) {
            *bi += reward * xi;
        }
    }

    /// Complete snapshot of config, every matrix and every vector.
    #[must_use]
    pub fn export(&self) -> PolicySnapshot {
        PolicySnapshot {
            config: self.config,
            a: self.a.iter().map(Matrix::to_rows).collect(),
            b: self.b.clone(),
        }
    }

    /// Rebuild state from a snapshot, refusing anything inconsistent.
    pub fn import(snapshot: &PolicySnapshot) -> Result<Self> {
        let config = snapshot.config;
        config
            .validate()
            .map_err(|err| RecError::MalformedState(format!("config: {err}")))?;
        let (d, k) = (config.d, config.n_actions);

        if snapshot.a.len() != k || snapshot.b.len() != k {
            return Err(RecError::MalformedState(format!(
                "expected {k} actions, found {} matrices and {} vectors",
                snapshot.a.len(),
                snapshot.b.len()
            )));
        }

        let mut a = Vec::with_capacity(k);
        for (action, rows) in snapshot.a.iter().enumerate() {
            if rows.len() != d {
                return Err(RecError::MalformedState(format!(
                    "A[{action}] has {} rows, expected {d}",
                    rows.len()
                )));
            }
            let matrix = Matrix::from_rows(rows)
                .map_err(|err| RecError::MalformedState(format!("A[{action}]: {err}")))?;
            if !matrix.is_finite() {
                return Err(RecError::MalformedState(format!(
                    "A[{action}] contains non-finite values"
                )));
            }
            a.push(matrix);
        }

        for (action, vector) in snapshot.b.iter().enumerate() {
            if vector.len() != d {
                return Err(RecError::MalformedState(format!(
                    "b[{action}] has length {}, expected {d}",
                    vector.len()
                )));
            }
            if !vector.iter().all(|v| v.is_finite()) {
                return Err(RecError::MalformedState(format!(
                    "b[{action}] contains non-finite values"
                )));
            }
        }

        Ok(Self {
            config,
            a,
            b: snapshot.b.clone(),
        })
    }
}

/// Serializable snapshot. Field names match the on-disk JSON contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicySnapshot {
    pub config: PolicyConfig,
    /// `n_actions` matrices of `d` rows of `d` entries, row-major.
    #[serde(rename = "As")]
    pub a: Vec<Vec<Vec<f64>>>,
    #[serde(rename = "bs")]
    pub b: Vec<Vec<f64>>,
}

impl PolicySnapshot {
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw)
            .map_err(|err| RecError::MalformedState(format!("unreadable snapshot: {err}")))
    }
}
