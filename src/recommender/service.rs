//! Context-level API used by the CLI and the serve loop.
//!
//! Built once at startup from a catalog, an encoder and a store, then shared by
//! reference. There is no global instance.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{RecError, Result};

use super::catalog::ActionCatalog;
use super::features::{Context, FeatureEncoder};
use super::policy::{PolicyConfig, PolicySnapshot};
use super::shared::SharedPolicy;
use super::store::PolicyStore;

/// One ranked entry returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub rank: usize,
    pub model_id: String,
    pub action: usize,
    pub score: f64,
    pub mean: f64,
    pub bonus: f64,
}

pub struct Recommender {
    catalog: Arc<dyn ActionCatalog>,
    encoder: Arc<dyn FeatureEncoder>,
    store: Arc<dyn PolicyStore>,
    policy: SharedPolicy,
}

impl std::fmt::Debug for Recommender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recommender")
            .field("actions", &self.catalog.count())
            .field("d", &self.encoder.dim())
            .field("store", &self.store.describe())
            .finish_non_exhaustive()
    }
}

impl Recommender {
    /// Restore the policy from `store`, or start fresh with exploration `alpha`.
    ///
    /// A persisted policy whose dimensions disagree with the catalog or encoder is
    /// refused.
    pub fn open(
        catalog: Arc<dyn ActionCatalog>,
        encoder: Arc<dyn FeatureEncoder>,
        store: Arc<dyn PolicyStore>,
        alpha: f64,
    ) -> Result<Self> {
        let expected = PolicyConfig {
            alpha,
            d: encoder.dim(),
            n_actions: catalog.count(),
        };
        let policy = SharedPolicy::open(store.as_ref(), expected)?;
        let loaded = policy.config();
        if loaded.d != expected.d || loaded.n_actions != expected.n_actions {
            return Err(RecError::MalformedState(format!(
                "policy in {} has d={} and {} actions, but the encoder has d={} and the catalog {} models",
                store.describe(),
                loaded.d,
                loaded.n_actions,
                expected.d,
                expected.n_actions
            )));
        }
        info!(
            actions = loaded.n_actions,
            d = loaded.d,
            alpha = loaded.alpha,
            "recommender ready"
        );
        Ok(Self {
            catalog,
            encoder,
            store,
            policy,
        })
    }

    #[must_use]
    pub fn config(&self) -> PolicyConfig {
        self.policy.config()
    }

    #[must_use]
    pub fn snapshot(&self) -> PolicySnapshot {
        self.policy.snapshot()
    }

    #[must_use]
    pub fn catalog(&self) -> &dyn ActionCatalog {
        self.catalog.as_ref()
    }

    /// Every action ranked for `context`, best first.
    pub fn score(&self, context: &Context) -> Result<Vec<Recommendation>> {
        let x = self.encoder.encode(context);
        let scores = self.policy.score(&x)?;
        debug!(actions = scores.len(), "scored context");
        scores
            .into_iter()
            .enumerate()
            .map(|(rank, s)| {
                let model_id = self.catalog.id_of(s.action).ok_or_else(|| {
                    RecError::NotFound(format!("no catalog entry for action {}", s.action))
                })?;
                Ok(Recommendation {
                    rank: rank + 1,
                    model_id: model_id.to_string(),
                    action: s.action,
                    score: s.total,
                    mean: s.mean,
                    bonus: s.bonus,
                })
            })
            .collect()
    }

    /// The best `top_k` entries for `context`.
    pub fn recommend(&self, context: &Context, top_k: usize) -> Result<Vec<Recommendation>> {
        let mut ranked = self.score(context)?;
        ranked.truncate(top_k);
        Ok(ranked)
    }

    /// Record an observed reward for `model_id` and persist the new policy.
    pub fn feedback(&self, context: &Context, model_id: &str, reward: f64) -> Result<()> {
        let action = self.catalog.index_of(model_id)?;
        let x = self.encoder.encode(context);
        self.policy
            .update_and_persist(self.store.as_ref(), &x, action, reward)?;
        info!(model_id, action, reward, "feedback applied");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommender::catalog::{ModelCard, ModelCatalog};
    use crate::recommender::features::{Budget, OneHotEncoder, Task};
    use crate::recommender::store::MemoryStore;

    fn catalog() -> Arc<ModelCatalog> {
        let card = |id: &str| ModelCard {
            id: id.to_string(),
            provider: "p".to_string(),
            open_source: true,
            cost_tier: Budget::Low,
            latency_tier: Budget::Low,
            strengths: Vec::new(),
        };
        Arc::new(ModelCatalog::new(vec![card("alpha"), card("beta"), card("gamma")]).unwrap())
    }

    fn recommender(store: Arc<MemoryStore>) -> Recommender {
        with_alpha(store, 1.0)
    }

    fn with_alpha(store: Arc<MemoryStore>, alpha: f64) -> Recommender {
        Recommender::open(catalog(), Arc::new(OneHotEncoder), store, alpha).unwrap()
    }

    #[test]
    fn cold_start_ranks_by_index() {
        let rec = recommender(Arc::new(MemoryStore::new()));
        let ranked = rec.recommend(&Context::default(), 2).unwrap();
        let ids: Vec<_> = ranked.iter().map(|r| r.model_id.as_str()).collect();
        assert_eq!(ids, ["alpha", "beta"]);
        assert_eq!(ranked[0].rank, 1);
    }

    #[test]
    fn feedback_shifts_ranking_and_persists() {
        let store = Arc::new(MemoryStore::new());
        // Low exploration so the untried model's bonus cannot outrank the rewarded one.
        let rec = with_alpha(Arc::clone(&store), 0.1);
        let ctx = Context {
            task: Task::Code,
            ..Context::default()
        };
        rec.feedback(&ctx, "gamma", 1.0).unwrap();
        rec.feedback(&ctx, "alpha", -1.0).unwrap();

        let ranked = rec.score(&ctx).unwrap();
        let ids: Vec<_> = ranked.iter().map(|r| r.model_id.as_str()).collect();
        assert_eq!(ids, ["gamma", "beta", "alpha"]);
        assert!(ranked[0].mean > 0.0);
        assert_eq!(store.saves(), 2);
        assert_eq!(store.latest(), Some(rec.snapshot()));
    }

    #[test]
    fn unknown_model_is_not_found_and_state_unchanged() {
        let store = Arc::new(MemoryStore::new());
        let rec = recommender(Arc::clone(&store));
        let before = rec.snapshot();
        assert!(matches!(
            rec.feedback(&Context::default(), "delta", 1.0),
            Err(RecError::NotFound(_))
        ));
        assert_eq!(rec.snapshot(), before);
        assert_eq!(store.saves(), 0);
    }

    #[test]
    fn reopening_resumes_from_store() {
        let store = Arc::new(MemoryStore::new());
        let first = recommender(Arc::clone(&store));
        first.feedback(&Context::default(), "beta", 0.8).unwrap();

        let second = recommender(Arc::clone(&store));
        assert_eq!(second.snapshot(), first.snapshot());
    }

    #[test]
    fn mismatched_persisted_policy_is_refused() {
        let snapshot = crate::recommender::engine::LinUcb::new(PolicyConfig {
            alpha: 1.0,
            d: 4,
            n_actions: 3,
        })
        .unwrap()
        .export();
        let store = Arc::new(MemoryStore::with_snapshot(snapshot));
        let err = Recommender::open(catalog(), Arc::new(OneHotEncoder), store, 1.0).unwrap_err();
        assert!(matches!(err, RecError::MalformedState(_)));
    }
}
