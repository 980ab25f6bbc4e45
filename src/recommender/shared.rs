//! Thread-safe wrapper around the engine for serving.
//!
//! Scoring takes a shared read lock; updates take the exclusive write lock, so a reader
//! never observes `A[a]` updated without `b[a]`. Persisting happens after the write lock
//! is released. Each update is stamped with a generation number and the persist step
//! skips any snapshot older than the one already written, so concurrent feedback can
//! never roll the stored policy backwards.

use parking_lot::{Mutex, RwLock};
use tracing::{info, warn};

use crate::error::{RecError, Result};

use super::engine::{ActionScore, LinUcb};
use super::policy::{PolicyConfig, PolicySnapshot};
use super::store::PolicyStore;

#[derive(Debug)]
struct Guarded {
    engine: LinUcb,
    generation: u64,
}

#[derive(Debug)]
pub struct SharedPolicy {
    inner: RwLock<Guarded>,
    /// Generation of the last snapshot handed to the store.
    persisted: Mutex<u64>,
}

impl SharedPolicy {
    #[must_use]
    pub fn new(engine: LinUcb) -> Self {
        Self {
            inner: RwLock::new(Guarded {
                engine,
                generation: 0,
            }),
            persisted: Mutex::new(0),
        }
    }

    /// Restore from the store, or start fresh with `config` when it is empty.
    pub fn open(store: &dyn PolicyStore, config: PolicyConfig) -> Result<Self> {
        let engine = match store.load()? {
            Some(snapshot) => LinUcb::import(&snapshot)?,
            None => {
                info!(store = %store.describe(), "starting from a fresh policy");
                LinUcb::new(config)?
            }
        };
        Ok(Self::new(engine))
    }

    #[must_use]
    pub fn config(&self) -> PolicyConfig {
        *self.inner.read().engine.config()
    }

    pub fn score(&self, x: &[f64]) -> Result<Vec<ActionScore>> {
        self.inner.read().engine.score(x)
    }

    pub fn select(&self, x: &[f64]) -> Result<usize> {
        self.inner.read().engine.select(x)
    }

    #[must_use]
    pub fn snapshot(&self) -> PolicySnapshot {
        self.inner.read().engine.export()
    }

    /// Number of successful updates applied since this instance was created.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.inner.read().generation
    }

    /// Apply an update under the write lock and return the resulting snapshot with its
    /// generation.
    pub fn update(&self, x: &[f64], action: usize, reward: f64) -> Result<(u64, PolicySnapshot)> {
        let mut guard = self.inner.write();
        guard.engine.update(x, action, reward)?;
        guard.generation += 1;
        Ok((guard.generation, guard.engine.export()))
    }

    /// Apply an update, then durably save it.
    ///
    /// A store failure is reported as [`RecError::PersistFailed`]; the in-memory update
    /// stays applied.
    pub fn update_and_persist(
        &self,
        store: &dyn PolicyStore,
        x: &[f64],
        action: usize,
        reward: f64,
    ) -> Result<()> {
        let (generation, snapshot) = self.update(x, action, reward)?;
        self.persist(store, generation, &snapshot)
    }

    fn persist(&self, store: &dyn PolicyStore, generation: u64, snapshot: &PolicySnapshot) -> Result<()> {
        let mut persisted = self.persisted.lock();
        if generation <= *persisted {
            warn!(
                generation,
                persisted = *persisted,
                "skipping stale snapshot; a newer one is already saved"
            );
            return Ok(());
        }
        store.save(snapshot).map_err(|err| {
            RecError::PersistFailed(format!("{}: {err}", store.describe()))
        })?;
        *persisted = generation;
        Ok(())
    }
}
