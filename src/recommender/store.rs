//! Durable storage for policy snapshots.
//!
//! Every save writes the complete snapshot; there is no incremental log.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::error::{RecError, Result};

use super::policy::PolicySnapshot;

pub trait PolicyStore: Send + Sync {
    /// Load the persisted snapshot, `None` when nothing has been saved yet.
    fn load(&self) -> Result<Option<PolicySnapshot>>;

    fn save(&self, snapshot: &PolicySnapshot) -> Result<()>;

    /// Human-readable location for logs and output.
    fn describe(&self) -> String;
}

/// Pretty-printed JSON file, replaced atomically via a temp file and rename.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PolicyStore for JsonFileStore {
    fn load(&self) -> Result<Option<PolicySnapshot>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no persisted policy");
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&self.path)?;
        let snapshot = PolicySnapshot::from_json(&contents).map_err(|err| {
            RecError::MalformedState(format!("{}: {err}", self.path.display()))
        })?;
        info!(
            path = %self.path.display(),
            actions = snapshot.config.n_actions,
            d = snapshot.config.d,
            "loaded policy snapshot"
        );
        Ok(Some(snapshot))
    }

    fn save(&self, snapshot: &PolicySnapshot) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = snapshot.to_json_pretty()?;
        let temp_path = self.path.with_extension("tmp");
        std::fs::write(&temp_path, json)?;
        match std::fs::rename(&temp_path, &self.path) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
                std::fs::remove_file(&self.path)?;
                if let Err(err) = std::fs::rename(&temp_path, &self.path) {
                    let _ = std::fs::remove_file(&temp_path);
                    return Err(RecError::Io(err));
                }
            }
            Err(err) => {
                let _ = std::fs::remove_file(&temp_path);
                return Err(RecError::Io(err));
            }
        }
        debug!(path = %self.path.display(), "saved policy snapshot");
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-process store, for tests and ephemeral simulations.
#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshot: Mutex<Option<PolicySnapshot>>,
    saves: Mutex<u64>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_snapshot(snapshot: PolicySnapshot) -> Self {
        Self {
            snapshot: Mutex::new(Some(snapshot)),
            saves: Mutex::new(0),
        }
    }

    #[must_use]
    pub fn saves(&self) -> u64 {
        *self.saves.lock()
    }

    #[must_use]
    pub fn latest(&self) -> Option<PolicySnapshot> {
        self.snapshot.lock().clone()
    }
}

impl PolicyStore for MemoryStore {
    fn load(&self) -> Result<Option<PolicySnapshot>> {
        Ok(self.snapshot.lock().clone())
    }

    fn save(&self, snapshot: &PolicySnapshot) -> Result<()> {
        *self.snapshot.lock() = Some(snapshot.clone());
        *self.saves.lock() += 1;
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
