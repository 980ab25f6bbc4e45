use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{RecError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub policy: PolicySection,
    #[serde(default)]
    pub catalog: CatalogSection,
    #[serde(default)]
    pub train: TrainSection,
    #[serde(default)]
    pub serve: ServeSection,
}

impl Config {
    pub fn load(explicit_path: Option<&Path>, root: &Path) -> Result<Self> {
        let mut config = Self::default();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| std::env::var("LLMREC_CONFIG").ok().map(PathBuf::from));

        if let Some(path) = explicit {
            if let Some(patch) = Self::load_patch(&path)? {
                config.merge_patch(patch);
            }
        } else {
            if let Some(global) = Self::load_global()? {
                config.merge_patch(global);
            }
            if let Some(project) = Self::load_project(root)? {
                config.merge_patch(project);
            }
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    fn load_global() -> Result<Option<ConfigPatch>> {
        let Some(dir) = dirs::config_dir() else {
            return Ok(None);
        };
        Self::load_patch(&dir.join("llmrec/config.toml"))
    }

    fn load_project(root: &Path) -> Result<Option<ConfigPatch>> {
        Self::load_patch(&root.join("config.toml"))
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|err| RecError::Config(format!("read config {}: {err}", path.display())))?;
        let patch = toml::from_str(&raw)
            .map_err(|err| RecError::Config(format!("parse config {}: {err}", path.display())))?;
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.policy {
            self.policy.merge(patch);
        }
        if let Some(patch) = patch.catalog {
            self.catalog.merge(patch);
        }
        if let Some(patch) = patch.train {
            self.train.merge(patch);
        }
        if let Some(patch) = patch.serve {
            self.serve.merge(patch);
        }
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(value) = env_f64("LLMREC_POLICY_ALPHA")? {
            self.policy.alpha = value;
        }
        if let Some(value) = env_string("LLMREC_POLICY_PATH") {
            self.policy.path = PathBuf::from(value);
        }
        if let Some(value) = env_string("LLMREC_CATALOG_PATH") {
            self.catalog.path = PathBuf::from(value);
        }
        if let Some(value) = env_u64("LLMREC_TRAIN_STEPS")? {
            self.train.steps = value;
        }
        if let Some(value) = env_f64("LLMREC_TRAIN_NOISE")? {
            self.train.noise = value;
        }
        if let Some(value) = env_u64("LLMREC_TRAIN_SEED")? {
            self.train.seed = Some(value);
        }
        if let Some(value) = env_u64("LLMREC_TRAIN_LOG_EVERY")? {
            self.train.log_every = value;
        }
        if let Some(value) = env_u64("LLMREC_SERVE_TOP_K")? {
            self.serve.top_k = usize::try_from(value)
                .map_err(|err| RecError::Config(format!("invalid LLMREC_SERVE_TOP_K: {err}")))?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if !self.policy.alpha.is_finite() || self.policy.alpha <= 0.0 {
            return Err(RecError::Config(format!(
                "policy.alpha must be finite and > 0, got {}",
                self.policy.alpha
            )));
        }
        if !self.train.noise.is_finite() || self.train.noise < 0.0 {
            return Err(RecError::Config(format!(
                "train.noise must be finite and >= 0, got {}",
                self.train.noise
            )));
        }
        Ok(())
    }

    /// Resolve a configured path against the llmrec root unless it is absolute.
    #[must_use]
    pub fn resolve(root: &Path, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            root.join(path)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicySection {
    /// Exploration strength used when starting a fresh policy.
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    #[serde(default = "default_policy_path")]
    pub path: PathBuf,
}

fn default_alpha() -> f64 {
    1.0
}

fn default_policy_path() -> PathBuf {
    PathBuf::from("artifacts/policy.json")
}

impl Default for PolicySection {
    fn default() -> Self {
        Self {
            alpha: default_alpha(),
            path: default_policy_path(),
        }
    }
}

impl PolicySection {
    fn merge(&mut self, patch: PolicyPatch) {
        if let Some(value) = patch.alpha {
            self.alpha = value;
        }
        if let Some(value) = patch.path {
            self.path = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSection {
    #[serde(default = "default_catalog_path")]
    pub path: PathBuf,
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("data/models.yaml")
}

impl Default for CatalogSection {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
        }
    }
}

impl CatalogSection {
    fn merge(&mut self, patch: CatalogPatch) {
        if let Some(value) = patch.path {
            self.path = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainSection {
    #[serde(default = "default_steps")]
    pub steps: u64,
    #[serde(default = "default_noise")]
    pub noise: f64,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_log_every")]
    pub log_every: u64,
}

fn default_steps() -> u64 {
    5000
}

fn default_noise() -> f64 {
    0.05
}

fn default_log_every() -> u64 {
    1000
}

impl Default for TrainSection {
    fn default() -> Self {
        Self {
            steps: default_steps(),
            noise: default_noise(),
            seed: None,
            log_every: default_log_every(),
        }
    }
}

impl TrainSection {
    fn merge(&mut self, patch: TrainPatch) {
        if let Some(value) = patch.steps {
            self.steps = value;
        }
        if let Some(value) = patch.noise {
            self.noise = value;
        }
        if let Some(value) = patch.seed {
            self.seed = Some(value);
        }
        if let Some(value) = patch.log_every {
            self.log_every = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServeSection {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_top_k() -> usize {
    3
}

impl Default for ServeSection {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

impl ServeSection {
    fn merge(&mut self, patch: ServePatch) {
        if let Some(value) = patch.top_k {
            self.top_k = value;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigPatch {
    pub policy: Option<PolicyPatch>,
    pub catalog: Option<CatalogPatch>,
    pub train: Option<TrainPatch>,
    pub serve: Option<ServePatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct PolicyPatch {
    pub alpha: Option<f64>,
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct CatalogPatch {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct TrainPatch {
    pub steps: Option<u64>,
    pub noise: Option<f64>,
    pub seed: Option<u64>,
    pub log_every: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ServePatch {
    pub top_k: Option<usize>,
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn env_u64(key: &str) -> Result<Option<u64>> {
    match std::env::var(key) {
        Ok(value) => value
            .parse::<u64>()
            .map(Some)
            .map_err(|err| RecError::Config(format!("invalid {key} value {value}: {err}"))),
        Err(_) => Ok(None),
    }
}

fn env_f64(key: &str) -> Result<Option<f64>> {
    match std::env::var(key) {
        Ok(value) => value
            .parse::<f64>()
            .map(Some)
            .map_err(|err| RecError::Config(format!("invalid {key} value {value}: {err}"))),
        Err(_) => Ok(None),
    }
}
