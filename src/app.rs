use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Config;
use crate::error::{RecError, Result};
use crate::recommender::{JsonFileStore, ModelCatalog, OneHotEncoder, Recommender};

pub struct AppContext {
    pub root: PathBuf,
    pub config: Config,
    pub robot_mode: bool,
}

impl AppContext {
    pub fn from_cli(cli: &crate::cli::Cli) -> Result<Self> {
        let root = Self::find_root()?;
        let config = Config::load(cli.config.as_deref(), &root)?;

        Ok(Self {
            root,
            config,
            robot_mode: cli.robot,
        })
    }

    fn find_root() -> Result<PathBuf> {
        if let Ok(root) = std::env::var("LLMREC_ROOT") {
            return Ok(PathBuf::from(root));
        }
        let cwd = std::env::current_dir()?;
        if let Some(found) = find_upwards(&cwd, ".llmrec") {
            return Ok(found);
        }

        let data_dir = dirs::data_dir()
            .ok_or_else(|| RecError::MissingConfig("data directory not found".to_string()))?;
        Ok(data_dir.join("llmrec"))
    }

    #[must_use]
    pub fn policy_path(&self) -> PathBuf {
        Config::resolve(&self.root, &self.config.policy.path)
    }

    #[must_use]
    pub fn catalog_path(&self) -> PathBuf {
        Config::resolve(&self.root, &self.config.catalog.path)
    }

    pub fn load_catalog(&self) -> Result<ModelCatalog> {
        ModelCatalog::load(&self.catalog_path())
    }

    #[must_use]
    pub fn policy_store(&self) -> JsonFileStore {
        JsonFileStore::new(self.policy_path())
    }

    /// Wire catalog, encoder and file store into a ready recommender.
    pub fn open_recommender(&self) -> Result<Recommender> {
        Recommender::open(
            Arc::new(self.load_catalog()?),
            Arc::new(OneHotEncoder),
            Arc::new(self.policy_store()),
            self.config.policy.alpha,
        )
    }
}

fn find_upwards(start: &Path, name: &str) -> Option<PathBuf> {
    let mut current = Some(start);
    while let Some(dir) = current {
        let candidate = dir.join(name);
        if candidate.is_dir() {
            return Some(candidate);
        }
        current = dir.parent();
    }
    None
}
