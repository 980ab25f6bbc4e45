//! Candidate models and their stable action indices.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RecError, Result};

use super::features::Budget;

/// What the engine needs from a catalog: a stable index per action.
pub trait ActionCatalog: Send + Sync {
    fn count(&self) -> usize;

    fn index_of(&self, action_id: &str) -> Result<usize>;

    fn id_of(&self, index: usize) -> Option<&str>;
}

/// Metadata describing one candidate model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelCard {
    pub id: String,
    pub provider: String,
    pub open_source: bool,
    pub cost_tier: Budget,
    pub latency_tier: Budget,
    #[serde(default)]
    pub strengths: Vec<String>,
}

impl ModelCard {
    #[must_use]
    pub fn has_strength(&self, strength: &str) -> bool {
        self.strengths.iter().any(|s| s == strength)
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    models: Vec<ModelCard>,
}

/// Ordered list of model cards; the position in the list is the action index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCatalog {
    models: Vec<ModelCard>,
}

impl ModelCatalog {
    /// Build from cards, rejecting an empty list or duplicate ids.
    pub fn new(models: Vec<ModelCard>) -> Result<Self> {
        if models.is_empty() {
            return Err(RecError::InvalidArgument(
                "model catalog is empty".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for model in &models {
            if model.id.trim().is_empty() {
                return Err(RecError::InvalidArgument(
                    "model id must not be empty".to_string(),
                ));
            }
            if !seen.insert(model.id.as_str()) {
                return Err(RecError::InvalidArgument(format!(
                    "duplicate model id {}",
                    model.id
                )));
            }
        }
        Ok(Self { models })
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        let file: CatalogFile = serde_yaml::from_str(raw)?;
        Self::new(file.models)
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(RecError::NotFound(format!(
                "model catalog {}",
                path.display()
            )));
        }
        let raw = std::fs::read_to_string(path)?;
        Self::from_yaml(&raw)
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ModelCard> {
        self.models.get(index)
    }

    #[must_use]
    pub fn models(&self) -> &[ModelCard] {
        &self.models
    }
}

impl ActionCatalog for ModelCatalog {
    fn count(&self) -> usize {
        self.models.len()
    }

    fn index_of(&self, action_id: &str) -> Result<usize> {
        self.models
            .iter()
            .position(|m| m.id == action_id)
            .ok_or_else(|| RecError::NotFound(format!("model {action_id}")))
    }

    fn id_of(&self, index: usize) -> Option<&str> {
        self.models.get(index).map(|m| m.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r"
models:
  - id: gpt-large
    provider: acme
    open_source: false
    cost_tier: high
    latency_tier: medium
    strengths: [reasoning, coding, safety]
  - id: tiny-open
    provider: community
    open_source: true
    cost_tier: very_low
    latency_tier: very_low
    strengths: [speed]
";

    #[test]
    fn loads_cards_in_order() {
        let catalog = ModelCatalog::from_yaml(YAML).unwrap();
        assert_eq!(catalog.count(), 2);
        assert_eq!(catalog.id_of(0), Some("gpt-large"));
        assert_eq!(catalog.index_of("tiny-open").unwrap(), 1);
        assert_eq!(catalog.get(1).unwrap().cost_tier, Budget::VeryLow);
        assert!(catalog.get(0).unwrap().has_strength("coding"));
        assert_eq!(catalog.id_of(2), None);
    }

    #[test]
    fn unknown_id_is_not_found() {
        let catalog = ModelCatalog::from_yaml(YAML).unwrap();
        assert!(matches!(
            catalog.index_of("nope"),
            Err(RecError::NotFound(_))
        ));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let card = ModelCatalog::from_yaml(YAML).unwrap().models()[0].clone();
        assert!(matches!(
            ModelCatalog::new(vec![card.clone(), card]),
            Err(RecError::InvalidArgument(_))
        ));
    }

    #[test]
    fn empty_catalog_is_rejected() {
        assert!(ModelCatalog::from_yaml("models: []").is_err());
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = ModelCatalog::load(&dir.path().join("models.yaml")).unwrap_err();
        assert!(matches!(err, RecError::NotFound(_)));
    }
}
