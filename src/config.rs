// File: src/config.rs
use crate::core::types::TrendingMetric;
use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Runtime settings for the engine and its file-backed stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub recipes_path: PathBuf,
    pub reviews_path: PathBuf,
    pub views_path: PathBuf,
    /// Upper bound on autocomplete results.
    pub max_suggestions: usize,
    /// Limit used by ranking queries when the caller gives none.
    pub default_limit: usize,
    pub trending_metric: TrendingMetric,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            recipes_path: PathBuf::from("recipes.json"),
            reviews_path: PathBuf::from("reviews.json"),
            views_path: PathBuf::from("recipe_views.bin"),
            max_suggestions: 10,
            default_limit: 10,
            trending_metric: TrendingMetric::Views,
        }
    }
}

impl EngineConfig {
    /// Reads a JSON config file. Missing files and missing keys fall back to
    /// the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let config = match fs::read_to_string(path) {
            Ok(text) => serde_json::from_str(&text)?,
            Err(e) if e.kind() == ErrorKind::NotFound => Self::default(),
            Err(e) => return Err(e.into()),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_suggestions == 0 {
            return Err(EngineError::Config {
                reason: "max_suggestions must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = EngineConfig::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn partial_file_overrides_named_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("engine.json");
        fs::write(&path, r#"{"max_suggestions": 5, "trending_metric": "average_rating"}"#).unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.max_suggestions, 5);
        assert_eq!(config.trending_metric, TrendingMetric::AverageRating);
        assert_eq!(config.reviews_path, PathBuf::from("reviews.json"));
    }

    #[test]
    fn zero_suggestions_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("engine.json");
        fs::write(&path, r#"{"max_suggestions": 0}"#).unwrap();
        assert!(matches!(EngineConfig::load(&path), Err(EngineError::Config { .. })));
    }
}
