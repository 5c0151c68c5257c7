use super::{evolution::EvolutionConfig, grid_search::GridSearchConfig, traits::ConfigSection};
use super::traits::ConfigManifest;
use crate::error::ShapetuneError;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

/// Prefix of environment overrides, e.g. `SHAPETUNE__EVOLUTION__POPULATION_SIZE`
pub const ENV_PREFIX: &str = "SHAPETUNE";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub evolution: EvolutionConfig,
    pub grid_search: GridSearchConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ShapetuneError> {
        self.evolution.validate()?;
        self.grid_search.validate()?;
        Ok(())
    }

    pub fn manifest(&self) -> Vec<ConfigManifest> {
        vec![self.evolution.to_manifest(), self.grid_search.to_manifest()]
    }
}

pub struct ConfigManager {
    config: Arc<RwLock<AppConfig>>,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config: Arc::new(RwLock::new(AppConfig::default())),
        }
    }

    /// Load a config file (TOML or JSON by extension), then apply environment overrides
    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ShapetuneError> {
        let path = path.as_ref();
        debug!("Loading configuration from {}", path.display());

        let config: AppConfig = ::config::Config::builder()
            .add_source(::config::File::from(path))
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| ShapetuneError::Configuration(format!("Failed to load config: {}", e)))?;

        config.validate()?;
        info!("Configuration loaded from {}", path.display());

        *self.config.write().unwrap_or_else(PoisonError::into_inner) = config;
        Ok(())
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ShapetuneError> {
        let config = self.get();
        let toml_str = toml::to_string_pretty(&config)
            .map_err(|e| ShapetuneError::Configuration(format!("Failed to serialize: {}", e)))?;

        std::fs::write(path, toml_str)?;
        Ok(())
    }

    pub fn get(&self) -> AppConfig {
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Apply `f` and keep the result only if it still validates
    pub fn update<F>(&self, f: F) -> Result<(), ShapetuneError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut config = self.config.write().unwrap_or_else(PoisonError::into_inner);
        let mut candidate = config.clone();
        f(&mut candidate);
        candidate.validate()?;
        *config = candidate;
        Ok(())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_rejects_invalid_change() {
        let manager = ConfigManager::new();

        let result = manager.update(|c| c.evolution.mutation_probability = 2.0);

        assert!(result.is_err());
        assert_eq!(manager.get().evolution.mutation_probability, 0.1);
    }

    #[test]
    fn test_update_applies_valid_change() {
        let manager = ConfigManager::new();
        manager.update(|c| c.evolution.population_size = 8).unwrap();
        assert_eq!(manager.get().evolution.population_size, 8);
    }

    #[test]
    fn test_manifest_lists_both_sections() {
        let sections = AppConfig::default().manifest();
        assert_eq!(sections.len(), 2);
        assert!(sections[0].fields.iter().any(|f| f.name == "population_size"));
        assert!(sections[1].fields.iter().any(|f| f.name == "warmup_steps"));
    }
}
