use super::traits::{ConfigManifest, ConfigSection, FieldManifest};
use crate::engines::generation::operators::CrossoverPolicy;
use crate::error::{Result, ShapetuneError};
use crate::types::{FeatureSchema, FeatureVector, FEATURE_LEN};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    pub target: Vec<f64>,
    pub epsilon: f64,
    pub population_size: usize,
    pub num_generations: u32,
    pub mutation_probability: f64,
    pub max_dim: u32,
    pub crossover: CrossoverPolicy,
    pub report_every: u32,
    pub retention_lag: u32,
    pub placement_spacing: f64,
    pub annotate: bool,
    pub seed: Option<u64>,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            target: vec![1.0, 0.0, 0.0, 1.0, 2.0, 2.0, 8.0],
            epsilon: 1e-10,
            population_size: 20,
            num_generations: 20,
            mutation_probability: 0.1,
            max_dim: 10,
            crossover: CrossoverPolicy::Random,
            report_every: 5,
            retention_lag: 2,
            placement_spacing: 6.0,
            annotate: true,
            seed: None,
        }
    }
}

impl EvolutionConfig {
    pub fn target_vector(&self) -> Result<FeatureVector> {
        FeatureVector::from_slice(&self.target)
    }

    pub fn schema(&self) -> FeatureSchema {
        FeatureSchema::new(self.max_dim)
    }
}

impl ConfigSection for EvolutionConfig {
    fn section_name() -> &'static str {
        "evolution"
    }

    fn validate(&self) -> Result<()> {
        if self.target.len() != FEATURE_LEN {
            return Err(ShapetuneError::Configuration(format!(
                "Target must have {} values, got {}",
                FEATURE_LEN,
                self.target.len()
            )));
        }
        if !(self.epsilon > 0.0) {
            return Err(ShapetuneError::Configuration(
                "Epsilon must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.mutation_probability) {
            return Err(ShapetuneError::Configuration(
                "Mutation probability must be between 0 and 1".to_string(),
            ));
        }
        if self.max_dim == 0 {
            return Err(ShapetuneError::Configuration(
                "Max dimension must be at least 1".to_string(),
            ));
        }
        if self.placement_spacing < 0.0 {
            return Err(ShapetuneError::Configuration(
                "Placement spacing cannot be negative".to_string(),
            ));
        }
        Ok(())
    }

    fn to_manifest(&self) -> ConfigManifest {
        let defaults = Self::default();
        ConfigManifest {
            section: "Evolution".to_string(),
            fields: vec![
                FieldManifest::new(
                    "target",
                    "float[7]",
                    json!(defaults.target),
                    "Target feature vector: 4 color slots then 3 shape slots",
                ),
                FieldManifest::new(
                    "epsilon",
                    "float",
                    json!(defaults.epsilon),
                    "Guard added to the target distance before inversion",
                )
                .bounded(Some(0.0), None),
                FieldManifest::new(
                    "population_size",
                    "integer",
                    json!(defaults.population_size),
                    "Entities per generation",
                )
                .bounded(Some(0.0), None),
                FieldManifest::new(
                    "num_generations",
                    "integer",
                    json!(defaults.num_generations),
                    "Generations produced by a run",
                )
                .bounded(Some(0.0), None),
                FieldManifest::new(
                    "mutation_probability",
                    "float",
                    json!(defaults.mutation_probability),
                    "Chance that an offspring is mutated at all",
                )
                .bounded(Some(0.0), Some(1.0)),
                FieldManifest::new(
                    "max_dim",
                    "integer",
                    json!(defaults.max_dim),
                    "Upper bound of the shape slots",
                )
                .bounded(Some(1.0), None),
                FieldManifest::new(
                    "crossover",
                    "enum",
                    json!(defaults.crossover),
                    "Uniform, Blend, or Random per offspring",
                ),
                FieldManifest::new(
                    "report_every",
                    "integer",
                    json!(defaults.report_every),
                    "Placement and milestone interval, 0 disables both",
                )
                .bounded(Some(0.0), None),
                FieldManifest::new(
                    "retention_lag",
                    "integer",
                    json!(defaults.retention_lag),
                    "Generations kept behind the newest one",
                )
                .bounded(Some(0.0), None),
                FieldManifest::new(
                    "placement_spacing",
                    "float",
                    json!(defaults.placement_spacing),
                    "Distance between placed entities",
                )
                .bounded(Some(0.0), None),
                FieldManifest::new(
                    "annotate",
                    "bool",
                    json!(defaults.annotate),
                    "Attach fitness metrics to source entities",
                ),
                FieldManifest::new(
                    "seed",
                    "integer?",
                    json!(defaults.seed),
                    "Random seed, entropy when absent",
                ),
            ],
        }
    }
}
