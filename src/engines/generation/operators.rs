use crate::error::{Result, ShapetuneError};
use crate::types::{FeatureSchema, FeatureVector};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Normalize fitness scores into a selection distribution
pub fn selection_probabilities(fitness: &[f64]) -> Result<Vec<f64>> {
    if fitness.is_empty() {
        return Err(ShapetuneError::Input(
            "Cannot normalize an empty set of fitness scores".to_string(),
        ));
    }
    if let Some(bad) = fitness.iter().find(|f| !f.is_finite() || **f < 0.0) {
        return Err(ShapetuneError::NumericDegeneracy(format!(
            "Fitness {} cannot be used as a selection weight",
            bad
        )));
    }

    let total: f64 = fitness.iter().sum();
    if !total.is_finite() || total <= 0.0 {
        return Err(ShapetuneError::NumericDegeneracy(format!(
            "Total fitness {} cannot be normalized",
            total
        )));
    }

    Ok(fitness.iter().map(|f| f / total).collect())
}

/// Fitness-proportional selection of two distinct parents.
///
/// The first index is drawn from the full distribution, the second from the
/// distribution with the first removed.
pub fn sample_parent_pair<R: Rng>(fitness: &[f64], rng: &mut R) -> Result<(usize, usize)> {
    if fitness.len() < 2 {
        return Err(ShapetuneError::Input(format!(
            "Need at least 2 entities to select a parent pair, got {}",
            fitness.len()
        )));
    }

    let mut weights = selection_probabilities(fitness)?;
    let first = weighted_index(&weights)?.sample(rng);

    weights[first] = 0.0;
    let second = weighted_index(&weights)?.sample(rng);

    Ok((first, second))
}

fn weighted_index(weights: &[f64]) -> Result<WeightedIndex<f64>> {
    WeightedIndex::new(weights)
        .map_err(|e| ShapetuneError::NumericDegeneracy(format!("Invalid selection weights: {}", e)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrossoverMethod {
    /// Each slot from either parent with equal probability
    Uniform,
    /// Each slot from parent A, parent B or their mean, one third each
    Blend,
}

/// Which crossover method an offspring gets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrossoverPolicy {
    Uniform,
    Blend,
    Random,
}

impl CrossoverPolicy {
    pub fn resolve<R: Rng>(&self, rng: &mut R) -> CrossoverMethod {
        match self {
            CrossoverPolicy::Uniform => CrossoverMethod::Uniform,
            CrossoverPolicy::Blend => CrossoverMethod::Blend,
            CrossoverPolicy::Random => {
                if rng.gen_bool(0.5) {
                    CrossoverMethod::Uniform
                } else {
                    CrossoverMethod::Blend
                }
            }
        }
    }
}

pub fn crossover<R: Rng>(
    parent_a: &FeatureVector,
    parent_b: &FeatureVector,
    method: CrossoverMethod,
    rng: &mut R,
) -> FeatureVector {
    let mut child = *parent_a;

    for i in 0..child.len() {
        let a = parent_a.get(i);
        let b = parent_b.get(i);
        let roll = rng.gen::<f64>();

        let value = match method {
            CrossoverMethod::Uniform => {
                if roll <= 0.5 {
                    a
                } else {
                    b
                }
            }
            CrossoverMethod::Blend => {
                if roll <= 1.0 / 3.0 {
                    a
                } else if roll <= 2.0 / 3.0 {
                    b
                } else {
                    (a + b) / 2.0
                }
            }
        };
        child.set(i, value);
    }

    child
}

/// Resample each slot with probability `1 / len`.
///
/// Returns the indices of the resampled slots.
pub fn mutate<R: Rng>(
    vector: &mut FeatureVector,
    schema: &FeatureSchema,
    rng: &mut R,
) -> Vec<usize> {
    let rate = 1.0 / vector.len() as f64;
    let mut resampled = Vec::new();

    for i in 0..vector.len() {
        if rng.gen::<f64>() < rate {
            vector.set(i, schema.sample_slot(i, rng));
            resampled.push(i);
        }
    }

    resampled
}

/// Roll the per-offspring mutation trigger
pub fn mutation_triggered<R: Rng>(trigger_probability: f64, rng: &mut R) -> bool {
    rng.gen::<f64>() < trigger_probability
}

/// Run `mutate` only when the per-offspring trigger fires
pub fn maybe_mutate<R: Rng>(
    vector: &mut FeatureVector,
    trigger_probability: f64,
    schema: &FeatureSchema,
    rng: &mut R,
) -> Vec<usize> {
    if mutation_triggered(trigger_probability, rng) {
        mutate(vector, schema, rng)
    } else {
        Vec::new()
    }
}
