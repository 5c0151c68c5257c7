use crate::error::{Result, ShapetuneError};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of color slots at the front of every feature vector.
pub const COLOR_SLOTS: usize = 4;
/// Number of shape slots following the color slots.
pub const SHAPE_SLOTS: usize = 3;
/// Total feature vector length.
pub const FEATURE_LEN: usize = COLOR_SLOTS + SHAPE_SLOTS;

/// Semantics of a single feature slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SlotKind {
    Continuous { min: f64, max: f64 }, // Color channels
    Discrete { max: u32 },             // Shape dimensions, min is always 0
}

/// Shared slot schema for every feature vector in a run.
///
/// Bounds are a property of the schema rather than of individual vectors, so
/// operators ask the schema how a slot may be resampled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureSchema {
    pub max_dim: u32,
}

impl FeatureSchema {
    pub fn new(max_dim: u32) -> Self {
        Self { max_dim }
    }

    pub fn slot_kind(&self, index: usize) -> SlotKind {
        if index < COLOR_SLOTS {
            SlotKind::Continuous { min: 0.0, max: 1.0 }
        } else {
            SlotKind::Discrete { max: self.max_dim }
        }
    }

    /// Draw a single slot value uniformly within its bounds
    pub fn sample_slot<R: Rng>(&self, index: usize, rng: &mut R) -> f64 {
        match self.slot_kind(index) {
            SlotKind::Continuous { min, max } => rng.gen_range(min..=max),
            SlotKind::Discrete { max } => rng.gen_range(0..=max) as f64,
        }
    }

    /// Generate a random vector covering the whole schema
    pub fn random_vector<R: Rng>(&self, rng: &mut R) -> FeatureVector {
        let mut values = [0.0; FEATURE_LEN];
        for (i, value) in values.iter_mut().enumerate() {
            *value = self.sample_slot(i, rng);
        }
        FeatureVector::new(values)
    }
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self::new(10)
    }
}

/// Fixed-length numeric descriptor of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector([f64; FEATURE_LEN]);

impl FeatureVector {
    pub fn new(values: [f64; FEATURE_LEN]) -> Self {
        Self(values)
    }

    pub fn from_slice(values: &[f64]) -> Result<Self> {
        let array: [f64; FEATURE_LEN] = values.try_into().map_err(|_| {
            ShapetuneError::Input(format!(
                "Feature vector needs {} values, got {}",
                FEATURE_LEN,
                values.len()
            ))
        })?;
        Ok(Self(array))
    }

    pub fn len(&self) -> usize {
        FEATURE_LEN
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Value of slot `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= FEATURE_LEN`; use `try_get` for unchecked input.
    pub fn get(&self, index: usize) -> f64 {
        self.0[index]
    }

    pub fn try_get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }

    /// Overwrite slot `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= FEATURE_LEN`.
    pub fn set(&mut self, index: usize, value: f64) {
        self.0[index] = value;
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn color(&self) -> &[f64] {
        &self.0[..COLOR_SLOTS]
    }

    pub fn shape(&self) -> &[f64] {
        &self.0[COLOR_SLOTS..]
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().copied()
    }

    /// Euclidean distance between two vectors
    pub fn distance(&self, other: &FeatureVector) -> f64 {
        self.iter()
            .zip(other.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt()
    }
}

/// Stable identifier of an entity inside the host store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Generation identifier. `Initial` sorts before every indexed generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GenerationId {
    Initial,
    Index(u32),
}

impl GenerationId {
    pub fn index(&self) -> Option<u32> {
        match self {
            GenerationId::Initial => None,
            GenerationId::Index(g) => Some(*g),
        }
    }
}

impl fmt::Display for GenerationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationId::Initial => write!(f, "initial population"),
            GenerationId::Index(g) => write!(f, "generation {}", g),
        }
    }
}

/// Derived metrics attached to a source entity for external inspection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityMetrics {
    pub fitness: f64,
    pub selection_probability: f64,
    pub features: FeatureVector,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_from_slice_rejects_wrong_length() {
        let err = FeatureVector::from_slice(&[0.1, 0.2, 0.3]).unwrap_err();
        assert!(matches!(err, ShapetuneError::Input(_)));
    }

    #[test]
    fn test_sub_vectors() {
        let v = FeatureVector::new([0.1, 0.2, 0.3, 0.4, 1.0, 2.0, 3.0]);
        assert_eq!(v.color(), &[0.1, 0.2, 0.3, 0.4]);
        assert_eq!(v.shape(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_random_vector_respects_schema() {
        let schema = FeatureSchema::new(5);
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..200 {
            let v = schema.random_vector(&mut rng);
            assert!(v.color().iter().all(|c| (0.0..=1.0).contains(c)));
            assert!(v
                .shape()
                .iter()
                .all(|s| s.fract() == 0.0 && (0.0..=5.0).contains(s)));
        }
    }

    #[test]
    fn test_generation_ordering() {
        assert!(GenerationId::Initial < GenerationId::Index(0));
        assert!(GenerationId::Index(2) < GenerationId::Index(10));
    }

    #[test]
    fn test_try_get_rejects_out_of_range_slot() {
        let v = FeatureVector::new([0.1, 0.2, 0.3, 0.4, 1.0, 2.0, 3.0]);
        assert_eq!(v.try_get(6), Some(3.0));
        assert_eq!(v.try_get(FEATURE_LEN), None);
    }

    #[test]
    #[should_panic]
    fn test_get_panics_out_of_range() {
        let v = FeatureVector::new([0.0; FEATURE_LEN]);
        v.get(FEATURE_LEN);
    }
}
