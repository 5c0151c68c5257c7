pub mod memory;

pub use memory::InMemoryStore;

use crate::error::Result;
use crate::types::{EntityId, EntityMetrics, FeatureVector, GenerationId};

/// Repository contract for the host that owns entities.
///
/// The optimisation core only ever holds `EntityId`s and goes through this
/// trait for every read or write, so the host is free to keep entities in a
/// scene graph, a database or plain memory.
pub trait EntityStore {
    /// Every generation currently present, in ascending order
    fn generations(&self) -> Vec<GenerationId>;

    fn contains(&self, generation: GenerationId) -> bool;

    /// Members of a generation in enumeration order
    fn enumerate(&self, generation: GenerationId) -> Result<Vec<EntityId>>;

    fn create(&mut self, generation: GenerationId) -> Result<()>;

    /// Remove a generation and destroy every entity it contains
    fn destroy(&mut self, generation: GenerationId) -> Result<()>;

    fn feature_vector(&self, entity: EntityId) -> Result<FeatureVector>;

    fn set_feature_vector(&mut self, entity: EntityId, features: FeatureVector) -> Result<()>;

    /// Deep copy of an entity, detached from any generation
    fn duplicate(&mut self, entity: EntityId) -> Result<EntityId>;

    /// Destroy an entity that is not linked into any generation
    fn discard(&mut self, entity: EntityId) -> Result<()>;

    /// Append a detached entity to a generation
    fn link(&mut self, entity: EntityId, generation: GenerationId) -> Result<()>;

    /// Cosmetic placement for external inspection
    fn reposition(&mut self, entity: EntityId, location: [f64; 3]) -> Result<()>;

    fn annotate(&mut self, _entity: EntityId, _metrics: EntityMetrics) -> Result<()> {
        Ok(())
    }
}
